//! Content-mutation authorization: configuration, token handling, the
//! bearer-token request guard and the [`Authorizer`] capability check.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod guards;
pub mod jwt;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use guards::BearerToken;
pub use jwt::JwtService;

/// Permission that grants content mutation regardless of role.
pub const CONTENT_WRITE_PERMISSION: &str = "content:write";

pub type SharedAuthorizer = Arc<dyn Authorizer>;

/// Answers "may this caller mutate content?".
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, token: Option<&str>) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync,
{
    fn is_authorized(&self, token: Option<&str>) -> bool {
        self(token)
    }
}

/// Accepts valid access tokens carrying the content role or the
/// `content:write` permission.
pub struct JwtAuthorizer {
    jwt_service: Arc<JwtService>,
    content_role: String,
}

impl JwtAuthorizer {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        Ok(Self {
            jwt_service: Arc::new(JwtService::from_config(config)?),
            content_role: config.content_role.clone(),
        })
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }

    fn check(&self, token: &str) -> AuthResult<()> {
        let claims = self.jwt_service.decode_access_token(token)?;
        let allowed = claims.role == self.content_role
            || claims
                .permissions
                .iter()
                .any(|permission| permission == CONTENT_WRITE_PERMISSION);
        if allowed {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

impl Authorizer for JwtAuthorizer {
    fn is_authorized(&self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return false;
        };
        match self.check(token) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("content authorization denied: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            issuer: "https://bugspot.test".into(),
            audience: "bugspot-api".into(),
            access_token_ttl_secs: 900,
            jwt_secret: "authorizer-test-secret".into(),
            jwt_kid: None,
            content_role: "admin".into(),
        }
    }

    #[test]
    fn admin_role_is_authorized() {
        let authorizer = JwtAuthorizer::new(&config()).unwrap();
        let token = authorizer
            .jwt_service()
            .issue_access_token("root", "admin", &[])
            .unwrap();
        assert!(authorizer.is_authorized(Some(&token.token)));
    }

    #[test]
    fn content_permission_is_authorized() {
        let authorizer = JwtAuthorizer::new(&config()).unwrap();
        let token = authorizer
            .jwt_service()
            .issue_access_token("editor", "user", &[CONTENT_WRITE_PERMISSION.to_string()])
            .unwrap();
        assert!(authorizer.is_authorized(Some(&token.token)));
    }

    #[test]
    fn plain_user_missing_and_garbage_tokens_are_rejected() {
        let authorizer = JwtAuthorizer::new(&config()).unwrap();
        let token = authorizer
            .jwt_service()
            .issue_access_token("learner", "user", &["user".to_string()])
            .unwrap();

        assert!(!authorizer.is_authorized(Some(&token.token)));
        assert!(!authorizer.is_authorized(None));
        assert!(!authorizer.is_authorized(Some("not-a-jwt")));
    }
}
