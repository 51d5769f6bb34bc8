use crate::auth::{AuthError, AuthResult};

/// Authentication configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl_secs: i64,
    pub jwt_secret: String,
    pub jwt_kid: Option<String>,
    /// Role whose tokens may mutate course content.
    pub content_role: String,
}

impl AuthConfig {
    pub fn from_env() -> AuthResult<Self> {
        let issuer =
            std::env::var("BUGSPOT_JWT_ISSUER").unwrap_or_else(|_| "http://localhost".into());
        let audience =
            std::env::var("BUGSPOT_JWT_AUDIENCE").unwrap_or_else(|_| "bugspot-api".into());
        let access_token_ttl_secs = std::env::var("BUGSPOT_ACCESS_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(900);
        let jwt_secret = std::env::var("BUGSPOT_JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AuthError::Config("BUGSPOT_JWT_SECRET is required".into()))?;
        let jwt_kid = std::env::var("BUGSPOT_JWT_KID").ok();
        let content_role =
            std::env::var("BUGSPOT_CONTENT_ROLE").unwrap_or_else(|_| "admin".into());

        Ok(Self {
            issuer,
            audience,
            access_token_ttl_secs,
            jwt_secret,
            jwt_kid,
            content_role,
        })
    }
}
