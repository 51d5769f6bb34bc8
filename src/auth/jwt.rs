use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::auth::{AuthConfig, AuthResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SignedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_token_ttl: Duration,
    kid: Option<String>,
}

impl JwtService {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let secret_bytes = config.jwt_secret.as_bytes();
        let encoding_key = EncodingKey::from_secret(secret_bytes);
        let decoding_key = DecodingKey::from_secret(secret_bytes);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.clone()]);
        validation.set_issuer(&[config.issuer.clone()]);
        validation.leeway = 30;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: Duration::seconds(config.access_token_ttl_secs),
            kid: config.jwt_kid.clone(),
        })
    }

    pub fn issue_access_token(
        &self,
        subject: &str,
        role: &str,
        permissions: &[String],
    ) -> AuthResult<SignedAccessToken> {
        let now = Utc::now();
        let expires_at = now + self.access_token_ttl;

        let mut header = Header::new(Algorithm::HS256);
        header.kid = self.kid.clone();

        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            role: role.to_string(),
            permissions: permissions.to_vec(),
        };

        let token = encode(&header, &claims, &self.encoding_key)?;

        Ok(SignedAccessToken { token, expires_at })
    }

    pub fn decode_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;

    const TEST_JWT_SECRET: &str = "super-secret-test-key";

    fn make_test_config() -> AuthConfig {
        AuthConfig {
            issuer: "https://bugspot.test".into(),
            audience: "bugspot-api".into(),
            access_token_ttl_secs: 900,
            jwt_secret: TEST_JWT_SECRET.into(),
            jwt_kid: Some("test-kid".into()),
            content_role: "admin".into(),
        }
    }

    #[test]
    fn issues_and_decodes_access_tokens() {
        let config = make_test_config();
        let service = JwtService::from_config(&config).expect("jwt service");

        let permissions = vec!["content:write".to_string()];
        let token = service
            .issue_access_token("editor@example.com", "editor", &permissions)
            .expect("issue token");

        let claims = service
            .decode_access_token(&token.token)
            .expect("decode token");

        assert_eq!(claims.sub, "editor@example.com");
        assert_eq!(claims.role, "editor");
        assert_eq!(claims.permissions, permissions);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let service = JwtService::from_config(&make_test_config()).unwrap();
        let other = JwtService::from_config(&AuthConfig {
            jwt_secret: "another-secret".into(),
            ..make_test_config()
        })
        .unwrap();

        let token = other.issue_access_token("x", "admin", &[]).unwrap();
        let err = service.decode_access_token(&token.token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn rejects_expired_tokens() {
        let service = JwtService::from_config(&AuthConfig {
            access_token_ttl_secs: -3600,
            ..make_test_config()
        })
        .unwrap();

        let token = service.issue_access_token("x", "admin", &[]).unwrap();
        let err = service.decode_access_token(&token.token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }
}
