use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Claims;
use crate::features::auth::models::User;

/// Issues and verifies signed bearer tokens (HS256, shared secret).
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expires_in_secs: config.jwt_expires_in_secs,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
            iat: now,
            exp: now + self.expires_in_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry. Every failure collapses into the same
    /// Unauthorized error so callers cannot distinguish expired from
    /// tampered tokens.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use axum::http::StatusCode;

    fn test_user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(secret: &str, expires_in_secs: i64) -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            jwt_expires_in_secs: expires_in_secs,
        })
    }

    #[test]
    fn issued_tokens_verify_back_to_the_subject() {
        let tokens = service("test-secret", 3600);
        let token = tokens.issue(&test_user()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected_with_a_generic_message() {
        let token = service("test-secret", 3600).issue(&test_user()).unwrap();

        let err = service("other-secret", 3600).verify(&token).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "Invalid token");
    }

    #[test]
    fn expired_token_is_rejected_with_the_same_message() {
        // Well past the default validation leeway
        let tokens = service("test-secret", -300);
        let token = tokens.issue(&test_user()).unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "Invalid token");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = service("test-secret", 3600)
            .verify("not-a-token")
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
