use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, RegisterRequestDto, UserResponseDto};
use crate::features::auth::model::{AuthenticatedUser, UserRole};
use crate::features::auth::models::User;
use crate::features::auth::services::TokenService;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

/// Registration, login and principal resolution.
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>) -> Self {
        Self { pool, tokens }
    }

    pub async fn register(&self, dto: RegisterRequestDto) -> Result<UserResponseDto> {
        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM users WHERE username = $1 OR email = $2",
        )
        .bind(&dto.username)
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check for existing user: {:?}", e);
            AppError::Database(e)
        })?;

        if existing.is_some() {
            return Err(AppError::Conflict {
                message: "User with the same email or username already exists".to_string(),
                details: vec![],
            });
        }

        let role = dto
            .role
            .as_deref()
            .and_then(|r| r.parse::<UserRole>().ok())
            .unwrap_or(UserRole::User);
        let password_hash = hash_password(dto.password).await?;

        // A racing duplicate insert still lands on 409 via classification
        // of the unique-constraint violation.
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::from(e)
        })?;

        tracing::info!("User registered: id={}, username={}", user.id, user.username);

        Ok(user.into())
    }

    /// Verify credentials and issue a bearer token. Unknown email and wrong
    /// password produce the identical error.
    pub async fn login(&self, dto: LoginRequestDto) -> Result<(String, UserResponseDto)> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by email: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(dto.password, user.password_hash.clone()).await? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.tokens.issue(&user)?;

        Ok((token, user.into()))
    }

    pub async fn profile(&self, user_id: i32) -> Result<UserResponseDto> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Resolve a bearer token to a stored principal. Used by the REST
    /// middleware and the GraphQL context builder.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.tokens.verify(token)?;

        let user = self
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(AuthenticatedUser::from(&user))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user by id: {:?}", e);
                AppError::Database(e)
            })
    }
}

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_roundtrip() {
        let hash = hash_password("hunter22".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("hunter22".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("hunter23".to_string(), hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_never_verifies() {
        assert!(
            !verify_password("whatever".to_string(), "not-a-phc-string".to_string())
                .await
                .unwrap()
        );
    }
}
