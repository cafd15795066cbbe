use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::auth::model::UserRole;
use crate::features::auth::models::User;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, numbers and underscores"
        )
    )]
    pub username: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    /// Optional role, defaults to "user"
    #[validate(custom(function = validate_role))]
    pub role: Option<String>,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role.parse::<UserRole>().is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("role");
        err.message = Some("Role must be either user or admin".into());
        Err(err)
    }
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User info returned by registration, login and profile endpoints.
/// The password hash is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, SimpleObject)]
pub struct UserResponseDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponseDto {
    pub message: String,
    pub user: UserResponseDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub message: String,
    /// Signed bearer token for subsequent requests
    pub token: String,
    pub user: UserResponseDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponseDto {
    pub user: UserResponseDto,
}
