use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::auth::model::{AuthenticatedUser, UserRole};

/// Database model for a user account. `password_hash` never leaves this
/// module in a serialized form.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
