#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, UserRole};

#[cfg(test)]
pub fn user_principal(id: i32) -> AuthenticatedUser {
    AuthenticatedUser {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        role: UserRole::User,
    }
}

#[cfg(test)]
pub fn admin_principal(id: i32) -> AuthenticatedUser {
    AuthenticatedUser {
        id,
        username: format!("admin{id}"),
        email: format!("admin{id}@example.com"),
        role: UserRole::Admin,
    }
}
