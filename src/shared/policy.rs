//! Item-level access policy.
//!
//! Admins bypass ownership entirely; everyone else may only touch rows
//! they own. The caller is expected to have confirmed existence first:
//! this never performs a lookup, and a denial is a Forbidden, not a
//! NotFound.

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

pub fn can_access(resource_owner_id: i32, principal: &AuthenticatedUser) -> bool {
    principal.is_admin() || resource_owner_id == principal.id
}

pub fn ensure_can_access(resource_owner_id: i32, principal: &AuthenticatedUser) -> Result<()> {
    if can_access(resource_owner_id, principal) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not allowed to access this todo".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{admin_principal, user_principal};
    use axum::http::StatusCode;

    #[test]
    fn owner_is_allowed() {
        let principal = user_principal(7);
        assert!(can_access(7, &principal));
        assert!(ensure_can_access(7, &principal).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let principal = user_principal(7);
        assert!(!can_access(8, &principal));

        let err = ensure_can_access(8, &principal).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn admin_bypasses_ownership() {
        let principal = admin_principal(1);
        assert!(can_access(999, &principal));
        assert!(ensure_can_access(999, &principal).is_ok());
    }
}
