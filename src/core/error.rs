use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::shared::types::ErrorResponse;

/// A single field-level failure, attached to validation and conflict errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to return verbatim to the caller.
    /// Non-operational errors are logged in full but surface only a generic
    /// "Internal server error" message.
    pub fn is_operational(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// Whether the failure should be forwarded to the error-tracking sink.
    /// 5xx by default; all 4xx domain errors are expected traffic.
    pub fn should_report(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// The message exposed to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Field-level details, present for validation-shaped failures.
    pub fn details(&self) -> Option<Vec<FieldError>> {
        match self {
            AppError::Validation(details) => Some(details.clone()),
            AppError::Conflict { details, .. } if !details.is_empty() => Some(details.clone()),
            _ => None,
        }
    }

    /// Classify a storage-layer failure into the domain taxonomy:
    /// uniqueness violations become conflicts, field-level constraint
    /// violations become validation errors, everything else stays a
    /// database error.
    pub fn classify(err: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return AppError::Conflict {
                        message: "Duplicate data".to_string(),
                        details: constraint_details(db_err.constraint(), "must be unique"),
                    };
                }
                sqlx::error::ErrorKind::CheckViolation
                | sqlx::error::ErrorKind::NotNullViolation => {
                    return AppError::Validation(constraint_details(
                        db_err.constraint(),
                        "is invalid",
                    ));
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::classify(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        AppError::Validation(details)
    }
}

/// Derive a field name from a constraint name like `users_email_key`.
fn constraint_field(constraint: &str) -> String {
    constraint
        .trim_end_matches("_key")
        .trim_end_matches("_check")
        .rsplit('_')
        .next()
        .unwrap_or(constraint)
        .to_string()
}

fn constraint_details(constraint: Option<&str>, message: &str) -> Vec<FieldError> {
    constraint
        .map(|c| {
            let field = constraint_field(c);
            vec![FieldError::new(field.clone(), format!("{field} {message}"))]
        })
        .unwrap_or_default()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_report() {
            tracing::error!(status = %status, report = true, "{}", self);
        } else if !matches!(status, StatusCode::NOT_FOUND) {
            tracing::warn!(status = %status, "{}", self);
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.public_message(),
            errors: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            AppError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict {
                message: "x".into(),
                details: vec![]
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_server_errors_are_non_operational_and_reportable() {
        let internal = AppError::Internal("boom".into());
        assert!(!internal.is_operational());
        assert!(internal.should_report());
        assert_eq!(internal.public_message(), "Internal server error");

        let db = AppError::Database(sqlx::Error::RowNotFound);
        assert!(!db.is_operational());
        assert!(db.should_report());

        let forbidden = AppError::Forbidden("Access denied".into());
        assert!(forbidden.is_operational());
        assert!(!forbidden.should_report());
        assert_eq!(forbidden.public_message(), "Access denied");
    }

    #[test]
    fn details_only_for_validation_shaped_failures() {
        let validation = AppError::Validation(vec![FieldError::new("title", "too short")]);
        assert_eq!(validation.details().unwrap().len(), 1);

        assert!(AppError::NotFound("x".into()).details().is_none());
        assert!(AppError::BadRequest("x".into()).details().is_none());

        let conflict = AppError::Conflict {
            message: "Duplicate data".into(),
            details: vec![],
        };
        assert!(conflict.details().is_none());
    }

    #[test]
    fn constraint_field_strips_table_prefix_and_suffix() {
        assert_eq!(constraint_field("users_email_key"), "email");
        assert_eq!(constraint_field("users_username_key"), "username");
        assert_eq!(constraint_field("todos_title_check"), "title");
    }

    #[test]
    fn validator_errors_flatten_into_field_details() {
        use validator::Validate;

        #[derive(Validate)]
        struct Form {
            #[validate(length(min = 2, max = 120, message = "Title must be 2-120 characters"))]
            title: String,
        }

        let err = Form {
            title: "x".to_string(),
        }
        .validate()
        .unwrap_err();

        let app_err = AppError::from(err);
        let details = app_err.details().unwrap();
        assert_eq!(details[0].field, "title");
        assert_eq!(details[0].message, "Title must be 2-120 characters");
    }

    #[tokio::test]
    async fn response_body_has_the_uniform_error_shape() {
        async fn fail() -> super::Result<()> {
            Err(AppError::Validation(vec![FieldError::new(
                "title",
                "Title must be between 2 and 120 characters long",
            )]))
        }

        let server = TestServer::new(Router::new().route("/fail", get(fail))).unwrap();
        let res = server.get("/fail").await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "title");
    }

    #[tokio::test]
    async fn internal_errors_hide_the_real_message() {
        async fn fail() -> super::Result<()> {
            Err(AppError::Internal("secret pool detail".into()))
        }

        let server = TestServer::new(Router::new().route("/fail", get(fail))).unwrap();
        let res = server.get("/fail").await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = res.json();
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }
}
