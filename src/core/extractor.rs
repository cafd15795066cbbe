//! Request extractors for the strict surface. Every rejection is
//! mapped onto [`AppError`] so parameter and body failures wear the
//! same `{status: "error", message}` envelope as domain errors.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// JSON body extractor.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(reject_json)?;
        Ok(Self(value))
    }
}

fn reject_json(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(e) => format!("Invalid JSON body: {e}"),
        JsonRejection::JsonSyntaxError(e) => format!("Malformed JSON: {e}"),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a request with Content-Type: application/json".to_string()
        }
        other => other.body_text(),
    };
    AppError::BadRequest(message)
}

/// Query-string extractor. A parameter of the wrong type (for
/// example `completed=banana`) is a 400, not a deserializer dump.
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e: QueryRejection| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Path extractor. Covers malformed ids: a todo id that is not a
/// UUID, a category id that is not an integer.
pub struct AppPath<T>(pub T);

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e: PathRejection| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use axum_test::TestServer;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Flags {
        #[allow(dead_code)]
        completed: Option<bool>,
    }

    fn server() -> TestServer {
        async fn by_query(AppQuery(_): AppQuery<Flags>) -> &'static str {
            "ok"
        }
        async fn by_id(AppPath(id): AppPath<Uuid>) -> String {
            id.to_string()
        }
        async fn by_body(AppJson(_): AppJson<Flags>) -> &'static str {
            "ok"
        }

        let app = Router::new()
            .route("/items", get(by_query).post(by_body))
            .route("/items/{id}", get(by_id));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn query_type_failures_use_the_uniform_error_body() {
        let res = server()
            .get("/items")
            .add_query_param("completed", "banana")
            .await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json();
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn malformed_path_ids_use_the_uniform_error_body() {
        let res = server().get("/items/not-a-uuid").await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn malformed_json_bodies_use_the_uniform_error_body() {
        let res = server()
            .post("/items")
            .bytes("{not json".into())
            .content_type("application/json")
            .await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn well_formed_input_passes_through() {
        let res = server()
            .get("/items")
            .add_query_param("completed", "true")
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let id = Uuid::new_v4();
        let res = server().get(&format!("/items/{id}")).await;
        assert_eq!(res.text(), id.to_string());
    }
}
