use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::features::auth::AuthService;
use crate::features::graphql::schema::{AppSchema, Principal};

#[derive(Clone)]
pub struct GraphQLState {
    pub schema: AppSchema,
    pub auth: Arc<AuthService>,
}

pub fn routes(schema: AppSchema, auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(GraphQLState { schema, auth })
}

/// Resolve the bearer token (if any) to a principal before execution.
/// A missing or invalid token does not fail the request here; fields
/// that need authentication fail individually.
async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let principal = match bearer_token(&headers) {
        Some(token) => state.auth.authenticate(token).await.ok(),
        None => None,
    };

    let req = req.into_inner().data(Principal(principal));
    state.schema.execute(req).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
