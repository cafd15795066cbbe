use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::todos::handlers;
use crate::features::todos::services::TodoService;

pub fn routes(service: Arc<TodoService>) -> Router {
    Router::new()
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/api/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(handlers::toggle_todo))
        .with_state(service)
}
