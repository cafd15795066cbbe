use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::todos::dtos::{
    CreateTodoDto, ListTodosQuery, TodoDetailResponseDto, TodoListResponseDto,
    TodoMessageResponseDto, UpdateTodoDto,
};
use crate::features::todos::payload::{NormalizeMode, TodoInput};
use crate::features::todos::query::TodoQuery;
use crate::features::todos::services::TodoService;

/// List todos with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/todos",
    params(ListTodosQuery),
    responses(
        (status = 200, description = "A page of todos", body = TodoListResponseDto),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "todos"
)]
pub async fn list_todos(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppQuery(params): AppQuery<ListTodosQuery>,
) -> Result<Json<TodoListResponseDto>> {
    params.validate().map_err(AppError::from)?;

    let query = TodoQuery::shape(params.into(), &user)?;
    let (todos, meta) = service.list(&query).await?;

    Ok(Json(TodoListResponseDto {
        data: todos.into_iter().map(Into::into).collect(),
        meta,
    }))
}

/// Get a single todo by id
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "The todo", body = TodoDetailResponseDto),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    security(("bearer_auth" = [])),
    tag = "todos"
)]
pub async fn get_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TodoDetailResponseDto>> {
    let todo = service.get(id, &user).await?;
    Ok(Json(TodoDetailResponseDto { todo: todo.into() }))
}

/// Create a todo owned by the caller
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoDto,
    responses(
        (status = 201, description = "Todo created", body = TodoMessageResponseDto),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "todos"
)]
pub async fn create_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppJson(dto): AppJson<CreateTodoDto>,
) -> Result<(StatusCode, Json<TodoMessageResponseDto>)> {
    let changes = TodoInput::from(dto).normalize(NormalizeMode::Full)?;
    let todo = service.create(&user, changes).await?;

    Ok((
        StatusCode::CREATED,
        Json(TodoMessageResponseDto {
            message: "Todo created successfully".to_string(),
            todo: todo.into(),
        }),
    ))
}

/// Partially update a todo
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = Uuid, Path, description = "Todo id")),
    request_body = UpdateTodoDto,
    responses(
        (status = 200, description = "Todo updated", body = TodoMessageResponseDto),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    security(("bearer_auth" = [])),
    tag = "todos"
)]
pub async fn update_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateTodoDto>,
) -> Result<Json<TodoMessageResponseDto>> {
    let changes = TodoInput::from(dto).normalize(NormalizeMode::Partial)?;
    let todo = service.update(id, &user, changes).await?;

    Ok(Json(TodoMessageResponseDto {
        message: "Todo updated successfully".to_string(),
        todo: todo.into(),
    }))
}

/// Flip a todo's completion state
#[utoipa::path(
    patch,
    path = "/api/todos/{id}/toggle",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo toggled", body = TodoMessageResponseDto),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    security(("bearer_auth" = [])),
    tag = "todos"
)]
pub async fn toggle_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TodoMessageResponseDto>> {
    let todo = service.toggle(id, &user).await?;

    Ok(Json(TodoMessageResponseDto {
        message: "Todo toggled successfully".to_string(),
        todo: todo.into(),
    }))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    security(("bearer_auth" = [])),
    tag = "todos"
)]
pub async fn delete_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
