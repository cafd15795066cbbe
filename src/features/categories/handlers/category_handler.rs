use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath};
use crate::features::categories::dtos::{
    CategoryBodyDto, CategoryDetailResponseDto, CategoryListResponseDto,
    CategoryMessageResponseDto,
};
use crate::features::categories::services::CategoryService;

/// List all categories, newest first
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = CategoryListResponseDto),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<CategoryListResponseDto>> {
    let categories = service.list().await?;
    Ok(Json(CategoryListResponseDto {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

/// Get a single category by id
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = CategoryDetailResponseDto),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<CategoryDetailResponseDto>> {
    let category = service.get_by_id(id).await?;
    Ok(Json(CategoryDetailResponseDto {
        category: category.into(),
    }))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryBodyDto,
    responses(
        (status = 201, description = "Category created", body = CategoryMessageResponseDto),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CategoryBodyDto>,
) -> Result<(StatusCode, Json<CategoryMessageResponseDto>)> {
    dto.validate().map_err(AppError::from)?;

    let category = service.create(dto.name.trim()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryMessageResponseDto {
            message: "Category created successfully".to_string(),
            category: category.into(),
        }),
    ))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryBodyDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryMessageResponseDto),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i32>,
    AppJson(dto): AppJson<CategoryBodyDto>,
) -> Result<Json<CategoryMessageResponseDto>> {
    dto.validate().map_err(AppError::from)?;

    let category = service.update(id, dto.name.trim()).await?;
    Ok(Json(CategoryMessageResponseDto {
        message: "Category updated successfully".to_string(),
        category: category.into(),
    }))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i32>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
