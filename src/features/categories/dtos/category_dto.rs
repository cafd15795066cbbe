use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Category;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryBodyDto {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Category name must be between 2 and 100 characters long"
    ))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, SimpleObject)]
pub struct CategoryResponseDto {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryListResponseDto {
    pub categories: Vec<CategoryResponseDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetailResponseDto {
    pub category: CategoryResponseDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryMessageResponseDto {
    pub message: String,
    pub category: CategoryResponseDto,
}
