use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::todos::models::TodoRecord;
use crate::features::todos::payload::TodoInput;
use crate::features::todos::query::{SortField, TodoQueryParams};
use crate::shared::types::PageMeta;

/// Strictly validated listing parameters. Out-of-range values are a
/// 400 here, unlike the query-style surface which normalizes them
/// silently.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
pub struct ListTodosQuery {
    /// Filter by completion state
    pub completed: Option<bool>,

    /// Filter by category id
    #[validate(range(min = 1, message = "category must be a positive integer"))]
    #[param(minimum = 1)]
    pub category: Option<i32>,

    /// Case-insensitive substring match against the title
    pub search: Option<String>,

    /// One of: created_at, updated_at, title, due_date
    #[validate(custom(function = validate_sort))]
    pub sort: Option<String>,

    /// `asc` or `desc`
    #[validate(custom(function = validate_order))]
    pub order: Option<String>,

    /// Page number (1-indexed, default: 1)
    #[validate(range(min = 1, message = "page must be a positive integer"))]
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Items per page (default: 10, max: 100)
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

fn validate_sort(sort: &str) -> Result<(), ValidationError> {
    if SortField::is_valid(sort) {
        Ok(())
    } else {
        let mut err = ValidationError::new("sort");
        err.message = Some("sort must be one of created_at, updated_at, title, due_date".into());
        Err(err)
    }
}

fn validate_order(order: &str) -> Result<(), ValidationError> {
    if order.eq_ignore_ascii_case("asc") || order.eq_ignore_ascii_case("desc") {
        Ok(())
    } else {
        let mut err = ValidationError::new("order");
        err.message = Some("order must be asc or desc".into());
        Err(err)
    }
}

impl From<ListTodosQuery> for TodoQueryParams {
    fn from(query: ListTodosQuery) -> Self {
        Self {
            completed: query.completed,
            category: query.category,
            search: query.search,
            sort: query.sort,
            order: query.order,
            page: query.page,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoDto {
    pub title: String,
    pub category_id: Option<i32>,
    /// ISO-8601 timestamp
    pub due_date: Option<String>,
}

impl From<CreateTodoDto> for TodoInput {
    fn from(dto: CreateTodoDto) -> Self {
        Self {
            title: Some(dto.title),
            completed: None,
            category_id: dto.category_id.map(Some),
            due_date: dto.due_date.map(Some),
        }
    }
}

/// Partial update payload. For `category_id` and `due_date` an
/// explicit JSON `null` clears the stored value, while leaving the
/// key out leaves it untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTodoDto {
    pub title: Option<String>,
    pub completed: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub category_id: Option<Option<i32>>,

    /// ISO-8601 timestamp
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub due_date: Option<Option<String>>,
}

/// Keeps a key that was present-but-null as `Some(None)` instead of
/// collapsing it into the missing-key case.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl From<UpdateTodoDto> for TodoInput {
    fn from(dto: UpdateTodoDto) -> Self {
        Self {
            title: dto.title,
            completed: dto.completed,
            category_id: dto.category_id,
            due_date: dto.due_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, SimpleObject)]
pub struct CategoryBriefDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, SimpleObject)]
pub struct UserBriefDto {
    pub id: i32,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, SimpleObject)]
pub struct TodoResponseDto {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategoryBriefDto>,
    pub user: UserBriefDto,
}

impl From<TodoRecord> for TodoResponseDto {
    fn from(record: TodoRecord) -> Self {
        let category = match (record.category_id, record.category_name) {
            (Some(id), Some(name)) => Some(CategoryBriefDto { id, name }),
            _ => None,
        };
        Self {
            id: record.id,
            title: record.title,
            completed: record.completed,
            due_date: record.due_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
            category,
            user: UserBriefDto {
                id: record.user_id,
                username: record.owner_username,
                email: record.owner_email,
            },
        }
    }
}

/// A page of todos with its pagination metadata. Also the payload
/// shape of the query-style `todos` field.
#[derive(Debug, Serialize, ToSchema, SimpleObject)]
#[graphql(name = "TodoPage")]
pub struct TodoListResponseDto {
    pub data: Vec<TodoResponseDto>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoDetailResponseDto {
    pub todo: TodoResponseDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoMessageResponseDto {
    pub message: String,
    pub todo: TodoResponseDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_null_and_absent_key_deserialize_differently() {
        let dto: UpdateTodoDto = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(dto.category_id, Some(None));
        assert_eq!(dto.due_date, None);

        let dto: UpdateTodoDto = serde_json::from_str(r#"{"category_id": 3}"#).unwrap();
        assert_eq!(dto.category_id, Some(Some(3)));

        let dto: UpdateTodoDto = serde_json::from_str("{}").unwrap();
        assert_eq!(dto.category_id, None);
        assert_eq!(dto.due_date, None);
    }

    #[test]
    fn strict_query_rejects_what_the_lenient_surface_would_normalize() {
        let query = ListTodosQuery {
            sort: Some("password_hash".to_string()),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = ListTodosQuery {
            limit: Some(500),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = ListTodosQuery {
            sort: Some("due_date".to_string()),
            order: Some("ASC".to_string()),
            page: Some(2),
            limit: Some(100),
            ..Default::default()
        };
        assert!(query.validate().is_ok());
    }
}
