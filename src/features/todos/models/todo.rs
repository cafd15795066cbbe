use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A todo row joined with its category name and owner columns, so a
/// single query can produce the full response shape.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRecord {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub owner_username: String,
    pub owner_email: String,
}
