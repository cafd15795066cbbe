use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::CategoryService;
use crate::features::todos::models::TodoRecord;
use crate::features::todos::payload::TodoChanges;
use crate::features::todos::query::TodoQuery;
use crate::shared::policy::ensure_can_access;
use crate::shared::types::PageMeta;

const SELECT_RECORD: &str = "SELECT t.id, t.title, t.completed, t.due_date, t.user_id, \
     t.category_id, t.created_at, t.updated_at, \
     c.name AS category_name, u.username AS owner_username, u.email AS owner_email \
     FROM todos t \
     JOIN users u ON u.id = t.user_id \
     LEFT JOIN categories c ON c.id = t.category_id";

/// Todo storage access plus the per-item ownership checks. Listing
/// scope is decided earlier, when the query is shaped.
pub struct TodoService {
    pool: PgPool,
    categories: Arc<CategoryService>,
}

impl TodoService {
    pub fn new(pool: PgPool, categories: Arc<CategoryService>) -> Self {
        Self { pool, categories }
    }

    pub async fn list(&self, query: &TodoQuery) -> Result<(Vec<TodoRecord>, PageMeta)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos t");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count todos: {:?}", e);
                AppError::Database(e)
            })?;

        let mut builder = QueryBuilder::<Postgres>::new(SELECT_RECORD);
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY ")
            .push(query.sort.column())
            .push(" ")
            .push(query.order.sql());
        builder.push(" LIMIT ").push_bind(query.limit);
        builder.push(" OFFSET ").push_bind(query.offset());

        let todos = builder
            .build_query_as::<TodoRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list todos: {:?}", e);
                AppError::Database(e)
            })?;

        let meta = PageMeta::new(total, todos.len() as i64, query.limit, query.page);

        Ok((todos, meta))
    }

    /// Existence is checked before access, so an unrelated user
    /// probing a real id gets 403, and a bogus id gets 404.
    pub async fn get(&self, id: Uuid, principal: &AuthenticatedUser) -> Result<TodoRecord> {
        let todo = self
            .fetch_record(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))?;

        ensure_can_access(todo.user_id, principal)?;

        Ok(todo)
    }

    pub async fn create(
        &self,
        principal: &AuthenticatedUser,
        changes: TodoChanges,
    ) -> Result<TodoRecord> {
        let category_id = changes.category_id.flatten();
        self.ensure_category_exists(category_id).await?;

        // normalize() in full mode guarantees a title
        let title = changes
            .title
            .ok_or_else(|| AppError::Internal("Create payload missing title".to_string()))?;

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO todos (title, due_date, user_id, category_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&title)
        .bind(changes.due_date.flatten())
        .bind(principal.id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create todo: {:?}", e);
            AppError::from(e)
        })?;

        tracing::info!("Todo created: id={}, user_id={}", id, principal.id);

        self.require_record(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        principal: &AuthenticatedUser,
        changes: TodoChanges,
    ) -> Result<TodoRecord> {
        self.get(id, principal).await?;

        if let Some(Some(category_id)) = changes.category_id {
            self.ensure_category_exists(Some(category_id)).await?;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE todos SET updated_at = NOW()");
        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(completed) = changes.completed {
            builder.push(", completed = ").push_bind(completed);
        }
        if let Some(category_id) = changes.category_id {
            builder.push(", category_id = ").push_bind(category_id);
        }
        if let Some(due_date) = changes.due_date {
            builder.push(", due_date = ").push_bind(due_date);
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to update todo {}: {:?}", id, e);
            AppError::from(e)
        })?;

        self.require_record(id).await
    }

    /// Invert the completion flag. This is a read followed by a
    /// write; two concurrent toggles of the same item may interleave
    /// and cancel out.
    pub async fn toggle(&self, id: Uuid, principal: &AuthenticatedUser) -> Result<TodoRecord> {
        let todo = self.get(id, principal).await?;

        sqlx::query("UPDATE todos SET completed = $1, updated_at = NOW() WHERE id = $2")
            .bind(!todo.completed)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to toggle todo {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        self.require_record(id).await
    }

    pub async fn delete(&self, id: Uuid, principal: &AuthenticatedUser) -> Result<()> {
        self.get(id, principal).await?;

        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete todo {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tracing::info!("Todo deleted: id={}", id);

        Ok(())
    }

    async fn fetch_record(&self, id: Uuid) -> Result<Option<TodoRecord>> {
        sqlx::query_as::<_, TodoRecord>(&format!("{SELECT_RECORD} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch todo {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    /// Re-read a row we just wrote. Its absence at this point is a
    /// server-side inconsistency, not a caller mistake.
    async fn require_record(&self, id: Uuid) -> Result<TodoRecord> {
        self.fetch_record(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Todo {} vanished after write", id)))
    }

    /// The failing field is the input, not a path resource, so a
    /// missing category is a 400, not a 404.
    async fn ensure_category_exists(&self, category_id: Option<i32>) -> Result<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };

        if self.categories.exists(category_id).await? {
            Ok(())
        } else {
            Err(AppError::BadRequest("Category does not exist".to_string()))
        }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TodoQuery) {
    builder.push(" WHERE 1=1");
    if let Some(owner_id) = query.owner_id {
        builder.push(" AND t.user_id = ").push_bind(owner_id);
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND t.category_id = ").push_bind(category_id);
    }
    if let Some(completed) = query.completed {
        builder.push(" AND t.completed = ").push_bind(completed);
    }
    if let Some(search) = query.search.clone() {
        builder.push(" AND t.title ILIKE ").push_bind(format!("%{}%", search));
    }
}
