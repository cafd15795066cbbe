use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;

/// CRUD over the shared category catalogue. Categories are global,
/// not per-user, so no ownership checks apply here.
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch category {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn create(&self, name: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::from(e)
        })?;

        tracing::info!("Category created: id={}, name={}", category.id, category.name);

        Ok(category)
    }

    pub async fn update(&self, id: i32, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category {}: {:?}", id, e);
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    /// Todos pointing at the category keep existing with a null
    /// category (ON DELETE SET NULL).
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        tracing::info!("Category deleted: id={}", id);

        Ok(())
    }

    /// Existence probe used when a todo mutation references a category.
    pub async fn exists(&self, id: i32) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i32>("SELECT id FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check category {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(found.is_some())
    }
}
