use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::FieldError;

/// Uniform error body for every failed request:
/// `{"status": "error", "message": ..., "errors": [...]?}` with `errors`
/// present only for validation-shaped failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Pagination metadata returned alongside every todo page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, SimpleObject)]
pub struct PageMeta {
    pub total: i64,
    pub count: i64,
    pub limit: i64,
    pub pages: i64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
}

impl PageMeta {
    pub fn new(total: i64, count: i64, limit: i64, current_page: i64) -> Self {
        // ceil(total / limit), but never less than one page
        let pages = ((total + limit - 1) / limit).max(1);
        Self {
            total,
            count,
            limit,
            pages,
            current_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        assert_eq!(PageMeta::new(25, 10, 10, 1).pages, 3);
        assert_eq!(PageMeta::new(30, 10, 10, 1).pages, 3);
        assert_eq!(PageMeta::new(31, 10, 10, 1).pages, 4);
        assert_eq!(PageMeta::new(1, 1, 100, 1).pages, 1);
    }

    #[test]
    fn pages_is_at_least_one_even_when_empty() {
        let meta = PageMeta::new(0, 0, 10, 1);
        assert_eq!(meta.pages, 1);
        assert_eq!(meta.total, 0);
    }

    #[test]
    fn current_page_serializes_camel_cased() {
        let meta = PageMeta::new(5, 5, 10, 2);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert!(json.get("current_page").is_none());
    }
}
