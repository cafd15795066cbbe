use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Columns a todo listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    DueDate,
}

impl SortField {
    /// Lenient parse: anything outside the allow-list falls back to
    /// creation time.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("created_at") => Self::CreatedAt,
            Some("updated_at") => Self::UpdatedAt,
            Some("title") => Self::Title,
            Some("due_date") => Self::DueDate,
            _ => Self::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "t.created_at",
            Self::UpdatedAt => "t.updated_at",
            Self::Title => "t.title",
            Self::DueDate => "t.due_date",
        }
    }

    pub fn is_valid(raw: &str) -> bool {
        matches!(raw, "created_at" | "updated_at" | "title" | "due_date")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than exactly `asc` (case-insensitive) sorts
    /// descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Raw listing parameters as they arrive from either surface, before
/// shaping. Every field is optional.
#[derive(Debug, Default, Clone)]
pub struct TodoQueryParams {
    pub completed: Option<bool>,
    pub category: Option<i32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A fully shaped listing query: normalized filters, sort, and page
/// window, with the ownership restriction already resolved.
#[derive(Debug, Clone)]
pub struct TodoQuery {
    /// `Some` for non-admin principals, restricting results to their
    /// own todos. Admins get `None` and see every matching row.
    pub owner_id: Option<i32>,
    pub category_id: Option<i32>,
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl TodoQuery {
    /// Shape raw parameters into an executable query. Sort, order,
    /// page and limit normalize silently to their defaults; only a
    /// non-positive category id is an outright error since it can
    /// never match a row the caller intended.
    pub fn shape(params: TodoQueryParams, principal: &AuthenticatedUser) -> Result<Self> {
        if let Some(category) = params.category {
            if category <= 0 {
                return Err(AppError::BadRequest(
                    "category must be a positive integer".to_string(),
                ));
            }
        }

        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            owner_id: (!principal.is_admin()).then_some(principal.id),
            category_id: params.category,
            completed: params.completed,
            search,
            sort: SortField::parse(params.sort.as_deref()),
            order: SortOrder::parse(params.order.as_deref()),
            page: params.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE),
            limit: params
                .limit
                .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
                .unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{admin_principal, user_principal};

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let query = TodoQuery::shape(TodoQueryParams::default(), &user_principal(7)).unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn unknown_sort_and_order_fall_back_silently() {
        let params = TodoQueryParams {
            sort: Some("password_hash".to_string()),
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        let query = TodoQuery::shape(params, &user_principal(7)).unwrap();

        assert_eq!(query.sort, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn asc_is_recognized_case_insensitively() {
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("ascending")), SortOrder::Desc);
    }

    #[test]
    fn out_of_range_page_and_limit_normalize_to_defaults() {
        let params = TodoQueryParams {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        let query = TodoQuery::shape(params, &user_principal(7)).unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn offset_is_page_window_start() {
        let params = TodoQueryParams {
            page: Some(3),
            limit: Some(25),
            ..Default::default()
        };
        let query = TodoQuery::shape(params, &user_principal(7)).unwrap();

        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn non_admin_scope_is_pinned_to_the_principal() {
        let query = TodoQuery::shape(TodoQueryParams::default(), &user_principal(7)).unwrap();
        assert_eq!(query.owner_id, Some(7));

        let query = TodoQuery::shape(TodoQueryParams::default(), &admin_principal(1)).unwrap();
        assert_eq!(query.owner_id, None);
    }

    #[test]
    fn non_positive_category_is_rejected() {
        let params = TodoQueryParams {
            category: Some(0),
            ..Default::default()
        };
        let err = TodoQuery::shape(params, &user_principal(7)).unwrap_err();

        assert_eq!(err.public_message(), "category must be a positive integer");
    }

    #[test]
    fn blank_search_is_dropped() {
        let params = TodoQueryParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let query = TodoQuery::shape(params, &user_principal(7)).unwrap();

        assert_eq!(query.search, None);
    }

    #[test]
    fn sort_allow_list_matches_the_sortable_columns() {
        for raw in ["created_at", "updated_at", "title", "due_date"] {
            assert!(SortField::is_valid(raw));
            assert_ne!(SortField::parse(Some(raw)).column(), "");
        }
        assert!(!SortField::is_valid("user_id"));
    }
}
