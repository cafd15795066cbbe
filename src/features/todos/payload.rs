use chrono::{DateTime, Utc};

use crate::core::error::{AppError, FieldError, Result};

/// Whether every creatable field must be present (create) or any
/// subset is acceptable (update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    Full,
    Partial,
}

/// Raw mutation payload after deserialization, before any checks.
/// The nested options on `category_id` and `due_date` separate
/// "field absent" (outer `None`) from "explicitly set to null"
/// (`Some(None)`).
#[derive(Debug, Default, Clone)]
pub struct TodoInput {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<Option<i32>>,
    pub due_date: Option<Option<String>>,
}

/// The normalized field set ready to merge into storage. Absent
/// fields stay absent so a partial update only touches what the
/// caller sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<Option<i32>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.completed.is_none()
            && self.category_id.is_none()
            && self.due_date.is_none()
    }
}

impl TodoInput {
    /// Validate and narrow the payload. All field problems are
    /// collected into a single validation error rather than failing
    /// on the first one.
    pub fn normalize(self, mode: NormalizeMode) -> Result<TodoChanges> {
        let mut errors = Vec::new();
        let mut changes = TodoChanges::default();

        match self.title {
            Some(raw) => {
                let title = raw.trim().to_string();
                if (2..=120).contains(&title.chars().count()) {
                    changes.title = Some(title);
                } else {
                    errors.push(FieldError {
                        field: "title".to_string(),
                        message: "Title must be between 2 and 120 characters long".to_string(),
                    });
                }
            }
            None if mode == NormalizeMode::Full => {
                errors.push(FieldError {
                    field: "title".to_string(),
                    message: "Title is required".to_string(),
                });
            }
            None => {}
        }

        match self.completed {
            // New todos always start uncompleted
            Some(_) if mode == NormalizeMode::Full => {
                errors.push(FieldError {
                    field: "completed".to_string(),
                    message: "Completed cannot be set at creation".to_string(),
                });
            }
            completed => changes.completed = completed,
        }

        match self.category_id {
            Some(Some(id)) if id <= 0 => {
                errors.push(FieldError {
                    field: "category_id".to_string(),
                    message: "Category id must be a positive integer".to_string(),
                });
            }
            category_id => changes.category_id = category_id,
        }

        match self.due_date {
            Some(Some(raw)) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(parsed) => changes.due_date = Some(Some(parsed.with_timezone(&Utc))),
                Err(_) => errors.push(FieldError {
                    field: "due_date".to_string(),
                    message: "Due date must be a valid ISO-8601 timestamp".to_string(),
                }),
            },
            Some(None) => changes.due_date = Some(None),
            None => {}
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if mode == NormalizeMode::Partial && changes.is_empty() {
            return Err(AppError::BadRequest(
                "Provide at least one field to update".to_string(),
            ));
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: &AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.iter().map(|e| e.field.clone()).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn full_mode_requires_a_title() {
        let err = TodoInput::default().normalize(NormalizeMode::Full).unwrap_err();
        assert_eq!(fields(&err), vec!["title"]);
    }

    #[test]
    fn title_is_trimmed_and_length_checked() {
        let input = TodoInput {
            title: Some("  buy milk  ".to_string()),
            ..Default::default()
        };
        let changes = input.normalize(NormalizeMode::Full).unwrap();
        assert_eq!(changes.title.as_deref(), Some("buy milk"));

        let input = TodoInput {
            title: Some("   x   ".to_string()),
            ..Default::default()
        };
        let err = input.normalize(NormalizeMode::Partial).unwrap_err();
        assert_eq!(fields(&err), vec!["title"]);
    }

    #[test]
    fn completed_is_rejected_at_creation_but_fine_on_update() {
        let input = TodoInput {
            title: Some("buy milk".to_string()),
            completed: Some(true),
            ..Default::default()
        };
        let err = input.clone().normalize(NormalizeMode::Full).unwrap_err();
        assert_eq!(fields(&err), vec!["completed"]);

        let changes = input.normalize(NormalizeMode::Partial).unwrap();
        assert_eq!(changes.completed, Some(true));
    }

    #[test]
    fn explicit_null_is_distinguished_from_absent() {
        let input = TodoInput {
            category_id: Some(None),
            due_date: Some(None),
            ..Default::default()
        };
        let changes = input.normalize(NormalizeMode::Partial).unwrap();

        assert_eq!(changes.category_id, Some(None));
        assert_eq!(changes.due_date, Some(None));

        let input = TodoInput {
            completed: Some(false),
            ..Default::default()
        };
        let changes = input.normalize(NormalizeMode::Partial).unwrap();
        assert_eq!(changes.category_id, None);
        assert_eq!(changes.due_date, None);
    }

    #[test]
    fn due_date_must_parse_as_iso_8601() {
        let input = TodoInput {
            title: Some("buy milk".to_string()),
            due_date: Some(Some("2026-01-15T10:00:00Z".to_string())),
            ..Default::default()
        };
        let changes = input.normalize(NormalizeMode::Full).unwrap();
        assert!(changes.due_date.unwrap().is_some());

        let input = TodoInput {
            due_date: Some(Some("next tuesday".to_string())),
            ..Default::default()
        };
        let err = input.normalize(NormalizeMode::Partial).unwrap_err();
        assert_eq!(fields(&err), vec!["due_date"]);
    }

    #[test]
    fn non_positive_category_id_is_a_field_error() {
        let input = TodoInput {
            category_id: Some(Some(-3)),
            ..Default::default()
        };
        let err = input.normalize(NormalizeMode::Partial).unwrap_err();
        assert_eq!(fields(&err), vec!["category_id"]);
    }

    #[test]
    fn empty_partial_payload_is_rejected() {
        let err = TodoInput::default()
            .normalize(NormalizeMode::Partial)
            .unwrap_err();
        assert_eq!(err.public_message(), "Provide at least one field to update");
    }

    #[test]
    fn all_field_problems_are_reported_together() {
        let input = TodoInput {
            title: Some("x".to_string()),
            category_id: Some(Some(0)),
            due_date: Some(Some("nope".to_string())),
            ..Default::default()
        };
        let err = input.normalize(NormalizeMode::Partial).unwrap_err();
        assert_eq!(fields(&err), vec!["title", "category_id", "due_date"]);
    }
}
