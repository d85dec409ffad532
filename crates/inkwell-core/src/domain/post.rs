use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldErrors};

/// Upper bound on title length, in characters (matches the `varchar(255)` column).
pub const TITLE_MAX_CHARS: usize = 255;

/// Post entity - the single resource served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated post that has not been persisted yet.
///
/// The store assigns the id; timestamps are taken at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// Validate `title` and stamp the creation time.
    pub fn new(title: Option<&str>) -> Result<Self, DomainError> {
        let title = validate_title(title)?;
        Ok(Self {
            title,
            created_at: Utc::now(),
        })
    }
}

/// Check a submitted title and return it trimmed.
///
/// Absent, blank and over-long titles are rejected with an error keyed by `title`.
pub fn validate_title(title: Option<&str>) -> Result<String, DomainError> {
    let title = title.map(str::trim).unwrap_or_default();

    if title.is_empty() {
        return Err(DomainError::Validation(FieldErrors::single(
            "title",
            "The title field is required.",
        )));
    }

    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::Validation(FieldErrors::single(
            "title",
            format!("The title may not be greater than {TITLE_MAX_CHARS} characters."),
        )));
    }

    Ok(title.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_errors(result: Result<String, DomainError>) -> Vec<String> {
        match result {
            Err(DomainError::Validation(errors)) => errors.get("title").unwrap().to_vec(),
            other => panic!("expected a title validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_title_is_trimmed() {
        assert_eq!(
            validate_title(Some("  El post de prueba ")).unwrap(),
            "El post de prueba"
        );
    }

    #[test]
    fn test_missing_and_blank_titles_are_rejected() {
        for input in [None, Some(""), Some("   \t")] {
            let errors = title_errors(validate_title(input));
            assert_eq!(errors, vec!["The title field is required.".to_string()]);
        }
    }

    #[test]
    fn test_title_length_counts_characters() {
        let at_limit = "ñ".repeat(TITLE_MAX_CHARS);
        assert!(validate_title(Some(at_limit.as_str())).is_ok());

        let over = "a".repeat(TITLE_MAX_CHARS + 1);
        let errors = title_errors(validate_title(Some(over.as_str())));
        assert!(errors[0].contains("255"));
    }

    #[test]
    fn test_new_post_stamps_creation_time() {
        let before = Utc::now();
        let post = NewPost::new(Some("nuevo")).unwrap();
        assert_eq!(post.title, "nuevo");
        assert!(post.created_at >= before);
    }
}
