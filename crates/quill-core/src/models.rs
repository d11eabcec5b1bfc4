//! Core data models for quill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::TITLE_MAX_CHARS;
use crate::error::{Error, Result};

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether `user_id` may read or mutate this note.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
}

/// Request for replacing a note's title and content.
#[derive(Debug, Clone)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
}

/// Validate the editable fields of a note.
///
/// Both fields are required; the title is capped at
/// [`TITLE_MAX_CHARS`] characters (not bytes).
pub fn validate_note_fields(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(Error::InvalidInput(format!(
            "Title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("Content is required".to_string()));
    }
    Ok(())
}

// =============================================================================
// AUTH TYPES
// =============================================================================

/// The authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl AuthUser {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

// =============================================================================
// SUMMARY WIRE TYPES
// =============================================================================

/// Payload of one outbound summary event: `{"content": "<fragment>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryChunk {
    pub content: String,
}

/// Payload of a terminal error event or an upfront JSON error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response body of the tag endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_regular_note() {
        assert!(validate_note_fields("Groceries", "milk, eggs").is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let err = validate_note_fields("   ", "body").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_blank_content() {
        let err = validate_note_fields("Title", "\n\t").unwrap_err();
        assert!(err.to_string().contains("Content is required"));
    }

    #[test]
    fn test_validate_title_limit_counts_chars() {
        let at_limit = "é".repeat(TITLE_MAX_CHARS);
        assert!(validate_note_fields(&at_limit, "body").is_ok());

        let over = "a".repeat(TITLE_MAX_CHARS + 1);
        assert!(validate_note_fields(&over, "body").is_err());
    }

    #[test]
    fn test_note_ownership() {
        let owner = Uuid::new_v4();
        let note = Note {
            id: Uuid::now_v7(),
            owner_id: owner,
            title: "t".to_string(),
            content: "c".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(note.is_owned_by(owner));
        assert!(!note.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_summary_chunk_wire_format() {
        let chunk = SummaryChunk {
            content: "Hel".to_string(),
        };
        assert_eq!(serde_json::to_string(&chunk).unwrap(), r#"{"content":"Hel"}"#);
    }
}
