//! Test fixtures for database integration tests.
//!
//! The test database URL comes from `DATABASE_URL`. PostgreSQL-backed tests
//! call [`test_database_url`] and skip themselves when it returns `None`.

use uuid::Uuid;

use quill_core::CreateNoteRequest;

/// Database URL for PostgreSQL integration tests, if configured.
pub fn test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Build a create request with predictable title/content.
pub fn note_request(owner_id: Uuid, title: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        owner_id,
        title: title.to_string(),
        content: format!("Content of {}", title),
    }
}
