//! Core traits for quill abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY TRAIT
// =============================================================================

/// Repository for note storage operations.
///
/// The raw operations (`fetch`, `update`, `delete`) address notes by id only.
/// Handlers go through the `*_owned` variants, which resolve ownership first
/// so that a note is never read or mutated on behalf of another user.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return it with its assigned id and timestamps.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID. Returns [`Error::NoteNotFound`] if missing.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// List notes owned by `owner_id`, most recently updated first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Note>>;

    /// Replace title and content of a note.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Permanently delete a note.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Fetch a note on behalf of `owner_id`.
    ///
    /// Missing notes yield [`Error::NoteNotFound`]; notes owned by someone
    /// else yield [`Error::Forbidden`].
    async fn fetch_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Note> {
        let note = self.fetch(id).await?;
        if !note.is_owned_by(owner_id) {
            return Err(Error::Forbidden(format!(
                "Note {} belongs to another user",
                id
            )));
        }
        Ok(note)
    }

    /// Update a note on behalf of `owner_id`.
    async fn update_owned(&self, id: Uuid, owner_id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        self.fetch_owned(id, owner_id).await?;
        self.update(id, req).await
    }

    /// Delete a note on behalf of `owner_id`.
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        self.fetch_owned(id, owner_id).await?;
        self.delete(id).await
    }
}
