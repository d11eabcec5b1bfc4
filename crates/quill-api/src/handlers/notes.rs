//! Note CRUD handlers. Every operation is scoped to the authenticated owner.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::{
    validate_note_fields, CreateNoteRequest, Note, ServerEvent, UpdateNoteRequest,
};

use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Body of create and update requests.
///
/// Missing fields deserialize as empty strings so they fail validation with
/// a 400 instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct NoteBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Serialize)]
pub struct NoteMutationResponse {
    pub note: Note,
    pub message: &'static str,
}

pub async fn list_notes(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<NoteListResponse>, ApiError> {
    let notes = state.db.notes.list_for_owner(user.user_id).await?;
    Ok(Json(NoteListResponse { notes }))
}

pub async fn create_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    validate_note_fields(&body.title, &body.content)?;

    let note = state
        .db
        .notes
        .insert(CreateNoteRequest {
            owner_id: user.user_id,
            title: body.title,
            content: body.content,
        })
        .await?;

    state.event_bus.emit(ServerEvent::NoteCreated {
        note_id: note.id,
        owner_id: note.owner_id,
    });
    tracing::info!(note_id = %note.id, user_id = %user.user_id, "Note created");

    Ok((
        StatusCode::CREATED,
        Json(NoteMutationResponse {
            note,
            message: "Note created",
        }),
    ))
}

pub async fn get_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.db.notes.fetch_owned(id, user.user_id).await?;
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NoteBody>,
) -> Result<Json<NoteMutationResponse>, ApiError> {
    validate_note_fields(&body.title, &body.content)?;

    let note = state
        .db
        .notes
        .update_owned(
            id,
            user.user_id,
            UpdateNoteRequest {
                title: body.title,
                content: body.content,
            },
        )
        .await?;

    state.event_bus.emit(ServerEvent::NoteUpdated {
        note_id: note.id,
        owner_id: note.owner_id,
    });

    Ok(Json(NoteMutationResponse {
        note,
        message: "Note updated",
    }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.notes.delete_owned(id, user.user_id).await?;

    state.event_bus.emit(ServerEvent::NoteDeleted {
        note_id: id,
        owner_id: user.user_id,
    });
    tracing::info!(note_id = %id, user_id = %user.user_id, "Note deleted");

    Ok(StatusCode::NO_CONTENT)
}
