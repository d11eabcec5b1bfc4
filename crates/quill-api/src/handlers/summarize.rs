//! Streamed note summaries over server-sent events.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use quill_core::{ErrorBody, SummaryChunk};

use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::services::RelayFrame;
use crate::state::AppState;

/// `GET /notes/{id}/summarize`
///
/// Emits `data: {"content": "..."}` per delta. A failure after the stream
/// opened is sent as a final `event: error` with `data: {"error": "..."}`.
/// Failures before that are regular JSON error responses.
pub async fn summarize_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = state.relay.open(id, &user).await?;
    let events = session.into_frames().map(|frame| Ok(frame_to_event(frame)));

    Ok(Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(state.sse_keepalive)
            .text("keepalive"),
    ))
}

fn frame_to_event(frame: RelayFrame) -> Event {
    match frame {
        RelayFrame::Delta(content) => Event::default().data(json_line(&SummaryChunk { content })),
        RelayFrame::Error(error) => Event::default()
            .event("error")
            .data(json_line(&ErrorBody { error })),
    }
}

fn json_line<T: serde::Serialize>(value: &T) -> String {
    // Plain string-field structs always serialize.
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
