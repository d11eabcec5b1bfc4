//! Summarization relay.
//!
//! Turns one authorized summarize request into one upstream streaming call
//! and re-emits each upstream content delta as an outbound frame, in arrival
//! order, without accumulating anything server-side.
//!
//! ```text
//! client ── GET /notes/{id}/summarize ──> relay ── POST /chat/completions ──> provider
//!        <── data: {"content":"..."} ────       <── data: {choices[0].delta} ──
//! ```
//!
//! All checks that can fail (ownership, credential, upstream status) run in
//! [`SummaryRelay::open`], before the client sees a `200`. Failures after that
//! point end the stream with a single [`RelayFrame::Error`].

use std::sync::Arc;
use std::time::Instant;

use futures::{Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use quill_core::{AuthUser, Error, EventBus, NoteRepository, Result, ServerEvent};
use quill_inference::{DeltaStream, SummaryBackend};

/// Message sent when the note disappears mid-stream.
pub const NOTE_DELETED_MESSAGE: &str = "Note was deleted";

/// One outbound unit of a summary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    /// A content fragment, relayed as soon as it arrives.
    Delta(String),
    /// Terminal failure; nothing follows it.
    Error(String),
}

/// Opens summary sessions for notes.
#[derive(Clone)]
pub struct SummaryRelay {
    notes: Arc<dyn NoteRepository>,
    backend: Arc<dyn SummaryBackend>,
    event_bus: Arc<EventBus>,
}

impl SummaryRelay {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        backend: Arc<dyn SummaryBackend>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            notes,
            backend,
            event_bus,
        }
    }

    /// Authorize the request and open the upstream stream.
    ///
    /// Fails with `NoteNotFound` or `Forbidden` before any upstream call, and
    /// with the backend's error (`Config`, `Upstream`, `Request`) before any
    /// frame exists. A note deleted while it is being read is `NoteNotFound`.
    pub async fn open(&self, note_id: Uuid, user: &AuthUser) -> Result<RelaySession> {
        // Subscribed before the read: any deletion committed after it is queued here.
        let mut deletions = self.event_bus.subscribe();

        let note = self.notes.fetch_owned(note_id, user.user_id).await?;
        if deleted_since_subscribe(&mut deletions, note_id) {
            debug!(note_id = %note_id, "Note deleted before the upstream call");
            return Err(Error::NoteNotFound(note_id));
        }

        let deltas = self.backend.stream_summary(&note.content).await?;
        info!(
            subsystem = "api",
            component = "summary_relay",
            op = "summarize",
            note_id = %note_id,
            user_id = %user.user_id,
            model = self.backend.model_name(),
            "Summary stream opened"
        );

        Ok(RelaySession {
            note_id,
            deltas,
            deletions,
        })
    }
}

/// Drain queued events, reporting whether `note_id` was deleted.
fn deleted_since_subscribe(rx: &mut broadcast::Receiver<ServerEvent>, note_id: Uuid) -> bool {
    loop {
        match rx.try_recv() {
            Ok(event) if event.is_deletion_of(note_id) => return true,
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return false,
        }
    }
}

/// An open summary stream for one note.
pub struct RelaySession {
    note_id: Uuid,
    deltas: DeltaStream,
    deletions: broadcast::Receiver<ServerEvent>,
}

impl RelaySession {
    pub fn note_id(&self) -> Uuid {
        self.note_id
    }

    /// Outbound frames, in upstream order.
    ///
    /// Dropping the returned stream drops the upstream response and so
    /// closes the upstream connection.
    pub fn into_frames(self) -> impl Stream<Item = RelayFrame> + Send {
        let state = FrameState {
            note_id: self.note_id,
            deltas: self.deltas,
            deletions: Some(self.deletions),
            delta_count: 0,
            started: Instant::now(),
            outcome: None,
        };

        futures::stream::unfold(state, |mut st| async move {
            if st.outcome.is_some() {
                return None;
            }
            let frame = st.next_frame().await?;
            Some((frame, st))
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Completed,
    Errored,
    NoteDeleted,
}

struct FrameState {
    note_id: Uuid,
    deltas: DeltaStream,
    /// `None` once the bus has closed.
    deletions: Option<broadcast::Receiver<ServerEvent>>,
    delta_count: usize,
    started: Instant,
    outcome: Option<Outcome>,
}

impl FrameState {
    async fn next_frame(&mut self) -> Option<RelayFrame> {
        loop {
            tokio::select! {
                biased;

                event = recv_or_pending(&mut self.deletions) => match event {
                    Ok(event) if event.is_deletion_of(self.note_id) => {
                        self.outcome = Some(Outcome::NoteDeleted);
                        return Some(RelayFrame::Error(NOTE_DELETED_MESSAGE.to_string()));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Summary relay lagged behind the event bus");
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        self.deletions = None;
                        continue;
                    }
                },

                item = self.deltas.next() => {
                    return match item {
                        Some(Ok(delta)) => {
                            self.delta_count += 1;
                            tracing::trace!(len = delta.len(), "Relaying delta");
                            Some(RelayFrame::Delta(delta))
                        }
                        Some(Err(e)) => {
                            self.outcome = Some(Outcome::Errored);
                            Some(RelayFrame::Error(e.to_string()))
                        }
                        None => {
                            self.outcome = Some(Outcome::Completed);
                            None
                        }
                    };
                }
            }
        }
    }
}

async fn recv_or_pending(
    rx: &mut Option<broadcast::Receiver<ServerEvent>>,
) -> std::result::Result<ServerEvent, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => futures::future::pending().await,
    }
}

impl Drop for FrameState {
    fn drop(&mut self) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        match self.outcome {
            Some(Outcome::Completed) => info!(
                subsystem = "api",
                component = "summary_relay",
                note_id = %self.note_id,
                delta_count = self.delta_count,
                duration_ms,
                "Summary stream completed"
            ),
            Some(outcome) => warn!(
                subsystem = "api",
                component = "summary_relay",
                note_id = %self.note_id,
                delta_count = self.delta_count,
                duration_ms,
                outcome = ?outcome,
                "Summary stream ended with error"
            ),
            None => info!(
                subsystem = "api",
                component = "summary_relay",
                note_id = %self.note_id,
                delta_count = self.delta_count,
                duration_ms,
                "Summary stream closed by client"
            ),
        }
    }
}
