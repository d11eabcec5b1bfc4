//! Streaming summary consumer.
//!
//! A [`SummarySession`] owns one `GET /notes/{id}/summarize` connection. A
//! background task decodes the event stream and appends each `{content}`
//! fragment to the accumulated text; observers read snapshots through a
//! `watch` channel. The task is the only writer.

use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use quill_core::{ErrorBody, SummaryChunk};

use crate::sse::SseEventDecoder;

/// Lifecycle of a summary session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Idle,
    Streaming,
    /// The server closed the stream normally.
    Completed,
    /// The stream failed; the message says why.
    Errored(String),
    Cancelled,
}

impl SummaryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SummaryState::Completed | SummaryState::Errored(_) | SummaryState::Cancelled
        )
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySnapshot {
    pub state: SummaryState,
    /// Fragments concatenated in arrival order.
    pub text: String,
    pub fragments: usize,
    /// Events whose payload could not be parsed; they are skipped.
    pub malformed_events: usize,
}

impl Default for SummarySnapshot {
    fn default() -> Self {
        Self {
            state: SummaryState::Idle,
            text: String::new(),
            fragments: 0,
            malformed_events: 0,
        }
    }
}

/// Handle to a running summary stream. Dropping it cancels the stream.
pub struct SummarySession {
    note_id: Uuid,
    snapshots: watch::Receiver<SummarySnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SummarySession {
    /// Start consuming the response of `request` in a background task.
    pub(crate) fn spawn(note_id: Uuid, request: reqwest::RequestBuilder) -> Self {
        let (tx, rx) = watch::channel(SummarySnapshot::default());
        let cancel = CancellationToken::new();
        let consumer = Consumer {
            note_id,
            tx,
            snapshot: SummarySnapshot::default(),
        };
        let task = tokio::spawn(consumer.run(request, cancel.clone()));

        Self {
            note_id,
            snapshots: rx,
            cancel,
            task: Some(task),
        }
    }

    pub fn note_id(&self) -> Uuid {
        self.note_id
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> SummarySnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every change, for UI rendering.
    pub fn subscribe(&self) -> watch::Receiver<SummarySnapshot> {
        self.snapshots.clone()
    }

    /// Close the connection. No further events are processed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the session reaches a terminal state.
    pub async fn wait(&mut self) -> SummarySnapshot {
        let mut rx = self.snapshots.clone();
        // A closed channel means the task is gone; its last value is final.
        let _ = rx.wait_for(|s| s.state.is_terminal()).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.snapshot()
    }
}

impl Drop for SummarySession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Payload of a terminal `event: error` frame.
#[derive(Deserialize)]
struct ErrorFrame {
    error: String,
}

enum Step {
    Continue,
    Stop,
}

struct Consumer {
    note_id: Uuid,
    tx: watch::Sender<SummarySnapshot>,
    snapshot: SummarySnapshot,
}

impl Consumer {
    fn publish(&self) {
        self.tx.send_replace(self.snapshot.clone());
    }

    fn finish(&mut self, state: SummaryState) {
        match &state {
            SummaryState::Errored(msg) => warn!(
                subsystem = "client",
                component = "consumer",
                note_id = %self.note_id,
                fragments = self.snapshot.fragments,
                error = %msg,
                "Summary stream failed"
            ),
            other => info!(
                subsystem = "client",
                component = "consumer",
                note_id = %self.note_id,
                fragments = self.snapshot.fragments,
                malformed_events = self.snapshot.malformed_events,
                state = ?other,
                "Summary stream finished"
            ),
        }
        self.snapshot.state = state;
        self.publish();
    }

    async fn run(mut self, request: reqwest::RequestBuilder, cancel: CancellationToken) {
        self.snapshot.state = SummaryState::Streaming;
        self.publish();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.finish(SummaryState::Cancelled),
            result = request.send() => result,
        };
        let response = match response {
            Ok(r) => r,
            Err(e) => return self.finish(SummaryState::Errored(format!("Connection failed: {}", e))),
        };

        let status = response.status();
        if !status.is_success() {
            let message = error_message(status, response).await;
            return self.finish(SummaryState::Errored(message));
        }

        let mut body = response.bytes_stream();
        let mut decoder = SseEventDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.finish(SummaryState::Cancelled),
                next = body.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    let events = match decoder.push(&bytes) {
                        Ok(events) => events,
                        Err(e) => return self.finish(SummaryState::Errored(e.to_string())),
                    };
                    for event in events {
                        if let Step::Stop = self.handle(&event) {
                            return;
                        }
                    }
                    self.publish();
                }
                Some(Err(e)) => {
                    return self.finish(SummaryState::Errored(format!("Stream interrupted: {}", e)));
                }
                None => return self.finish(SummaryState::Completed),
            }
        }
    }

    fn handle(&mut self, event: &crate::sse::SseEvent) -> Step {
        if event.event == "error" {
            let message = serde_json::from_str::<ErrorFrame>(&event.data)
                .map(|f| f.error)
                .unwrap_or_else(|_| event.data.clone());
            self.finish(SummaryState::Errored(message));
            return Step::Stop;
        }
        if !event.is_message() {
            debug!(event = %event.event, "Ignoring unknown summary event");
            return Step::Continue;
        }

        match serde_json::from_str::<SummaryChunk>(&event.data) {
            Ok(chunk) => {
                self.snapshot.text.push_str(&chunk.content);
                self.snapshot.fragments += 1;
            }
            Err(e) => {
                self.snapshot.malformed_events += 1;
                warn!(
                    subsystem = "client",
                    component = "consumer",
                    note_id = %self.note_id,
                    error = %e,
                    "Skipping malformed summary event"
                );
            }
        }
        Step::Continue
    }
}

/// Best-effort message for a non-success response.
pub(crate) async fn error_message(status: reqwest::StatusCode, response: reqwest::Response) -> String {
    if status.is_redirection() {
        return "Authentication required".to_string();
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => body.trim().to_string(),
    }
}
