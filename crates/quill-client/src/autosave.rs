//! Debounced auto-save for an editor.
//!
//! Every edit restarts the debounce window; the draft is saved once the
//! editor has been quiet for the whole window. Only notes that already have
//! an id are saved.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use quill_core::defaults::AUTOSAVE_DEBOUNCE_MS;

use crate::client::QuillClient;

/// Editor contents at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// `None` until the note has been created.
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
}

/// Outcome of the most recent save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saved { note_id: Uuid, saves: usize },
    Failed { note_id: Uuid, error: String },
}

struct PendingSave {
    id: Uuid,
    title: String,
    content: String,
}

/// Background saver. Dropping it flushes the pending draft.
pub struct AutoSaver {
    edits: Option<mpsc::UnboundedSender<PendingSave>>,
    status: watch::Receiver<SaveStatus>,
    task: Option<JoinHandle<()>>,
}

impl AutoSaver {
    /// Saver with the default one-second window.
    pub fn new(client: QuillClient) -> Self {
        Self::with_debounce(client, Duration::from_millis(AUTOSAVE_DEBOUNCE_MS))
    }

    pub fn with_debounce(client: QuillClient, debounce: Duration) -> Self {
        let (edits_tx, edits_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);
        let task = tokio::spawn(run(client, debounce, edits_rx, status_tx));
        Self {
            edits: Some(edits_tx),
            status: status_rx,
            task: Some(task),
        }
    }

    /// Record an edit. Returns `false` when the draft has no id and is ignored.
    pub fn edit(&self, draft: &Draft) -> bool {
        let Some(id) = draft.id else {
            return false;
        };
        let Some(edits) = &self.edits else {
            return false;
        };
        edits
            .send(PendingSave {
                id,
                title: draft.title.clone(),
                content: draft.content.clone(),
            })
            .is_ok()
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Save any pending draft now and stop.
    pub async fn flush(mut self) -> SaveStatus {
        self.edits.take();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.status()
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        // Closing the channel makes the task save what is pending and exit.
        self.edits.take();
    }
}

async fn run(
    client: QuillClient,
    debounce: Duration,
    mut edits: mpsc::UnboundedReceiver<PendingSave>,
    status: watch::Sender<SaveStatus>,
) {
    let mut saves = 0;
    while let Some(mut pending) = edits.recv().await {
        let mut closed = false;
        loop {
            match tokio::time::timeout(debounce, edits.recv()).await {
                Ok(Some(newer)) if newer.id == pending.id => pending = newer,
                Ok(Some(other_note)) => {
                    // Editor switched notes; save the previous one right away.
                    save(&client, &pending, &mut saves, &status).await;
                    pending = other_note;
                }
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }
        save(&client, &pending, &mut saves, &status).await;
        if closed {
            break;
        }
    }
}

async fn save(
    client: &QuillClient,
    pending: &PendingSave,
    saves: &mut usize,
    status: &watch::Sender<SaveStatus>,
) {
    match client
        .update_note(pending.id, &pending.title, &pending.content)
        .await
    {
        Ok(_) => {
            *saves += 1;
            tracing::debug!(note_id = %pending.id, saves = *saves, "Auto-saved note");
            status.send_replace(SaveStatus::Saved {
                note_id: pending.id,
                saves: *saves,
            });
        }
        Err(e) => {
            tracing::warn!(note_id = %pending.id, error = %e, "Auto-save failed");
            status.send_replace(SaveStatus::Failed {
                note_id: pending.id,
                error: e.to_string(),
            });
        }
    }
}
