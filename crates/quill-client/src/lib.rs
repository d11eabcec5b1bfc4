//! # quill-client
//!
//! Client side of quill: a typed HTTP client for notes and tags, a
//! streaming consumer for note summaries, and a debounced auto-saver.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quill_client::{QuillClient, SummaryState};
//!
//! #[tokio::main]
//! async fn main() -> quill_core::Result<()> {
//!     let client = QuillClient::new("http://localhost:3000", "session-token")?;
//!     let note = client.create_note("Standup", "Shipped the release.").await?;
//!
//!     let mut session = client.summarize(Some(note.id))?;
//!     let summary = session.wait().await;
//!     if summary.state == SummaryState::Completed {
//!         println!("{}", summary.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod autosave;
pub mod client;
pub mod session;
pub mod sse;

pub use autosave::{AutoSaver, Draft, SaveStatus};
pub use client::QuillClient;
pub use session::{SummarySession, SummarySnapshot, SummaryState};
pub use sse::{SseEvent, SseEventDecoder, MAX_EVENT_BYTES};
