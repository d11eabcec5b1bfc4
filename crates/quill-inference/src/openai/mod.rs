//! OpenAI-compatible summary backend.
//!
//! Works with any endpoint that speaks the streaming `/chat/completions`
//! protocol (OpenAI, Azure OpenAI, Ollama in compatibility mode, vLLM,
//! LM Studio).
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use quill_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use quill_inference::SummaryBackend;
//!
//! #[tokio::main]
//! async fn main() -> quill_core::Result<()> {
//!     let backend = OpenAIBackend::new(OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         api_key: Some("ollama".to_string()),
//!         model: "llama3".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let mut deltas = backend.stream_summary("Some long note...").await?;
//!     while let Some(delta) = deltas.next().await {
//!         print!("{}", delta?);
//!     }
//!     Ok(())
//! }
//! ```

mod backend;
mod error;
mod streaming;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_OPENAI_URL, MISSING_KEY_MESSAGE};
pub use error::{upstream_error, ProviderErrorCode};
pub use streaming::{
    parse_data_line, parse_sse_body, parse_sse_stream, LineOutcome, SseLineDecoder, MAX_LINE_BYTES,
    DATA_PREFIX, DONE_SENTINEL,
};
pub use types::*;
