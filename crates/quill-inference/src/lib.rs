//! # quill-inference
//!
//! Upstream LLM provider client for quill summaries.
//!
//! This crate provides:
//! - The [`SummaryBackend`] trait consumed by the summarization relay
//! - An OpenAI-compatible streaming implementation (feature `openai`, default)
//! - A pure SSE parser turning upstream bytes into content deltas
//! - A scripted mock backend (feature `mock`) for tests in dependent crates
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_inference::{OpenAIBackend, SummaryBackend};
//!
//! #[tokio::main]
//! async fn main() -> quill_core::Result<()> {
//!     let backend = OpenAIBackend::from_env()?;
//!     let _deltas = backend.stream_summary("Hello").await?;
//!     Ok(())
//! }
//! ```

pub mod summary;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use summary::{DeltaStream, SummaryBackend};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig, ProviderErrorCode};
