//! The summary backend abstraction consumed by the relay.

use futures::Stream;
use std::pin::Pin;

use quill_core::Result;

/// Ordered stream of content deltas from one upstream session.
///
/// Items arrive in upstream order. An `Err` item is terminal: the stream
/// yields nothing after it.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A provider able to stream a summary of some text.
///
/// Implementations make at most one upstream call per invocation and must
/// fail before any network I/O when they are not configured to make it.
/// Dropping the returned stream releases the upstream connection.
#[async_trait::async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Open an upstream summary stream for `text`.
    ///
    /// Errors returned here happen before any delta exists (missing
    /// credential, connection failure, non-success upstream status).
    async fn stream_summary(&self, text: &str) -> Result<DeltaStream>;

    /// Model name used for summaries.
    fn model_name(&self) -> &str;
}
