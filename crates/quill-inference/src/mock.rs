//! Scripted summary backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_inference::mock::MockSummaryBackend;
//!
//! let backend = MockSummaryBackend::new().with_deltas(["Hel", "lo"]);
//! let deltas = backend.stream_summary("note text").await?;
//! assert_eq!(backend.call_count(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Notify;

use quill_core::{Error, Result};

use crate::summary::{DeltaStream, SummaryBackend};

/// Mock summary backend for testing.
#[derive(Clone)]
pub struct MockSummaryBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    drops: Arc<DropTracker>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    deltas: Vec<String>,
    failure: Option<MockFailure>,
    stream_error_after: Option<(usize, String)>,
    delta_interval: Option<Duration>,
    hold_open: bool,
}

/// Failure returned from `stream_summary` before any delta exists.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Config(String),
    Upstream { status: u16, message: String },
    Request(String),
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            MockFailure::Config(msg) => Error::Config(msg.clone()),
            MockFailure::Upstream { status, message } => Error::Upstream {
                status: *status,
                message: message.clone(),
            },
            MockFailure::Request(msg) => Error::Request(msg.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub input: String,
    pub timestamp: Instant,
}

#[derive(Default)]
struct DropTracker {
    count: AtomicUsize,
    notify: Notify,
}

/// Marks a stream as released when the stream state is dropped.
struct StreamGuard(Arc<DropTracker>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.count.fetch_add(1, Ordering::SeqCst);
        self.0.notify.notify_one();
    }
}

struct MockStreamState {
    pending: VecDeque<String>,
    emitted: usize,
    error_after: Option<(usize, String)>,
    interval: Option<Duration>,
    hold_open: bool,
    done: bool,
    _guard: StreamGuard,
}

impl MockSummaryBackend {
    /// Create a backend that streams nothing and completes.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
            drops: Arc::new(DropTracker::default()),
        }
    }

    /// Deltas to stream, in order.
    pub fn with_deltas<I, S>(mut self, deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::make_mut(&mut self.config).deltas = deltas.into_iter().map(Into::into).collect();
        self
    }

    /// Fail every call upfront.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self
    }

    /// Yield a terminal [`Error::Stream`] after `count` deltas.
    pub fn with_stream_error_after(mut self, count: usize, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).stream_error_after = Some((count, message.into()));
        self
    }

    /// Pause before every delta.
    pub fn with_delta_interval(mut self, interval: Duration) -> Self {
        Arc::make_mut(&mut self.config).delta_interval = Some(interval);
        self
    }

    /// Never end the stream after the scripted deltas; it stays open until dropped.
    pub fn holding_open(mut self) -> Self {
        Arc::make_mut(&mut self.config).hold_open = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of `stream_summary` invocations.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Number of streams handed out and since dropped.
    pub fn dropped_streams(&self) -> usize {
        self.drops.count.load(Ordering::SeqCst)
    }

    /// Wait until at least one handed-out stream has been dropped.
    pub async fn wait_for_drop(&self) {
        loop {
            let notified = self.drops.notify.notified();
            if self.dropped_streams() > 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Default for MockSummaryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryBackend for MockSummaryBackend {
    async fn stream_summary(&self, text: &str) -> Result<DeltaStream> {
        self.call_log.lock().unwrap().push(MockCall {
            input: text.to_string(),
            timestamp: Instant::now(),
        });

        if let Some(failure) = &self.config.failure {
            return Err(failure.to_error());
        }

        let state = MockStreamState {
            pending: self.config.deltas.iter().cloned().collect(),
            emitted: 0,
            error_after: self.config.stream_error_after.clone(),
            interval: self.config.delta_interval,
            hold_open: self.config.hold_open,
            done: false,
            _guard: StreamGuard(Arc::clone(&self.drops)),
        };

        let stream = futures::stream::unfold(state, |mut st| async move {
            if st.done {
                return None;
            }
            if let Some((after, msg)) = &st.error_after {
                if st.emitted >= *after {
                    st.done = true;
                    let err = Error::Stream(msg.clone());
                    return Some((Err(err), st));
                }
            }
            match st.pending.pop_front() {
                Some(delta) => {
                    if let Some(interval) = st.interval {
                        tokio::time::sleep(interval).await;
                    }
                    st.emitted += 1;
                    Some((Ok(delta), st))
                }
                None if st.hold_open => {
                    futures::future::pending::<()>().await;
                    None
                }
                None => None,
            }
        });

        Ok(Box::pin(stream))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_mock_streams_scripted_deltas() {
        let backend = MockSummaryBackend::new().with_deltas(["Hel", "lo"]);
        let deltas: Vec<String> = backend
            .stream_summary("text")
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect()
            .await;

        assert_eq!(deltas, vec!["Hel", "lo"]);
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.get_calls()[0].input, "text");
        assert_eq!(backend.dropped_streams(), 1);
    }

    #[tokio::test]
    async fn test_mock_upfront_failure() {
        let backend = MockSummaryBackend::new().with_failure(MockFailure::Upstream {
            status: 429,
            message: "slow down".to_string(),
        });
        let err = backend.stream_summary("text").await.err().unwrap();
        assert_eq!(err.upstream_status(), Some(429));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_stream_error_is_terminal() {
        let backend = MockSummaryBackend::new()
            .with_deltas(["a", "b", "c"])
            .with_stream_error_after(1, "reset");
        let items: Vec<_> = backend.stream_summary("x").await.unwrap().collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert!(matches!(&items[1], Err(Error::Stream(m)) if m == "reset"));
    }

    #[tokio::test]
    async fn test_mock_held_stream_reports_drop() {
        let backend = MockSummaryBackend::new().with_deltas(["a"]).holding_open();
        let mut stream = backend.stream_summary("x").await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        assert_eq!(backend.dropped_streams(), 0);

        drop(stream);
        tokio::time::timeout(Duration::from_secs(1), backend.wait_for_drop())
            .await
            .unwrap();
        assert_eq!(backend.dropped_streams(), 1);
    }
}
