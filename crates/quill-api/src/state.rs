//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use quill_core::defaults::{EVENT_BUS_CAPACITY, SSE_KEEPALIVE_SECS};
use quill_core::EventBus;
use quill_db::Database;
use quill_inference::SummaryBackend;

use crate::auth::SessionResolver;
use crate::services::SummaryRelay;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub relay: SummaryRelay,
    pub sessions: Arc<dyn SessionResolver>,
    /// Note lifecycle events (create, update, delete).
    pub event_bus: Arc<EventBus>,
    /// Interval between keep-alive comments on idle summary streams.
    pub sse_keepalive: Duration,
}

impl AppState {
    /// Wire the state from its collaborators.
    pub fn new(
        db: Database,
        backend: Arc<dyn SummaryBackend>,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
        let relay = SummaryRelay::new(db.notes.clone(), backend, event_bus.clone());
        Self {
            db,
            relay,
            sessions,
            event_bus,
            sse_keepalive: Duration::from_secs(SSE_KEEPALIVE_SECS),
        }
    }

    pub fn with_sse_keepalive(mut self, interval: Duration) -> Self {
        self.sse_keepalive = interval;
        self
    }
}
