//! Service layer for business logic.

pub mod summary_relay;

pub use summary_relay::{RelayFrame, RelaySession, SummaryRelay};
