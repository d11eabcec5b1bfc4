//! HTTP handlers for quill-api.

pub mod health;
pub mod notes;
pub mod summarize;
pub mod tags;
