//! # quill-core
//!
//! Core types, traits, and abstractions for quill.
//!
//! This crate provides the note model, the shared error type, the
//! [`NoteRepository`] trait implemented by the storage layer, the keyword
//! tag extractor, and the note event bus.

pub mod defaults;
pub mod error;
pub mod events;
pub mod models;
pub mod tags;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, ServerEvent};
pub use models::*;
pub use tags::{extract_tags, tokenize, STOP_WORDS};
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
