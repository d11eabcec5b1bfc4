//! Centralized default constants for quill.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// NOTES
// =============================================================================

/// Maximum note title length in characters.
pub const TITLE_MAX_CHARS: usize = 255;

// =============================================================================
// TAGS
// =============================================================================

/// Maximum number of tags returned by the tag extractor.
pub const MAX_TAGS: usize = 5;

// =============================================================================
// SUMMARIZATION
// =============================================================================

/// System instruction sent ahead of the note content.
pub const SUMMARY_SYSTEM_PROMPT: &str = "Summarize the following text in 2-3 sentences.";

/// Default chat model used for summaries.
pub const SUMMARY_MODEL: &str = "gpt-3.5-turbo";

/// Bound on waiting for the upstream response headers (seconds).
pub const UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Bound on establishing the upstream TCP/TLS connection (seconds).
pub const UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Bound on the gap between two upstream body chunks (seconds).
pub const UPSTREAM_IDLE_TIMEOUT_SECS: u64 = 30;

/// Interval between SSE keep-alive comments on an idle stream (seconds).
pub const SSE_KEEPALIVE_SECS: u64 = 15;

// =============================================================================
// EVENT BUS
// =============================================================================

/// Broadcast buffer capacity of the note event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// CLIENT
// =============================================================================

/// Debounce window for editor auto-save (milliseconds).
pub const AUTOSAVE_DEBOUNCE_MS: u64 = 1000;
