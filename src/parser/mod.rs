//! Event script parsing.
//!
//! This module handles:
//! - Parsing recorded enter/exit streams (JSON array, document or lines)
//! - Validating event fields
//! - Replaying events into a trace store

pub mod event_script;

// Re-export main types
pub use event_script::{parse_events, validate_event_format, EventKind, TraceEvent};
