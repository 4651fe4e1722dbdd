//! Call tree construction from enter/exit events.
//!
//! This module owns:
//! - The `Call` node model and its attribute values
//! - Logical sequence identity (one active stack per sequence)
//! - The per-sequence builder that nests and aggregates calls

pub mod builder;
pub mod call;
pub mod sequence;

// Re-export main types
pub use builder::{BuilderStats, CallTreeBuilder};
pub use call::{attributes, Attributes, Call, Value};
pub use sequence::SequenceId;
