//! Retained call trees and consumer snapshots.
//!
//! The store sits on top of the recorder: it decides which completed roots
//! are kept and hands out immutable snapshots of them.

pub mod snapshot;
pub mod trace_store;

// Re-export main types
pub use snapshot::LogSnapshot;
pub use trace_store::{StoreStats, TraceStore};
