//! Output writers for recorded call trees.
//!
//! This module handles presenting snapshots:
//! - JSON documents (write, read back, string)
//! - Indented text trees

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{logs_to_string, read_logs, validate_path, write_logs, LogsDocument};
pub use text::{render_logs, render_tree, split_object_full_name, RenderOptions};
