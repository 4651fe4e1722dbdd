//! JSON logs output writer.
//!
//! Writes snapshots of retained call trees to JSON files with proper
//! formatting, and reads them back for validation.

use crate::recorder::Call;
use crate::store::LogSnapshot;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level logs structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsDocument {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the snapshot was exported
    pub generated_at: String,

    /// Retention threshold in force when the snapshot was taken
    pub min_call_stack_size: u16,

    /// Retained roots, in completion order
    pub roots: Vec<Call>,
}

impl LogsDocument {
    /// Build a document from a snapshot
    ///
    /// **Public** - used by commands before writing
    pub fn from_snapshot(snapshot: &LogSnapshot, min_call_stack_size: u16) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            min_call_stack_size,
            roots: snapshot.to_calls(),
        }
    }

    /// Total stored nodes across all roots
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Call::node_count).sum()
    }
}

/// Write a logs document to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `doc` - Document to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_logs(doc: &LogsDocument, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing logs to: {}", output_path.display());

    validate_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, doc).map_err(OutputError::SerializationFailed)?;

    info!(
        "Logs written successfully ({} roots, {} bytes)",
        doc.roots.len(),
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a logs document to a pretty JSON string
pub fn logs_to_string(doc: &LogsDocument) -> Result<String, OutputError> {
    serde_json::to_string_pretty(doc).map_err(OutputError::SerializationFailed)
}

/// Validate that an output path is writable
///
/// **Public** - also used by commands for early validation
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a logs document from a JSON file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_logs(input_path: impl AsRef<Path>) -> Result<LogsDocument, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading logs from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let doc: LogsDocument =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!("Logs loaded: version {}, {} roots", doc.version, doc.roots.len());

    Ok(doc)
}
