//! Replay command implementation.
//!
//! The replay command:
//! 1. Loads recorder configuration
//! 2. Parses the event script
//! 3. Feeds every event through an enabled trace store
//! 4. Snapshots the retained trees
//! 5. Writes and/or prints the result

use super::models::{ReplayArgs, ReplaySummary};
use crate::output::{render_logs, validate_path, write_logs, LogsDocument, RenderOptions};
use crate::parser::parse_events;
use crate::store::TraceStore;
use crate::utils::config::{load_config, RecorderConfig};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Config file read/parse failures
/// * Event script read/parse failures
/// * File write errors
pub fn execute_replay(args: ReplayArgs) -> Result<ReplaySummary> {
    let start_time = Instant::now();

    info!("Replaying events from: {}", args.input.display());

    // Step 1: Configuration
    info!("Step 1/4: Loading configuration...");
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RecorderConfig::default(),
    };
    if let Some(size) = args.min_call_stack_size {
        config.min_call_stack_size = size;
    }
    config.show_obj_full_name |= args.show_obj_full_name;
    debug!("Effective config: {:?}", config);

    // Step 2: Parse
    info!("Step 2/4: Parsing event script...");
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let events = parse_events(&raw).context("Failed to parse event script")?;

    // Step 3: Replay. Recording is forced on; the config's `enabled` flag
    // only applies to live stores.
    info!("Step 3/4: Replaying {} events...", events.len());
    let store = TraceStore::with_config(&config);
    store.enable();
    for event in &events {
        event.apply(&store);
    }

    let open_sequences = store.active_sequences();
    if open_sequences > 0 {
        warn!(
            "{} sequence(s) still have open calls at end of script; they are not recorded",
            open_sequences
        );
    }

    // Step 4: Output
    info!("Step 4/4: Writing output...");
    let snapshot = store.get_logs();
    let stats = store.stats();

    if let Some(path) = &args.output_json {
        let doc = LogsDocument::from_snapshot(&snapshot, config.min_call_stack_size);
        write_logs(&doc, path).context("Failed to write logs JSON")?;
        info!("✓ Logs written to: {}", path.display());
    }

    if args.print_tree {
        let options = RenderOptions::new().with_obj_full_name(config.show_obj_full_name);
        print!("{}", render_logs(snapshot.iter().map(|root| root.as_ref()), &options));
    }

    let summary = ReplaySummary {
        events: events.len(),
        roots: snapshot.len(),
        nodes: snapshot.node_count(),
        discarded_shallow: stats.discarded_shallow,
        unmatched_ends: stats.builder.unmatched_ends,
        mismatched_ends: stats.builder.mismatched_ends,
        open_sequences,
    };

    info!(
        "Replay completed in {:.2}s: {} roots retained, {} discarded",
        start_time.elapsed().as_secs_f64(),
        summary.roots,
        summary.discarded_shallow
    );

    Ok(summary)
}

/// Validate replay arguments
///
/// **Public** - can be called before execute_replay for early validation
pub fn validate_args(args: &ReplayArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if let Some(output) = &args.output_json {
        validate_path(output).context("Invalid output path")?;
    }

    if args.min_call_stack_size == Some(0) {
        anyhow::bail!("min_call_stack_size must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn script(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = ReplayArgs {
            input: "definitely/not/here.jsonl".into(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_threshold() {
        let file = script("{}");
        let args = ReplayArgs {
            input: file.path().to_path_buf(),
            min_call_stack_size: Some(0),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_ok() {
        let file = script("{}");
        let args = ReplayArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_replay_counts() {
        let file = script(
            r#"{"seq": 1, "event": "enter", "name": "a"}
{"seq": 1, "event": "enter", "name": "b"}
{"seq": 1, "event": "exit", "name": "b"}
{"seq": 1, "event": "exit", "name": "a"}
{"seq": 2, "event": "exit", "name": "stray"}
{"seq": 2, "event": "enter", "name": "open"}
"#,
        );

        let summary = execute_replay(ReplayArgs {
            input: file.path().to_path_buf(),
            min_call_stack_size: Some(2),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(summary.events, 6);
        assert_eq!(summary.roots, 1);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.unmatched_ends, 1);
        assert_eq!(summary.open_sequences, 1);
    }
}
