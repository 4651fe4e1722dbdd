use crate::output::RenderOptions;
use crate::utils::config::DEFAULT_MIN_CALL_STACK_SIZE;
use std::path::PathBuf;

/// Arguments for the replay command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Event script to replay
    pub input: PathBuf,

    /// Output path for JSON logs (optional)
    pub output_json: Option<PathBuf>,

    /// Retention threshold (overrides the config file when set)
    pub min_call_stack_size: Option<u16>,

    /// Recorder config file (optional)
    pub config: Option<PathBuf>,

    /// Print the retained trees to stdout
    pub print_tree: bool,

    /// Show the object each call was made on
    pub show_obj_full_name: bool,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("events.jsonl"),
            output_json: None,
            min_call_stack_size: None,
            config: None,
            print_tree: false,
            show_obj_full_name: false,
        }
    }
}

/// Arguments for the demo command
#[derive(Debug, Clone)]
pub struct DemoArgs {
    /// Worker threads running the instrumented workload
    pub threads: usize,

    /// Frames each worker simulates
    pub frames: usize,

    /// Retention threshold
    pub min_call_stack_size: u16,

    /// Rendering options for the printed trees
    pub render: RenderOptions,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            threads: 2,
            frames: 1,
            min_call_stack_size: DEFAULT_MIN_CALL_STACK_SIZE,
            render: RenderOptions::default(),
        }
    }
}

/// Outcome of a replay, for callers that want numbers instead of stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub roots: usize,
    pub nodes: usize,
    pub discarded_shallow: u64,
    pub unmatched_ends: u64,
    pub mismatched_ends: u64,
    pub open_sequences: usize,
}
