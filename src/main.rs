//! Chain Trace CLI
//!
//! Replays recorded enter/exit event scripts into call trees, runs an
//! instrumented demo workload, and validates exported logs.

use anyhow::Result;
use chain_trace::commands::{
    display_schema, display_version, execute_demo, execute_replay, validate_args,
    validate_logs_file, DemoArgs, ReplayArgs,
};
use chain_trace::output::RenderOptions;
use chain_trace::utils::config::DEFAULT_MIN_CALL_STACK_SIZE;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Chain Trace - live call-chain recorder
#[derive(Parser, Debug)]
#[command(name = "chain-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an event script and record its call trees
    Replay {
        /// Event script (JSON array, {"events": [...]}, or JSON Lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON logs
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum tree depth to retain (overrides config)
        #[arg(short, long, env = "CHAIN_TRACE_MIN_CALL_STACK_SIZE")]
        min_call_stack_size: Option<u16>,

        /// Recorder config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print retained trees to stdout
        #[arg(long)]
        tree: bool,

        /// Show the object each call was made on
        #[arg(long)]
        show_obj_full_name: bool,
    },

    /// Run an instrumented multi-threaded demo workload
    Demo {
        /// Worker threads
        #[arg(long, default_value = "2")]
        threads: usize,

        /// Frames per worker
        #[arg(long, default_value = "1")]
        frames: usize,

        /// Minimum tree depth to retain
        #[arg(short, long, default_value_t = DEFAULT_MIN_CALL_STACK_SIZE)]
        min_call_stack_size: u16,

        /// Show the object each call was made on
        #[arg(long)]
        show_obj_full_name: bool,
    },

    /// Validate a logs JSON file
    Validate {
        /// Path to logs JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Print the trees after validating
        #[arg(long)]
        tree: bool,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Replay {
            input,
            output,
            min_call_stack_size,
            config,
            tree,
            show_obj_full_name,
        } => {
            let args = ReplayArgs {
                input,
                output_json: output,
                min_call_stack_size,
                config,
                print_tree: tree,
                show_obj_full_name,
            };

            // Validate args first
            validate_args(&args)?;

            let summary = execute_replay(args)?;
            if summary.mismatched_ends > 0 || summary.unmatched_ends > 0 {
                log::warn!(
                    "Script had {} mismatched and {} unmatched exit events",
                    summary.mismatched_ends,
                    summary.unmatched_ends
                );
            }
        }

        Commands::Demo {
            threads,
            frames,
            min_call_stack_size,
            show_obj_full_name,
        } => {
            let args = DemoArgs {
                threads,
                frames,
                min_call_stack_size,
                render: RenderOptions::new().with_obj_full_name(show_obj_full_name),
            };
            execute_demo(args)?;
        }

        Commands::Validate { file, tree } => {
            validate_logs_file(file, tree)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
