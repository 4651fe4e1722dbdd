//! Chain Trace
//!
//! Live call-chain recording: nested call trees built from enter/exit
//! notifications, with identical adjacent repeats aggregated and shallow
//! trees filtered out.
//!
//! ## Getting Started
//!
//! ```ignore
//! use chain_trace::recorder::attributes;
//! use chain_trace::store::TraceStore;
//!
//! let store = TraceStore::new();
//! store.enable();
//! store.start("Game.Tick", attributes([("objFullName", "World Level")]));
//! store.end("Game.Tick");
//! let logs = store.get_logs();
//! ```
//!
//! The `chain-trace` binary replays recorded event scripts through the same
//! store; see `chain-trace --help`.

pub mod commands;
pub mod hooks;
pub mod output;
pub mod parser;
pub mod recorder;
pub mod store;
pub mod utils;
