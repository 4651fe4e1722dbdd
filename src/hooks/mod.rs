//! Interception surface feeding the recorder.
//!
//! This module handles:
//! - Registering pre/post hooks against named or wildcard targets
//! - Dispatching intercepted invocations to those hooks
//! - Installing chain logging, which turns invocations into call trees

pub mod chain_logging;
pub mod registry;

// Re-export main types
pub use chain_logging::{function_name, install};
pub use registry::{ExecutionFlag, HookFn, HookRegistry, HookType, Invocation};
