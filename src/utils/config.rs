//! Configuration and constants for the recorder.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current logs document schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Synthetic attribute holding the number of merged repeats of a call
pub const CHILD_COUNT_ATTR: &str = "childCount";

/// Attribute the chain logging hooks attach to every call
pub const OBJ_FULL_NAME_ATTR: &str = "objFullName";

/// Roots shallower than this are discarded unless configured otherwise
pub const DEFAULT_MIN_CALL_STACK_SIZE: u16 = 3;

/// Hook target matching every invocation
pub const WILDCARD_TARGET: &str = "*";

/// Kind prefix carried by fully-qualified function names
pub const FUNCTION_PREFIX: &str = "Function ";

/// Recorder settings, usually loaded from a TOML file
///
/// Every field is optional in the file:
///
/// ```toml
/// enabled = true
/// min_call_stack_size = 4
/// show_obj_full_name = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Start recording immediately
    pub enabled: bool,

    /// Minimum tree height a completed root needs to be retained
    pub min_call_stack_size: u16,

    /// Render the object each call was made on
    pub show_obj_full_name: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_call_stack_size: DEFAULT_MIN_CALL_STACK_SIZE,
            show_obj_full_name: false,
        }
    }
}

/// Load recorder configuration from a TOML file
///
/// **Public** - used by the replay command
///
/// # Errors
/// * `ConfigError::Io` - file cannot be read
/// * `ConfigError::Toml` - file is not valid TOML for this schema
/// * `ConfigError::InvalidValue` - a value is outside its accepted range
pub fn load_config(path: impl AsRef<Path>) -> Result<RecorderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse recorder configuration from TOML text
pub fn parse_config(contents: &str) -> Result<RecorderConfig, ConfigError> {
    let config: RecorderConfig = toml::from_str(contents)?;

    if config.min_call_stack_size == 0 {
        return Err(ConfigError::InvalidValue(
            "min_call_stack_size must be greater than 0".to_string(),
        ));
    }

    Ok(config)
}
