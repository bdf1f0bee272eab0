//! Configuration system for the trace engine.
//!
//! This module defines the settings that parameterize a trace run. It provides:
//! 1. **Defaults:** Baseline settings matching the simulator's trace layout.
//! 2. **Structures:** Hierarchical config for the tracker, the formatter and the input reader.
//! 3. **Loading:** JSON decoding from a string or a file.
//!
//! Every field is optional in JSON; use `Config::default()` when no file is given.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::TraceError;
use crate::event::InputFormat;

/// Default configuration constants for the trace engine.
mod defaults {
    use crate::common::constants::PC_COLUMN_WIDTH;

    /// Squash wrong-path fetches once a younger instruction decodes.
    pub const FLUSH_STALE: bool = true;

    /// Column width of the program counter field.
    pub const PC_WIDTH: usize = PC_COLUMN_WIDTH;
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use rvtrace_core::config::Config;
/// use rvtrace_core::event::InputFormat;
///
/// let json = r#"{
///     "tracker": { "flush_stale": false },
///     "format":  { "pc_width": 10, "show_timing": true },
///     "input":   { "format": "Lines" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(!config.tracker.flush_stale);
/// assert_eq!(config.format.pc_width, 10);
/// assert!(config.format.show_timing);
/// assert_eq!(config.input.format, InputFormat::Lines);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// In-flight tracker settings
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Trace line formatter settings
    #[serde(default)]
    pub format: FormatConfig,
    /// Event log reader settings
    #[serde(default)]
    pub input: InputConfig,
}

impl Config {
    /// Decodes a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Config`] if the text is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        serde_json::from_str(json).map_err(TraceError::Config)
    }

    /// Reads and decodes a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the file cannot be read and
    /// [`TraceError::Config`] if its contents are not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// In-flight tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TrackerConfig {
    /// Remove older undecoded instructions when an instruction decodes.
    ///
    /// When false, wrong-path fetches stay in flight until the end of the log.
    #[serde(default = "TrackerConfig::default_flush_stale")]
    pub flush_stale: bool,
}

impl TrackerConfig {
    /// Returns the default flush policy.
    fn default_flush_stale() -> bool {
        defaults::FLUSH_STALE
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            flush_stale: defaults::FLUSH_STALE,
        }
    }
}

/// Trace line formatter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FormatConfig {
    /// Column width the program counter is right-aligned in
    #[serde(default = "FormatConfig::default_pc_width")]
    pub pc_width: usize,

    /// Append issue cycle, latency and stall cycles to every line
    #[serde(default)]
    pub show_timing: bool,
}

impl FormatConfig {
    /// Returns the default program counter column width.
    fn default_pc_width() -> usize {
        defaults::PC_WIDTH
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            pc_width: defaults::PC_WIDTH,
            show_timing: false,
        }
    }
}

/// Event log reader settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct InputConfig {
    /// Log layout
    #[serde(default)]
    pub format: InputFormat,
}
