//! # Unit Components
//!
//! Tests grouped by engine component: event decoding and readers, the
//! in-flight tracker, the trace formatter, configuration and statistics.

/// Configuration loading and defaults.
pub mod config;


/// Trace line rendering.
pub mod format;

/// Statistics accounting and reporting.
pub mod stats;

/// In-flight tracker scenarios and properties.
pub mod tracker;
