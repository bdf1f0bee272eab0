//! RISC-V pipeline trace reconstruction library.
//!
//! This crate turns the per-stage event log of a 5-stage in-order RISC-V core
//! into one human-readable line per retired instruction. It provides:
//! 1. **Events:** The stage-event wire schema, lenient value decoding, and JSON / NDJSON readers.
//! 2. **Tracker:** The in-flight instruction state machine (matching, stalls, flushes, CSR retire).
//! 3. **Formatter:** The fixed decision table that renders a retired instruction as a trace line.
//! 4. **ISA:** Register ABI names and CSR names used for rendering.
//! 5. **Support:** Configuration, statistics, and error types.

/// Common types and constants (errors, sentinel values).
pub mod common;
/// Trace configuration (tracker, formatter, and input settings).
pub mod config;
/// Stage events: wire schema, typed signals, readers.
pub mod event;
/// Trace line formatter.
pub mod format;
/// Instruction set symbols (register ABI names, CSR names).
pub mod isa;
/// Trace statistics collection and reporting.
pub mod stats;
/// In-flight instruction tracker.
pub mod tracker;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error types surfaced to callers.
pub use crate::common::error::{EventError, TraceError, TraceIntegrityError, UnknownSymbolWarning};
/// A single observation of one pipeline stage.
pub use crate::event::{Stage, StageEvent};
/// Formatter for retired instructions.
pub use crate::format::{TraceFormatter, format_line};
/// Tracker entry points and the retired record.
pub use crate::tracker::{RetiredInstruction, Tracker, process};
