//! Common types and constants shared by the trace engine.
//!
//! This module provides:
//! 1. **Constants:** Sentinel values and field widths of the simulator log.
//! 2. **Error Handling:** Integrity, boundary, and driver-level error types.

/// Common constants used throughout the trace engine.
pub mod constants;

/// Error types and warnings.
pub mod error;

pub use constants::SENTINEL_PC;
pub use error::{EventError, TraceError, TraceIntegrityError, UnknownSymbolWarning};
