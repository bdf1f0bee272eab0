//! Error and warning definitions.
//!
//! This module defines every failure the trace engine can report. It provides:
//! 1. **Integrity Errors:** A stage event that no in-flight instruction can absorb.
//! 2. **Boundary Errors:** Events with missing or out-of-range fields, rejected before tracking.
//! 3. **Symbol Warnings:** Registers or CSRs without a name; rendering falls back to raw numbers.
//! 4. **Driver Errors:** Parse, configuration and I/O failures wrapped in one `TraceError`.

use std::io;

use thiserror::Error;

use crate::event::Stage;
use crate::tracker::Milestone;

/// A stage event could not be matched to any in-flight instruction.
///
/// The tracker assumes a strictly in-order pipeline: every DECODE, EXECUTE,
/// MEM_ACCESS and WRITEBACK observation belongs to an instruction that was
/// fetched earlier and has not yet passed that stage. When no such instruction
/// exists the event stream contradicts the pipeline model, and processing of
/// the stream stops.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(
    "{stage} event for pc {pc:#010x} at cycle {cycle} matches no in-flight instruction awaiting {awaiting}"
)]
pub struct TraceIntegrityError {
    /// Stage that reported the event.
    pub stage: Stage,
    /// Program counter carried by the event.
    pub pc: u32,
    /// Cycle stamp of the event, or its position in the stream when unstamped.
    pub cycle: u64,
    /// Milestone the event would have recorded.
    pub awaiting: Milestone,
}

/// A register index or CSR address has no symbolic name.
///
/// Never fatal: the formatter logs it and renders the raw number instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum UnknownSymbolWarning {
    /// Register index outside `x0..=x31`.
    #[error("no ABI name for register index {0}")]
    Register(u8),
    /// CSR address missing from the CSR name table.
    #[error("no name for CSR address {0:#05x}")]
    Csr(u16),
}

/// A wire event failed boundary validation.
///
/// Raised while converting a decoded JSON object into a [`StageEvent`](crate::event::StageEvent),
/// so a malformed event never reaches the tracker.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EventError {
    /// A field required by the event's other fields is absent.
    #[error("{stage} event is missing required field `{field}`")]
    MissingField {
        /// Stage of the offending event.
        stage: Stage,
        /// Canonical wire name of the missing field.
        field: &'static str,
    },
    /// A value is neither a number nor one of the field's symbolic names.
    #[error("field `{field}` has unrecognised value {text:?}")]
    Malformed {
        /// Canonical wire name of the field.
        field: &'static str,
        /// Value found in the log.
        text: String,
    },
    /// A value does not fit in the field's width.
    #[error("field `{field}` value {value:#x} does not fit in {bits} bits")]
    OutOfRange {
        /// Canonical wire name of the field.
        field: &'static str,
        /// Value found in the log.
        value: u64,
        /// Width of the field in bits.
        bits: u32,
    },
}

/// Any failure while turning an event log into a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The event stream violates the in-order pipeline model.
    #[error(transparent)]
    Integrity(#[from] TraceIntegrityError),

    /// A line of a newline-delimited log is not a valid event.
    #[error("malformed event on line {line}: {source}")]
    Parse {
        /// 1-based line number in the log.
        line: usize,
        /// Underlying decoder error (includes boundary validation failures).
        #[source]
        source: serde_json::Error,
    },

    /// A JSON-array log is not a valid array of events.
    #[error("malformed event log: {0}")]
    Log(#[source] serde_json::Error),

    /// The configuration file could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// Reading the log or configuration failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
