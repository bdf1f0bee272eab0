//! Pipeline stage events.
//!
//! A stage event is one cycle's observation of one pipeline stage of the
//! simulated core. This module provides:
//! 1. **Typed Signals:** One signal struct per stage, carrying only that stage's fields.
//! 2. **Wire Decoding:** Lenient decoding of the simulator's JSON objects with boundary validation.
//! 3. **Readers:** JSON-array and newline-delimited log readers.

use std::fmt;

use serde::Deserialize;

use crate::common::constants::SENTINEL_PC;

/// JSON-array and newline-delimited event log readers.
pub mod reader;

/// Wire-level decoding of simulator log objects.
mod wire;

pub use reader::{EventLines, EventStream, InputFormat, open_events, read_events};

/// Pipeline stage that reported an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Stage {
    /// Instruction fetch.
    #[serde(rename = "FETCH", alias = "IF")]
    Fetch,
    /// Instruction decode, register read and the CSR unit.
    #[serde(rename = "DECODE", alias = "ID")]
    Decode,
    /// ALU execution.
    #[serde(rename = "EXECUTE", alias = "EX")]
    Execute,
    /// Data memory access.
    #[serde(rename = "MEM_ACCESS", alias = "MA", alias = "MEM")]
    MemAccess,
    /// Register writeback.
    #[serde(rename = "WRITEBACK", alias = "WB")]
    Writeback,
}

impl Stage {
    /// Canonical wire name of the stage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "FETCH",
            Self::Decode => "DECODE",
            Self::Execute => "EXECUTE",
            Self::MemAccess => "MEM_ACCESS",
            Self::Writeback => "WRITEBACK",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation of the CSR unit reported by the decode stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsrPhase {
    /// No CSR instruction in progress.
    #[default]
    Idle,
    /// A CSR instruction occupies the CSR unit; it will not use the ALU.
    Busy,
    /// The CSR instruction completes this cycle with the given transaction.
    Retire(CsrTransaction),
}

/// Register and CSR effects of a completed CSR instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CsrTransaction {
    /// CSR address (12 bits).
    pub addr: u16,
    /// Value read from the CSR.
    pub read_data: u32,
    /// Value written to the CSR.
    pub write_data: u32,
    /// Whether the read value is written to `writeback_reg`.
    pub writeback_enable: bool,
    /// Whether the CSR is written.
    pub write_enable: bool,
    /// Destination integer register of the read value.
    pub writeback_reg: u8,
}

/// Decode-stage signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DecodeSignals {
    /// Instruction word; present when the stage completes decode this cycle.
    pub ir: Option<u32>,
    /// `false` while the stage is stalled, `true` once it can advance.
    pub ready: Option<bool>,
    /// Jump target, present when `jump_valid` is asserted.
    pub jump_target: Option<u32>,
    /// CSR unit state.
    pub csr: CsrPhase,
}

/// Execute-stage signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ExecuteSignals {
    /// Instruction word; absent for a bubble.
    pub ir: Option<u32>,
    /// ALU output.
    pub alu_result: Option<u32>,
}

/// A store performed by the memory stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StoreAccess {
    /// Byte address written.
    pub addr: u32,
    /// Word presented on the data bus.
    pub data: u32,
    /// Byte-enable mask, one bit per byte lane.
    pub mask: u8,
}

/// Data memory access performed by the memory stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MemAccess {
    /// No data memory access.
    #[default]
    None,
    /// Load from the given byte address.
    Load {
        /// Byte address read.
        addr: u32,
    },
    /// Store to memory.
    Store(StoreAccess),
}

/// Memory-access-stage signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MemorySignals {
    /// Instruction word; absent for a bubble.
    pub ir: Option<u32>,
    /// Data memory access of this cycle.
    pub access: MemAccess,
}

/// Register write performed by the writeback stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WritebackResult {
    /// Destination register index.
    pub reg: u8,
    /// Value written.
    pub data: u32,
    /// Whether the register file write is enabled.
    pub valid: bool,
}

/// Writeback-stage signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WritebackSignals {
    /// Instruction word; absent for a bubble.
    pub ir: Option<u32>,
    /// Register write; present whenever the stage holds an instruction.
    pub result: Option<WritebackResult>,
}

/// Stage-specific payload of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageSignals {
    /// Fetch stage.
    Fetch {
        /// Fetched instruction word.
        ir: u32,
        /// `false` when the fetch unit flags the slot as not holding an instruction.
        valid: bool,
    },
    /// Decode stage.
    Decode(DecodeSignals),
    /// Execute stage.
    Execute(ExecuteSignals),
    /// Memory access stage.
    MemAccess(MemorySignals),
    /// Writeback stage.
    Writeback(WritebackSignals),
}

impl StageSignals {
    /// Stage these signals belong to.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Fetch { .. } => Stage::Fetch,
            Self::Decode(_) => Stage::Decode,
            Self::Execute(_) => Stage::Execute,
            Self::MemAccess(_) => Stage::MemAccess,
            Self::Writeback(_) => Stage::Writeback,
        }
    }
}

/// One observation of one pipeline stage at one simulated cycle.
///
/// Deserializes from a simulator log object; see [`reader`] for the accepted
/// encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "wire::WireEvent")]
pub struct StageEvent {
    /// Cycle stamp, if the log carries one.
    pub cycle: Option<u64>,
    /// Program counter; `None` for the explicit invalid marker.
    pub pc: Option<u32>,
    /// Whether the core was held in reset.
    pub reset: bool,
    /// Stage-specific payload.
    pub signals: StageSignals,
}

impl StageEvent {
    /// Creates an unstamped, non-reset event.
    pub const fn new(pc: u32, signals: StageSignals) -> Self {
        Self {
            cycle: None,
            pc: Some(pc),
            reset: false,
            signals,
        }
    }

    /// Creates a valid fetch event.
    pub const fn fetch(pc: u32, ir: u32) -> Self {
        Self::new(pc, StageSignals::Fetch { ir, valid: true })
    }

    /// Creates a decode event.
    pub const fn decode(pc: u32, signals: DecodeSignals) -> Self {
        Self::new(pc, StageSignals::Decode(signals))
    }

    /// Creates an execute event.
    pub const fn execute(pc: u32, signals: ExecuteSignals) -> Self {
        Self::new(pc, StageSignals::Execute(signals))
    }

    /// Creates a memory access event.
    pub const fn mem_access(pc: u32, signals: MemorySignals) -> Self {
        Self::new(pc, StageSignals::MemAccess(signals))
    }

    /// Creates a writeback event.
    pub const fn writeback(pc: u32, signals: WritebackSignals) -> Self {
        Self::new(pc, StageSignals::Writeback(signals))
    }

    /// Returns the event stamped with `cycle`.
    #[must_use]
    pub const fn at_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Returns the event marked as observed during reset.
    #[must_use]
    pub const fn in_reset(mut self) -> Self {
        self.reset = true;
        self
    }

    /// Stage that reported the event.
    pub const fn stage(&self) -> Stage {
        self.signals.stage()
    }

    /// Program counter of the slot, unless it is the sentinel or the invalid marker.
    pub fn valid_pc(&self) -> Option<u32> {
        self.pc.filter(|&pc| pc != SENTINEL_PC)
    }
}
