//! Retired instruction records.

use super::inflight::{InFlightInstruction, InstTag, StallRecord};
use crate::event::{CsrTransaction, StoreAccess, WritebackResult};

/// How an instruction left the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetirePath {
    /// Through the writeback stage.
    Writeback,
    /// Through the CSR unit at decode, bypassing execute, memory and writeback.
    Csr,
}

/// Cycle accounting of a retired instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Timing {
    /// Cycle of the fetch.
    pub issue_cycle: u64,
    /// Cycle of the retiring event.
    pub retire_cycle: u64,
    /// Decode stall.
    pub stall: StallRecord,
}

impl Timing {
    /// Cycles between fetch and retirement.
    pub const fn latency(&self) -> u64 {
        self.retire_cycle.saturating_sub(self.issue_cycle)
    }
}

/// Everything the pipeline reported about one instruction, frozen at retirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetiredInstruction {
    /// Issue tag.
    pub tag: InstTag,
    /// Program counter.
    pub pc: u32,
    /// Instruction word.
    pub ir: u32,
    /// Taken jump target.
    pub jump_target: Option<u32>,
    /// ALU output.
    pub alu_result: Option<u32>,
    /// Load address.
    pub load_addr: Option<u32>,
    /// Store performed.
    pub store: Option<StoreAccess>,
    /// Register write.
    pub writeback: Option<WritebackResult>,
    /// CSR transaction.
    pub csr: Option<CsrTransaction>,
    /// Retirement path.
    pub path: RetirePath,
    /// Cycle accounting.
    pub timing: Timing,
}

impl RetiredInstruction {
    /// Freezes an in-flight instruction retiring at `retire_cycle`.
    pub fn retire(inst: InFlightInstruction, path: RetirePath, retire_cycle: u64) -> Self {
        Self {
            tag: inst.tag,
            pc: inst.pc,
            ir: inst.ir,
            jump_target: inst.jump_target,
            alu_result: inst.alu_result,
            load_addr: inst.load_addr,
            store: inst.store,
            writeback: inst.writeback,
            csr: inst.csr,
            path,
            timing: Timing {
                issue_cycle: inst.issue_cycle,
                retire_cycle,
                stall: inst.stall,
            },
        }
    }

    /// Creates a record with no effects, as retired by a bare writeback.
    ///
    /// Mostly useful for building records field by field.
    pub const fn bare(tag: InstTag, pc: u32, ir: u32) -> Self {
        Self {
            tag,
            pc,
            ir,
            jump_target: None,
            alu_result: None,
            load_addr: None,
            store: None,
            writeback: None,
            csr: None,
            path: RetirePath::Writeback,
            timing: Timing {
                issue_cycle: 0,
                retire_cycle: 0,
                stall: StallRecord {
                    start: None,
                    end: None,
                    cycles: 0,
                },
            },
        }
    }
}
