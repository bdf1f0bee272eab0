//! In-flight instruction queue.
//!
//! The queue holds every fetched instruction that has not yet retired, in
//! fetch order. It provides:
//! 1. **Allocation:** Assigns a monotonically increasing tag to each fetched instruction.
//! 2. **Matching:** Finds the earliest instance of a pc that has not reached a milestone.
//! 3. **Retirement:** Removes an instance by tag, from any position in the queue.
//! 4. **Flush:** Squashes wrong-path instances that were overtaken at decode.

use std::collections::VecDeque;
use std::fmt;

use crate::event::{CsrTransaction, StoreAccess, WritebackResult};

/// Issue tag of an in-flight instruction.
///
/// Tags are assigned in fetch order and never reused, so comparing two tags
/// compares program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct InstTag(pub u64);

impl fmt::Display for InstTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pipeline milestone a stage event records on an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Milestone {
    /// Decode completed (also keys jump and stall updates).
    Decoded,
    /// Execution completed, by the ALU or by the CSR unit.
    Executed,
    /// Memory stage passed.
    MemoryAccessed,
    /// Instruction left the pipeline.
    Retired,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decoded => "decode",
            Self::Executed => "execute",
            Self::MemoryAccessed => "memory access",
            Self::Retired => "retirement",
        })
    }
}

/// Decode stall observed for one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StallRecord {
    /// Cycle of the first `ready = false` observation.
    pub start: Option<u64>,
    /// Cycle of the first `ready = true` observation after the stall began.
    pub end: Option<u64>,
    /// Number of `ready = false` observations.
    pub cycles: u64,
}

/// An instruction between fetch and retirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InFlightInstruction {
    /// Issue tag.
    pub tag: InstTag,
    /// Program counter.
    pub pc: u32,
    /// Fetched instruction word.
    pub ir: u32,
    /// Cycle of the fetch.
    pub issue_cycle: u64,
    /// Jump target resolved at decode.
    pub jump_target: Option<u32>,
    /// ALU output.
    pub alu_result: Option<u32>,
    /// Load address.
    pub load_addr: Option<u32>,
    /// Store performed.
    pub store: Option<StoreAccess>,
    /// Register write performed.
    pub writeback: Option<WritebackResult>,
    /// CSR transaction.
    pub csr: Option<CsrTransaction>,
    /// Decode stall.
    pub stall: StallRecord,
    /// Decode completed.
    pub decoded: bool,
    /// Execution completed.
    pub executed: bool,
    /// Memory stage passed.
    pub memory: bool,
    /// Held by the CSR unit instead of the ALU.
    pub csr_busy: bool,
}

impl InFlightInstruction {
    fn new(tag: InstTag, pc: u32, ir: u32, issue_cycle: u64) -> Self {
        Self {
            tag,
            pc,
            ir,
            issue_cycle,
            jump_target: None,
            alu_result: None,
            load_addr: None,
            store: None,
            writeback: None,
            csr: None,
            stall: StallRecord::default(),
            decoded: false,
            executed: false,
            memory: false,
            csr_busy: false,
        }
    }

    /// Returns true if the instruction has reached `milestone`.
    ///
    /// No queued instruction has retired, so every instance still awaits
    /// [`Milestone::Retired`].
    pub const fn reached(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::Decoded => self.decoded,
            Milestone::Executed => self.executed,
            Milestone::MemoryAccessed => self.memory,
            Milestone::Retired => false,
        }
    }
}

/// Fetch-ordered queue of in-flight instructions.
#[derive(Debug)]
pub struct InFlightQueue {
    /// Entries in increasing tag order.
    entries: VecDeque<InFlightInstruction>,
    /// Tag of the next fetched instruction.
    next_tag: u64,
}

impl Default for InFlightQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InFlightQueue {
    /// Creates an empty queue. The first instruction receives tag `#1`.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            next_tag: 1,
        }
    }

    /// Returns the number of in-flight instructions.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no instruction is in flight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the in-flight instructions in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = &InFlightInstruction> {
        self.entries.iter()
    }

    /// Appends a newly fetched instruction and returns its tag.
    pub fn push(&mut self, pc: u32, ir: u32, issue_cycle: u64) -> InstTag {
        let tag = InstTag(self.next_tag);
        self.next_tag += 1;
        self.entries.push_back(InFlightInstruction::new(tag, pc, ir, issue_cycle));
        tag
    }

    /// Finds the earliest instance of `pc` that has not reached `milestone`.
    pub fn find_earliest(&self, pc: u32, milestone: Milestone) -> Option<InstTag> {
        self.entries
            .iter()
            .find(|inst| inst.pc == pc && !inst.reached(milestone))
            .map(|inst| inst.tag)
    }

    /// Returns true if an instance of `pc` is held by the CSR unit.
    pub fn in_csr_execution(&self, pc: u32) -> bool {
        self.entries.iter().any(|inst| inst.pc == pc && inst.csr_busy)
    }

    fn position(&self, tag: InstTag) -> Option<usize> {
        self.entries.binary_search_by_key(&tag, |inst| inst.tag).ok()
    }

    /// Returns the instruction with `tag`, if it is still in flight.
    pub fn get(&self, tag: InstTag) -> Option<&InFlightInstruction> {
        self.position(tag).map(|i| &self.entries[i])
    }

    /// Returns the instruction with `tag` mutably, if it is still in flight.
    pub fn get_mut(&mut self, tag: InstTag) -> Option<&mut InFlightInstruction> {
        let i = self.position(tag)?;
        self.entries.get_mut(i)
    }

    /// Removes and returns the instruction with `tag`.
    pub fn take(&mut self, tag: InstTag) -> Option<InFlightInstruction> {
        let i = self.position(tag)?;
        self.entries.remove(i)
    }

    /// Removes every instruction fetched before `tag` that has not decoded.
    ///
    /// Decode is in order, so once `tag` decodes such instructions can never
    /// decode: they were fetched down a path the pipeline abandoned.
    pub fn flush_undecoded_before(&mut self, tag: InstTag) -> Vec<InFlightInstruction> {
        let mut flushed = Vec::new();
        let mut i = 0;
        while i < self.entries.len() && self.entries[i].tag < tag {
            if self.entries[i].decoded {
                i += 1;
            } else if let Some(inst) = self.entries.remove(i) {
                flushed.push(inst);
            }
        }
        flushed
    }
}
