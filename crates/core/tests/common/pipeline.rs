//! Event scripts from an ideal 5-stage pipeline.
//!
//! [`PipelineModel`] issues one instruction per cycle and reports every stage
//! the way the simulator does: one event per stage per cycle, back of the
//! pipeline first. Instruction `n` is fetched at cycle `n`, decoded at `n + 1`,
//! executed at `n + 2`, passes memory at `n + 3` and writes back at `n + 4`.
//! CSR instructions hold the CSR unit from decode and retire from it at
//! `n + 4`, so retirement stays in program order; the back end never reports
//! them.

use rvtrace_core::event::{
    CsrPhase, CsrTransaction, DecodeSignals, ExecuteSignals, MemAccess, MemorySignals, StageEvent,
    StoreAccess, WritebackResult, WritebackSignals,
};

/// `addi x0, x0, 0`
pub const NOP: u32 = 0x0000_0013;

/// What an instruction does, as far as the stage logs can tell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// ALU instruction writing `value` to `rd`.
    Alu { rd: u8, value: u32 },
    /// Load of `value` from `addr` into `rd`.
    Load { rd: u8, addr: u32, value: u32 },
    /// Store to memory.
    Store(StoreAccess),
    /// Taken jump, linking into `rd`.
    Jump { rd: u8, target: u32, link: u32 },
    /// CSR instruction.
    Csr(CsrTransaction),
}

/// One instruction of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instr {
    pub pc: u32,
    pub ir: u32,
    pub op: Op,
}

impl Instr {
    pub const fn new(pc: u32, ir: u32, op: Op) -> Self {
        Self { pc, ir, op }
    }

    pub const fn nop(pc: u32) -> Self {
        Self::new(pc, NOP, Op::Alu { rd: 0, value: 0 })
    }
}

/// Reporting order within a cycle: writeback first, fetch last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Writeback,
    Memory,
    Execute,
    Decode,
    Fetch,
}

/// Builds the stage-event log of a program.
#[derive(Debug, Default)]
pub struct PipelineModel {
    events: Vec<(u64, Slot, StageEvent)>,
    next_cycle: u64,
}

impl PipelineModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log of `program` issued from cycle 0.
    pub fn run(program: &[Instr]) -> Vec<StageEvent> {
        let mut model = Self::new();
        for instr in program {
            model.issue(*instr);
        }
        model.finish()
    }

    fn emit(&mut self, cycle: u64, slot: Slot, event: StageEvent) {
        self.events.push((cycle, slot, event.at_cycle(cycle)));
    }

    /// Issues an instruction in the next cycle.
    pub fn issue(&mut self, instr: Instr) {
        let n = self.next_cycle;
        self.next_cycle += 1;
        let Instr { pc, ir, op } = instr;

        self.emit(n, Slot::Fetch, StageEvent::fetch(pc, ir));

        let mut decode = DecodeSignals {
            ir: Some(ir),
            ..DecodeSignals::default()
        };
        if let Op::Jump { target, .. } = op {
            decode.jump_target = Some(target);
        }
        if let Op::Csr(transaction) = op {
            decode.csr = CsrPhase::Busy;
            self.emit(n + 1, Slot::Decode, StageEvent::decode(pc, decode));
            self.emit(
                n + 4,
                Slot::Decode,
                StageEvent::decode(
                    pc,
                    DecodeSignals {
                        csr: CsrPhase::Retire(transaction),
                        ..DecodeSignals::default()
                    },
                ),
            );
            return;
        }
        self.emit(n + 1, Slot::Decode, StageEvent::decode(pc, decode));

        let alu_result = match op {
            Op::Alu { value, .. } => value,
            Op::Load { addr, .. } => addr,
            Op::Store(store) => store.addr,
            Op::Jump { link, .. } => link,
            Op::Csr(_) => 0,
        };
        self.emit(
            n + 2,
            Slot::Execute,
            StageEvent::execute(pc, ExecuteSignals { ir: Some(ir), alu_result: Some(alu_result) }),
        );

        let access = match op {
            Op::Load { addr, .. } => MemAccess::Load { addr },
            Op::Store(store) => MemAccess::Store(store),
            _ => MemAccess::None,
        };
        self.emit(n + 3, Slot::Memory, StageEvent::mem_access(pc, MemorySignals { ir: Some(ir), access }));

        let (reg, data) = match op {
            Op::Alu { rd, value } => (rd, value),
            Op::Load { rd, value, .. } => (rd, value),
            Op::Jump { rd, link, .. } => (rd, link),
            Op::Store(_) | Op::Csr(_) => (0, 0),
        };
        self.emit(
            n + 4,
            Slot::Writeback,
            StageEvent::writeback(
                pc,
                WritebackSignals {
                    ir: Some(ir),
                    result: Some(WritebackResult { reg, data, valid: true }),
                },
            ),
        );
    }

    /// Fetches an instruction that is squashed before decode.
    pub fn wrong_path_fetch(&mut self, pc: u32) {
        let n = self.next_cycle;
        self.next_cycle += 1;
        self.emit(n, Slot::Fetch, StageEvent::fetch(pc, NOP));
    }

    /// Events in log order.
    pub fn finish(mut self) -> Vec<StageEvent> {
        self.events.sort_by_key(|(cycle, slot, _)| (*cycle, *slot));
        self.events.into_iter().map(|(_, _, event)| event).collect()
    }
}
