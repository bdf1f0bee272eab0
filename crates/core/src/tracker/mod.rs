//! In-flight instruction tracker.
//!
//! The tracker folds a stream of stage events into retired instructions. It
//! provides:
//! 1. **Filtering:** Drops reset cycles, empty slots, invalid fetches and bubbles.
//! 2. **Matching:** Binds each stage event to the earliest in-flight instance of its pc still awaiting that stage.
//! 3. **CSR Short-circuit:** Retires CSR instructions from decode, bypassing the back end.
//! 4. **Flush:** Squashes wrong-path fetches overtaken at decode.
//!
//! The pipeline is in order, so for a well-formed log instructions retire in
//! fetch order.

use std::borrow::Borrow;

use tracing::{debug, info, trace};

use crate::common::error::TraceIntegrityError;
use crate::event::{
    CsrPhase, DecodeSignals, ExecuteSignals, MemAccess, MemorySignals, Stage, StageEvent, StageSignals,
    WritebackSignals,
};
use crate::stats::TraceStats;

/// Fetch-ordered queue of in-flight instructions.
pub mod inflight;

/// Retired instruction records.
pub mod retired;

pub use crate::config::TrackerConfig;
pub use inflight::{InFlightInstruction, InFlightQueue, InstTag, Milestone, StallRecord};
pub use retired::{RetirePath, RetiredInstruction, Timing};

/// Final state of a tracker after the log is exhausted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerSummary {
    /// Run statistics.
    pub stats: TraceStats,
    /// Instructions fetched but never retired, in fetch order.
    pub in_flight: Vec<InFlightInstruction>,
}

/// Event-correlation state machine.
///
/// Feed events in log order with [`step`](Self::step); at most one
/// instruction retires per event.
#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,
    queue: InFlightQueue,
    stats: TraceStats,
    /// Position of the next event in the stream; the cycle of unstamped events.
    position: u64,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    /// Creates a tracker with nothing in flight.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            queue: InFlightQueue::new(),
            stats: TraceStats::default(),
            position: 0,
        }
    }

    /// Statistics accumulated so far.
    pub const fn stats(&self) -> &TraceStats {
        &self.stats
    }

    /// Mutable statistics, for counters maintained by the caller.
    pub fn stats_mut(&mut self) -> &mut TraceStats {
        &mut self.stats
    }

    /// Instructions currently in flight.
    pub const fn in_flight(&self) -> &InFlightQueue {
        &self.queue
    }

    /// Consumes the tracker, returning its statistics and unretired instructions.
    pub fn finish(self) -> TrackerSummary {
        TrackerSummary {
            stats: self.stats,
            in_flight: self.queue.iter().cloned().collect(),
        }
    }

    /// Applies one stage event.
    ///
    /// # Returns
    ///
    /// The instruction retired by this event, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TraceIntegrityError`] when a decode, execute, memory or
    /// writeback event matches no in-flight instruction awaiting that stage.
    /// The tracker state is left as it was before the failing update.
    pub fn step(&mut self, event: &StageEvent) -> Result<Option<RetiredInstruction>, TraceIntegrityError> {
        let cycle = event.cycle.unwrap_or(self.position);
        self.position += 1;
        self.stats.events += 1;
        self.stats.last_cycle = cycle;

        let stage = event.stage();
        if event.reset {
            trace!(%stage, cycle, "skipped: reset");
            self.stats.skipped_reset += 1;
            return Ok(None);
        }
        let Some(pc) = event.valid_pc() else {
            trace!(%stage, cycle, "skipped: empty slot");
            self.stats.skipped_invalid_pc += 1;
            return Ok(None);
        };

        match &event.signals {
            StageSignals::Fetch { ir, valid } => {
                if *valid {
                    self.fetch(pc, *ir, cycle);
                } else {
                    trace!(pc, cycle, "skipped: invalid fetch");
                    self.stats.skipped_invalid_fetch += 1;
                }
                Ok(None)
            }
            _ if self.queue.is_empty() => {
                trace!(%stage, pc, cycle, "skipped: nothing in flight");
                self.stats.skipped_empty += 1;
                Ok(None)
            }
            StageSignals::Decode(signals) => self.decode(pc, cycle, signals),
            StageSignals::Execute(signals) => {
                self.execute(pc, cycle, signals)?;
                Ok(None)
            }
            StageSignals::MemAccess(signals) => {
                self.mem_access(pc, cycle, signals)?;
                Ok(None)
            }
            StageSignals::Writeback(signals) => self.writeback(pc, cycle, signals),
        }
    }

    fn bubble(&mut self, stage: Stage, pc: u32, cycle: u64) {
        trace!(%stage, pc, cycle, "bubble");
        self.stats.bubbles += 1;
    }

    /// Finds the instance an event updates.
    fn matching(
        &self,
        stage: Stage,
        pc: u32,
        cycle: u64,
        awaiting: Milestone,
    ) -> Result<InstTag, TraceIntegrityError> {
        self.queue
            .find_earliest(pc, awaiting)
            .ok_or(TraceIntegrityError {
                stage,
                pc,
                cycle,
                awaiting,
            })
    }

    /// Applies `update` to the instance matched for `awaiting`.
    fn update(
        &mut self,
        stage: Stage,
        pc: u32,
        cycle: u64,
        awaiting: Milestone,
        update: impl FnOnce(&mut InFlightInstruction),
    ) -> Result<InstTag, TraceIntegrityError> {
        let tag = self.matching(stage, pc, cycle, awaiting)?;
        if let Some(inst) = self.queue.get_mut(tag) {
            update(inst);
        }
        Ok(tag)
    }

    fn fetch(&mut self, pc: u32, ir: u32, cycle: u64) {
        if self.stats.first_fetch_cycle.is_none() {
            info!(pc, cycle, "pipeline started");
            self.stats.first_fetch_cycle = Some(cycle);
        }
        let tag = self.queue.push(pc, ir, cycle);
        self.stats.fetched += 1;
        debug!(%tag, pc, ir, cycle, "fetched");
    }

    fn decode(
        &mut self,
        pc: u32,
        cycle: u64,
        signals: &DecodeSignals,
    ) -> Result<Option<RetiredInstruction>, TraceIntegrityError> {
        const STAGE: Stage = Stage::Decode;

        if *signals == DecodeSignals::default() {
            self.bubble(STAGE, pc, cycle);
            return Ok(None);
        }

        // Check every match up front so a failing event leaves no partial update.
        let keyed = signals.jump_target.is_some() || signals.ready.is_some() || signals.ir.is_some();
        if keyed {
            let _ = self.matching(STAGE, pc, cycle, Milestone::Decoded)?;
        }
        match signals.csr {
            CsrPhase::Idle => {}
            CsrPhase::Busy => {
                let _ = self.matching(STAGE, pc, cycle, Milestone::Executed)?;
            }
            CsrPhase::Retire(_) => {
                let _ = self.matching(STAGE, pc, cycle, Milestone::Retired)?;
            }
        }

        if let Some(target) = signals.jump_target {
            let tag = self.update(STAGE, pc, cycle, Milestone::Decoded, |inst| {
                inst.jump_target = Some(target);
            })?;
            debug!(%tag, pc, target, "jump resolved");
        }

        match signals.ready {
            Some(false) => {
                let _ = self.update(STAGE, pc, cycle, Milestone::Decoded, |inst| {
                    inst.stall.cycles += 1;
                    let _ = inst.stall.start.get_or_insert(cycle);
                })?;
                self.stats.stall_cycles += 1;
            }
            Some(true) => {
                let _ = self.update(STAGE, pc, cycle, Milestone::Decoded, |inst| {
                    if inst.stall.start.is_some() && inst.stall.end.is_none() {
                        inst.stall.end = Some(cycle);
                    }
                })?;
            }
            None => {}
        }

        if signals.ir.is_some() {
            let tag = self.update(STAGE, pc, cycle, Milestone::Decoded, |inst| inst.decoded = true)?;
            debug!(%tag, pc, cycle, "decoded");
            if self.config.flush_stale {
                for stale in self.queue.flush_undecoded_before(tag) {
                    debug!(tag = %stale.tag, pc = stale.pc, cycle, "flushed");
                    self.stats.flushed += 1;
                }
            }
        }

        match signals.csr {
            CsrPhase::Idle => Ok(None),
            CsrPhase::Busy => {
                // The CSR unit stands in for both the ALU and the memory stage.
                let tag = self.update(STAGE, pc, cycle, Milestone::Executed, |inst| {
                    inst.executed = true;
                    inst.memory = true;
                    inst.csr_busy = true;
                })?;
                debug!(%tag, pc, cycle, "CSR unit busy");
                Ok(None)
            }
            CsrPhase::Retire(transaction) => {
                let tag = self.matching(STAGE, pc, cycle, Milestone::Retired)?;
                let Some(mut inst) = self.queue.take(tag) else {
                    return Ok(None);
                };
                inst.csr = Some(transaction);
                Ok(Some(self.retire(inst, RetirePath::Csr, cycle)))
            }
        }
    }

    fn execute(&mut self, pc: u32, cycle: u64, signals: &ExecuteSignals) -> Result<(), TraceIntegrityError> {
        const STAGE: Stage = Stage::Execute;

        if signals.ir.is_none() && signals.alu_result.is_none() {
            self.bubble(STAGE, pc, cycle);
            return Ok(());
        }

        if self.queue.find_earliest(pc, Milestone::Executed).is_none() && self.queue.in_csr_execution(pc) {
            trace!(pc, cycle, "skipped: instruction held by the CSR unit");
            self.stats.skipped_csr_busy += 1;
            return Ok(());
        }

        // Only the report carrying `ir` completes the stage.
        let ExecuteSignals { ir, alu_result } = *signals;
        let tag = self.update(STAGE, pc, cycle, Milestone::Executed, |inst| {
            if alu_result.is_some() {
                inst.alu_result = alu_result;
            }
            inst.executed = ir.is_some();
        })?;
        debug!(%tag, pc, cycle, "executed");
        Ok(())
    }

    fn mem_access(&mut self, pc: u32, cycle: u64, signals: &MemorySignals) -> Result<(), TraceIntegrityError> {
        const STAGE: Stage = Stage::MemAccess;

        if signals.ir.is_none() && signals.access == MemAccess::None {
            self.bubble(STAGE, pc, cycle);
            return Ok(());
        }

        let MemorySignals { ir, access } = *signals;
        let tag = self.update(STAGE, pc, cycle, Milestone::MemoryAccessed, |inst| {
            match access {
                MemAccess::None => {}
                MemAccess::Load { addr } => inst.load_addr = Some(addr),
                MemAccess::Store(store) => inst.store = Some(store),
            }
            inst.memory = ir.is_some();
        })?;
        debug!(%tag, pc, cycle, ?access, "memory stage");
        Ok(())
    }

    fn writeback(
        &mut self,
        pc: u32,
        cycle: u64,
        signals: &WritebackSignals,
    ) -> Result<Option<RetiredInstruction>, TraceIntegrityError> {
        const STAGE: Stage = Stage::Writeback;

        let Some(result) = signals.result else {
            self.bubble(STAGE, pc, cycle);
            return Ok(None);
        };

        let tag = self.matching(STAGE, pc, cycle, Milestone::Retired)?;
        let Some(mut inst) = self.queue.take(tag) else {
            return Ok(None);
        };
        inst.writeback = Some(result);
        Ok(Some(self.retire(inst, RetirePath::Writeback, cycle)))
    }

    fn retire(&mut self, inst: InFlightInstruction, path: RetirePath, cycle: u64) -> RetiredInstruction {
        let retired = RetiredInstruction::retire(inst, path, cycle);
        self.stats.record_retirement(&retired);
        debug!(tag = %retired.tag, pc = retired.pc, cycle, ?path, "retired");
        retired
    }
}

/// Folds a complete event log with the default configuration.
///
/// # Errors
///
/// Returns the first [`TraceIntegrityError`] raised by [`Tracker::step`].
///
/// # Examples
///
/// ```
/// use rvtrace_core::event::{StageEvent, WritebackResult, WritebackSignals};
/// use rvtrace_core::tracker::process;
///
/// let nop = 0x0000_0013;
/// let events = [
///     StageEvent::fetch(0x0, nop),
///     StageEvent::writeback(
///         0x0,
///         WritebackSignals {
///             ir: Some(nop),
///             result: Some(WritebackResult { reg: 0, data: 0, valid: true }),
///         },
///     ),
/// ];
///
/// let retired = process(&events).unwrap();
/// assert_eq!(retired.len(), 1);
/// assert_eq!(retired[0].pc, 0x0);
/// ```
pub fn process<I>(events: I) -> Result<Vec<RetiredInstruction>, TraceIntegrityError>
where
    I: IntoIterator,
    I::Item: Borrow<StageEvent>,
{
    let mut tracker = Tracker::default();
    let mut retired = Vec::new();
    for event in events {
        if let Some(inst) = tracker.step(event.borrow())? {
            retired.push(inst);
        }
    }
    Ok(retired)
}
