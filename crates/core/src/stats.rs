//! Trace statistics collection and reporting.
//!
//! This module tracks what the tracker observed while folding an event log. It provides:
//! 1. **Event accounting:** Events seen, skipped (by reason) and pipeline bubbles.
//! 2. **Instruction lifecycle:** Fetched, retired (by path), flushed and still in flight.
//! 3. **Instruction mix:** Jumps, loads, stores and CSR accesses among retired instructions.
//! 4. **Timing:** Stall cycles, first fetch and last observed cycle, mean latency.

use std::fmt;

use crate::tracker::{RetirePath, RetiredInstruction};

/// Statistics of one trace run.
///
/// Invariant once the log is exhausted:
/// `fetched == retired() + flushed + instructions still in flight`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Events handed to the tracker.
    pub events: u64,
    /// Events observed while the core was in reset.
    pub skipped_reset: u64,
    /// Events whose pc was the sentinel or the invalid marker.
    pub skipped_invalid_pc: u64,
    /// Fetches flagged as not holding an instruction.
    pub skipped_invalid_fetch: u64,
    /// Non-fetch events observed while nothing was in flight.
    pub skipped_empty: u64,
    /// Execute events for an instruction held by the CSR unit.
    pub skipped_csr_busy: u64,
    /// Non-fetch events carrying none of their stage's payload.
    pub bubbles: u64,

    /// Instructions fetched.
    pub fetched: u64,
    /// Instructions retired through the writeback stage.
    pub retired_writeback: u64,
    /// Instructions retired through the CSR unit.
    pub retired_csr: u64,
    /// Wrong-path instructions squashed before decode.
    pub flushed: u64,

    /// Retired instructions that took a jump.
    pub jumps: u64,
    /// Retired loads.
    pub loads: u64,
    /// Retired stores.
    pub stores: u64,
    /// Retired CSR instructions.
    pub csr_accesses: u64,
    /// Trace lines whose fields formed no legal combination.
    pub anomalies: u64,

    /// Decode stall observations.
    pub stall_cycles: u64,
    /// Cycle of the first accepted fetch.
    pub first_fetch_cycle: Option<u64>,
    /// Cycle of the last event.
    pub last_cycle: u64,
    /// Sum of fetch-to-retire latencies of retired instructions.
    pub latency_total: u64,
}

/// Section names for selective report output.
///
/// Valid section identifiers: `"summary"`, `"events"`, `"lifecycle"`, `"instruction_mix"`.
/// Pass an empty slice to [`TraceStats::report`] to render all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "events", "lifecycle", "instruction_mix"];

const RULE: &str = "==========================================================";
const SEPARATOR: &str = "----------------------------------------------------------";

impl TraceStats {
    /// Total retired instructions.
    pub const fn retired(&self) -> u64 {
        self.retired_writeback + self.retired_csr
    }

    /// Total skipped events.
    pub const fn skipped(&self) -> u64 {
        self.skipped_reset
            + self.skipped_invalid_pc
            + self.skipped_invalid_fetch
            + self.skipped_empty
            + self.skipped_csr_busy
    }

    /// Mean fetch-to-retire latency in cycles, or 0 when nothing retired.
    pub fn mean_latency(&self) -> f64 {
        match self.retired() {
            0 => 0.0,
            n => self.latency_total as f64 / n as f64,
        }
    }

    /// Accounts for one retired instruction.
    pub fn record_retirement(&mut self, inst: &RetiredInstruction) {
        match inst.path {
            RetirePath::Writeback => self.retired_writeback += 1,
            RetirePath::Csr => self.retired_csr += 1,
        }
        if inst.jump_target.is_some() {
            self.jumps += 1;
        }
        if inst.load_addr.is_some() {
            self.loads += 1;
        }
        if inst.store.is_some() {
            self.stores += 1;
        }
        if inst.csr.is_some() {
            self.csr_accesses += 1;
        }
        self.latency_total += inst.timing.latency();
    }

    /// Renders only the requested report sections.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; unknown
    /// names are ignored. Pass an empty slice to render every section.
    pub fn report(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let fetched = self.fetched.max(1) as f64;
        let pct = |n: u64| (n as f64 / fetched) * 100.0;

        let mut out = Vec::new();
        out.push(RULE.to_owned());
        out.push("RISC-V PIPELINE TRACE STATISTICS".to_owned());
        out.push(RULE.to_owned());

        if want("summary") {
            let first = self
                .first_fetch_cycle
                .map_or_else(|| "-".to_owned(), |c| c.to_string());
            out.push(format!("trace_events             {}", self.events));
            out.push(format!("trace_insts              {}", self.retired()));
            out.push(format!("trace_first_fetch        {first}"));
            out.push(format!("trace_last_cycle         {}", self.last_cycle));
            out.push(format!("trace_mean_latency       {:.2}", self.mean_latency()));
            out.push(SEPARATOR.to_owned());
        }
        if want("events") {
            out.push("EVENTS".to_owned());
            out.push(format!("  skipped.reset          {}", self.skipped_reset));
            out.push(format!("  skipped.invalid_pc     {}", self.skipped_invalid_pc));
            out.push(format!("  skipped.invalid_fetch  {}", self.skipped_invalid_fetch));
            out.push(format!("  skipped.empty          {}", self.skipped_empty));
            out.push(format!("  skipped.csr_busy       {}", self.skipped_csr_busy));
            out.push(format!("  bubbles                {}", self.bubbles));
            out.push(SEPARATOR.to_owned());
        }
        if want("lifecycle") {
            out.push("INSTRUCTION LIFECYCLE".to_owned());
            out.push(format!("  fetched                {}", self.fetched));
            out.push(format!(
                "  retired.writeback      {} ({:.2}%)",
                self.retired_writeback,
                pct(self.retired_writeback)
            ));
            out.push(format!(
                "  retired.csr            {} ({:.2}%)",
                self.retired_csr,
                pct(self.retired_csr)
            ));
            out.push(format!(
                "  flushed                {} ({:.2}%)",
                self.flushed,
                pct(self.flushed)
            ));
            out.push(format!("  stalls.decode          {}", self.stall_cycles));
            out.push(SEPARATOR.to_owned());
        }
        if want("instruction_mix") {
            let retired = self.retired().max(1) as f64;
            let mix = |n: u64| (n as f64 / retired) * 100.0;
            out.push("INSTRUCTION MIX".to_owned());
            out.push(format!("  op.jump                {} ({:.2}%)", self.jumps, mix(self.jumps)));
            out.push(format!("  op.load                {} ({:.2}%)", self.loads, mix(self.loads)));
            out.push(format!("  op.store               {} ({:.2}%)", self.stores, mix(self.stores)));
            out.push(format!(
                "  op.csr                 {} ({:.2}%)",
                self.csr_accesses,
                mix(self.csr_accesses)
            ));
            out.push(format!("  anomalies              {}", self.anomalies));
        }
        out.push(RULE.to_owned());
        out.join("\n")
    }
}

impl fmt::Display for TraceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(&[]))
    }
}
