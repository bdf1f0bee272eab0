//! TraceStats tests.
//!
//! Verifies the counters a full trace run leaves behind and the rendered
//! report sections.

use rvtrace_core::event::{CsrTransaction, DecodeSignals, StageEvent, StoreAccess};
use rvtrace_core::stats::{STATS_SECTIONS, TraceStats};
use rvtrace_core::tracker::Tracker;

use crate::common::pipeline::{Instr, Op, PipelineModel};

fn run(events: &[StageEvent]) -> TraceStats {
    let mut tracker = Tracker::default();
    for event in events {
        let _ = tracker.step(event).unwrap();
    }
    tracker.finish().stats
}

fn mixed_program() -> Vec<Instr> {
    vec![
        Instr::new(0x0, 0x0010_0513, Op::Alu { rd: 10, value: 1 }),
        Instr::new(
            0x4,
            0x0000_2583,
            Op::Load {
                rd: 11,
                addr: 0x100,
                value: 7,
            },
        ),
        Instr::new(
            0x8,
            0x00B0_2023,
            Op::Store(StoreAccess {
                addr: 0x104,
                data: 7,
                mask: 0b1111,
            }),
        ),
        Instr::new(
            0xC,
            0x3000_2673,
            Op::Csr(CsrTransaction {
                addr: 0x300,
                read_data: 0x1800,
                writeback_enable: true,
                writeback_reg: 12,
                ..CsrTransaction::default()
            }),
        ),
        Instr::new(
            0x10,
            0xFF1F_F0EF,
            Op::Jump {
                rd: 1,
                target: 0x0,
                link: 0x14,
            },
        ),
    ]
}

#[test]
fn counters_after_a_mixed_program() {
    let events = PipelineModel::run(&mixed_program());
    let stats = run(&events);

    assert_eq!(stats.events, events.len() as u64);
    assert_eq!(stats.fetched, 5);
    assert_eq!(stats.retired_writeback, 4);
    assert_eq!(stats.retired_csr, 1);
    assert_eq!(stats.loads, 1);
    assert_eq!(stats.stores, 1);
    assert_eq!(stats.jumps, 1);
    assert_eq!(stats.csr_accesses, 1);
    assert_eq!(stats.skipped(), 0);
    assert_eq!(stats.first_fetch_cycle, Some(0));
    assert_eq!(stats.last_cycle, 8);
    // Every instruction spends four cycles between fetch and retirement.
    assert_eq!(stats.latency_total, 20);
    assert!((stats.mean_latency() - 4.0).abs() < f64::EPSILON);
}

#[test]
fn decode_stalls_are_counted() {
    let mut events = PipelineModel::run(&[Instr::nop(0x0)]);
    let fetch_at = events.iter().position(|e| e.cycle == Some(0)).unwrap();
    let stalled = StageEvent::decode(
        0x0,
        DecodeSignals {
            ready: Some(false),
            ..DecodeSignals::default()
        },
    );
    events.insert(fetch_at + 1, stalled.at_cycle(0));
    events.insert(fetch_at + 2, stalled.at_cycle(0));

    let stats = run(&events);
    assert_eq!(stats.stall_cycles, 2);
    assert_eq!(stats.retired(), 1);
}

#[test]
fn report_lists_every_section() {
    let stats = run(&PipelineModel::run(&mixed_program()));
    let report = stats.to_string();
    for heading in ["EVENTS", "INSTRUCTION LIFECYCLE", "INSTRUCTION MIX"] {
        assert!(report.contains(heading), "missing {heading}");
    }
    assert!(report.contains("trace_insts              5"));
    assert!(report.contains("  retired.csr            1 (20.00%)"));
    assert!(report.contains("  op.load                1 (20.00%)"));
}

#[test]
fn report_sections_can_be_selected() {
    let stats = TraceStats::default();
    for section in STATS_SECTIONS {
        let report = stats.report(&[(*section).to_owned()]);
        assert!(report.starts_with("=========="));
        assert!(report.ends_with("=========="));
    }
    let lifecycle = stats.report(&["lifecycle".to_owned()]);
    assert!(lifecycle.contains("INSTRUCTION LIFECYCLE"));
    assert!(!lifecycle.contains("EVENTS"));
    assert!(!lifecycle.contains("trace_insts"));
}
