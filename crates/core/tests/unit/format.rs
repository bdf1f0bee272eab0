//! Trace lines of instructions taken through the tracker.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvtrace_core::config::FormatConfig;
use rvtrace_core::event::{CsrTransaction, StoreAccess};
use rvtrace_core::format::TraceFormatter;
use rvtrace_core::process;

use crate::common::pipeline::{Instr, NOP, Op, PipelineModel};

fn trace(program: &[Instr], config: FormatConfig) -> Vec<String> {
    let formatter = TraceFormatter::new(config);
    process(PipelineModel::run(program))
        .unwrap()
        .iter()
        .map(|inst| formatter.format(inst))
        .collect()
}

#[rstest]
#[case::nop(Instr::nop(0x80), "      80[00000013]: NOP")]
#[case::alu(Instr::new(0x84, 0x0050_0593, Op::Alu { rd: 11, value: 5 }), "      84[00500593]: a1    = 0x5")]
#[case::load(
    Instr::new(0x88, 0x0040_2603, Op::Load { rd: 12, addr: 0x4, value: 0xDEAD_BEEF }),
    "      88[00402603]: a2    = 0xDEADBEEF [@4]"
)]
#[case::byte_store(
    Instr::new(0x8C, 0x00C0_0223, Op::Store(StoreAccess { addr: 0x4, data: 0xEF, mask: 0b0001 })),
    "      8C[00C00223]: @4 = 0xEF & 0001"
)]
#[case::call(
    Instr::new(0x90, 0x0100_00EF, Op::Jump { rd: 1, target: 0xA0, link: 0x94 }),
    "      90[010000EF]: ra    = 0x94     & JUMP @A0"
)]
#[case::csr_write(
    Instr::new(0x94, 0x3410_1073, Op::Csr(CsrTransaction {
        addr: 0x341,
        write_data: 0x80,
        write_enable: true,
        ..CsrTransaction::default()
    })),
    "      94[34101073]: mepc = 0x80"
)]
fn pipeline_instruction_lines(#[case] instr: Instr, #[case] expected: &str) {
    assert_eq!(trace(&[instr], FormatConfig::default()), vec![expected]);
}

#[test]
fn timing_annotations_follow_the_pipeline() {
    let program = [Instr::nop(0x0), Instr::nop(0x4)];
    let lines = trace(
        &program,
        FormatConfig {
            show_timing: true,
            ..FormatConfig::default()
        },
    );
    assert_eq!(
        lines,
        vec![
            "      00[00000013]: NOP  ; issue=0 latency=4 stall=0",
            "      04[00000013]: NOP  ; issue=1 latency=4 stall=0",
        ]
    );
}

#[test]
fn wide_pc_column() {
    let lines = trace(
        &[Instr::new(0x8000_0000, NOP, Op::Alu { rd: 0, value: 0 })],
        FormatConfig {
            pc_width: 10,
            ..FormatConfig::default()
        },
    );
    assert_eq!(lines, vec!["  80000000[00000013]: NOP"]);
}
