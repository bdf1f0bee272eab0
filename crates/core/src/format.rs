//! Trace line formatter.
//!
//! Renders one retired instruction as one line of the execution trace:
//!
//! ```text
//!       40[00F12023]: @1000 = 0xFF & 1111
//!       44[00052503]: a0    = 0x2A     [@2000]
//!       48[008000EF]: ra    = 0x4C     & JUMP @50
//!       4C[30002573]: a0    = 0x1800 [mstatus]
//! ```
//!
//! The fields an instruction produced are first rendered as clauses, then
//! classified into a line shape by a fixed decision table. Combinations the
//! table does not allow are rendered as anomalies instead of being dropped.

use std::fmt::{self, Write as _};

use tracing::warn;

use crate::common::constants::{
    ANOMALY_MARKER, CSR_READ_COLUMN_WIDTH, PC_MIN_DIGITS, REG_NAME_WIDTH, WRITEBACK_COLUMN_WIDTH,
};
use crate::event::StoreAccess;
use crate::isa::{csr_name, reg_name};
use crate::tracker::RetiredInstruction;

pub use crate::config::FormatConfig;

/// Rendered clauses of one instruction.
///
/// A clause is `None` when the instruction did not produce it or when its
/// rendering is suppressed (register writes to `zero`, disabled writes).
#[derive(Debug, Default)]
struct Clauses {
    writeback: Option<String>,
    load: Option<u32>,
    jump: Option<u32>,
    store: Option<StoreAccess>,
    csr_read: Option<String>,
    csr_write: Option<String>,
}

/// Layout of a trace line.
#[derive(Debug)]
enum LineShape<'a> {
    Store(StoreAccess),
    Load { writeback: Option<&'a str>, addr: u32 },
    JumpWriteback { writeback: &'a str, target: u32 },
    Jump(u32),
    Writeback(&'a str),
    CsrReadWrite { read: &'a str, write: &'a str },
    CsrRead(&'a str),
    CsrWrite(&'a str),
    Nop,
    Anomaly,
}

impl Clauses {
    fn shape(&self) -> LineShape<'_> {
        let writeback = self.writeback.as_deref();
        let csr_read = self.csr_read.as_deref();
        let csr_write = self.csr_write.as_deref();

        match (self.store, self.load, self.jump, writeback, csr_read, csr_write) {
            (Some(store), None, None, None, None, None) => LineShape::Store(store),
            (None, Some(addr), None, writeback, None, None) => LineShape::Load { writeback, addr },
            (None, None, Some(target), Some(writeback), None, None) => {
                LineShape::JumpWriteback { writeback, target }
            }
            (None, None, Some(target), None, None, None) => LineShape::Jump(target),
            (None, None, None, Some(writeback), None, None) => LineShape::Writeback(writeback),
            (None, None, None, None, Some(read), Some(write)) => LineShape::CsrReadWrite { read, write },
            (None, None, None, None, Some(read), None) => LineShape::CsrRead(read),
            (None, None, None, None, None, Some(write)) => LineShape::CsrWrite(write),
            (None, None, None, None, None, None) => LineShape::Nop,
            _ => LineShape::Anomaly,
        }
    }

    /// Every populated clause, in a fixed order.
    fn populated(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(writeback) = &self.writeback {
            out.push(writeback.clone());
        }
        if let Some(addr) = self.load {
            out.push(format!("@{addr:X}"));
        }
        if let Some(target) = self.jump {
            out.push(jump_clause(target));
        }
        if let Some(store) = self.store {
            out.push(store_clause(store));
        }
        if let Some(read) = &self.csr_read {
            out.push(read.clone());
        }
        if let Some(write) = &self.csr_write {
            out.push(write.clone());
        }
        out
    }
}

fn jump_clause(target: u32) -> String {
    format!("JUMP @{target:X}")
}

fn store_clause(store: StoreAccess) -> String {
    format!("@{:X} = 0x{:X} & {:04b}", store.addr, store.data, store.mask)
}

/// ABI name of a register, or `x<n>` when it has none.
fn register(index: u8) -> String {
    reg_name(index).map_or_else(
        |warning| {
            warn!(%warning, "rendering raw register index");
            format!("x{index}")
        },
        str::to_owned,
    )
}

/// Canonical name of a CSR, or `0x<ADDR>` when it has none.
fn csr(addr: u16) -> String {
    csr_name(addr).map_or_else(
        |warning| {
            warn!(%warning, "rendering raw CSR address");
            format!("0x{addr:X}")
        },
        |name| name.to_string(),
    )
}

/// One rendered trace line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLine {
    /// Line text, without a trailing newline.
    pub text: String,
    /// Whether the instruction's fields formed no legal combination.
    pub anomaly: bool,
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Stateless trace line formatter.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceFormatter {
    config: FormatConfig,
}

impl TraceFormatter {
    /// Creates a formatter with the given layout settings.
    pub const fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    /// Renders a retired instruction as a trace line.
    pub fn format(&self, inst: &RetiredInstruction) -> String {
        self.render(inst).text
    }

    /// Renders a retired instruction, reporting whether the line is an anomaly.
    pub fn render(&self, inst: &RetiredInstruction) -> TraceLine {
        let clauses = self.clauses(inst);
        let prefix = format!(
            "{:>width$}[{:08X}]: ",
            format!("{:0digits$X}", inst.pc, digits = PC_MIN_DIGITS),
            inst.ir,
            width = self.config.pc_width,
        );

        let body = match clauses.shape() {
            LineShape::Store(store) => store_clause(store),
            LineShape::Load { writeback, addr } => format!(
                "{:<width$} [@{addr:X}]",
                writeback.unwrap_or_default(),
                width = WRITEBACK_COLUMN_WIDTH
            ),
            LineShape::JumpWriteback { writeback, target } => format!(
                "{writeback:<width$} & {}",
                jump_clause(target),
                width = WRITEBACK_COLUMN_WIDTH
            ),
            LineShape::Jump(target) => jump_clause(target),
            LineShape::Writeback(writeback) => writeback.to_owned(),
            LineShape::CsrReadWrite { read, write } => {
                format!("{read:<width$} {write}", width = CSR_READ_COLUMN_WIDTH)
            }
            LineShape::CsrRead(read) => read.to_owned(),
            LineShape::CsrWrite(write) => write.to_owned(),
            LineShape::Nop => "NOP".to_owned(),
            LineShape::Anomaly => {
                warn!(tag = %inst.tag, pc = inst.pc, ?clauses, "fields form no legal trace line");
                let text = format!("{prefix}{ANOMALY_MARKER} {}", clauses.populated().join(" | "));
                return TraceLine {
                    text: self.annotate(inst, text),
                    anomaly: true,
                };
            }
        };

        TraceLine {
            text: self.annotate(inst, prefix + &body),
            anomaly: false,
        }
    }

    fn annotate(&self, inst: &RetiredInstruction, mut line: String) -> String {
        if self.config.show_timing {
            let timing = &inst.timing;
            let _ = write!(
                line,
                "  ; issue={} latency={} stall={}",
                timing.issue_cycle,
                timing.latency(),
                timing.stall.cycles
            );
        }
        line
    }

    fn clauses(&self, inst: &RetiredInstruction) -> Clauses {
        let writeback = inst
            .writeback
            .filter(|wb| wb.valid && wb.reg != 0)
            .map(|wb| format!("{:<width$} = 0x{:X}", register(wb.reg), wb.data, width = REG_NAME_WIDTH));

        let (csr_read, csr_write) = inst.csr.map_or((None, None), |tx| {
            let read = tx.writeback_enable.then(|| {
                format!(
                    "{:<width$} = 0x{:X} [{}]",
                    register(tx.writeback_reg),
                    tx.read_data,
                    csr(tx.addr),
                    width = REG_NAME_WIDTH
                )
            });
            let write = tx
                .write_enable
                .then(|| format!("{} = 0x{:X}", csr(tx.addr), tx.write_data));
            (read, write)
        });

        Clauses {
            writeback,
            load: inst.load_addr,
            jump: inst.jump_target,
            store: inst.store,
            csr_read,
            csr_write,
        }
    }
}

/// Renders a retired instruction with the default layout.
///
/// # Examples
///
/// ```
/// use rvtrace_core::format_line;
/// use rvtrace_core::tracker::{InstTag, RetiredInstruction};
///
/// let nop = RetiredInstruction::bare(InstTag(1), 0x0, 0x0000_0013);
/// assert_eq!(format_line(&nop), "      00[00000013]: NOP");
/// ```
pub fn format_line(inst: &RetiredInstruction) -> String {
    TraceFormatter::default().format(inst)
}
