//! Control and Status Register (CSR) names.
//!
//! This module maps CSR addresses to their canonical names for trace
//! rendering. It provides:
//! 1. **Address Definitions:** Constants for the machine, supervisor and counter CSRs.
//! 2. **Fixed Names:** A sorted table of individually named CSRs.
//! 3. **Banked Names:** Numbered CSR banks (`pmpaddrN`, `mhpmcounterNh`, ...).

use std::fmt;

use crate::common::error::UnknownSymbolWarning;

/// Supervisor status register CSR address.
pub const SSTATUS: u16 = 0x100;

/// Supervisor interrupt enable register CSR address.
pub const SIE: u16 = 0x104;

/// Supervisor trap vector base address register CSR address.
pub const STVEC: u16 = 0x105;

/// Supervisor counter enable register CSR address.
pub const SCOUNTEREN: u16 = 0x106;

/// Supervisor scratch register CSR address.
pub const SSCRATCH: u16 = 0x140;

/// Supervisor exception program counter CSR address.
pub const SEPC: u16 = 0x141;

/// Supervisor cause register CSR address.
pub const SCAUSE: u16 = 0x142;

/// Supervisor trap value register CSR address.
pub const STVAL: u16 = 0x143;

/// Supervisor interrupt pending register CSR address.
pub const SIP: u16 = 0x144;

/// Supervisor timer compare register CSR address.
pub const STIMECMP: u16 = 0x14D;

/// Supervisor address translation and protection register CSR address.
pub const SATP: u16 = 0x180;

/// Machine status register CSR address.
pub const MSTATUS: u16 = 0x300;

/// Machine ISA register CSR address.
pub const MISA: u16 = 0x301;

/// Machine exception delegation register CSR address.
pub const MEDELEG: u16 = 0x302;

/// Machine interrupt delegation register CSR address.
pub const MIDELEG: u16 = 0x303;

/// Machine interrupt enable register CSR address.
pub const MIE: u16 = 0x304;

/// Machine trap vector base address register CSR address.
pub const MTVEC: u16 = 0x305;

/// Machine counter enable register CSR address.
pub const MCOUNTEREN: u16 = 0x306;

/// Upper half of the machine status register (RV32 only).
pub const MSTATUSH: u16 = 0x310;

/// Machine counter-inhibit register CSR address.
pub const MCOUNTINHIBIT: u16 = 0x320;

/// Machine scratch register CSR address.
pub const MSCRATCH: u16 = 0x340;

/// Machine exception program counter CSR address.
pub const MEPC: u16 = 0x341;

/// Machine cause register CSR address.
pub const MCAUSE: u16 = 0x342;

/// Machine trap value register CSR address.
pub const MTVAL: u16 = 0x343;

/// Machine interrupt pending register CSR address.
pub const MIP: u16 = 0x344;

/// Machine trap instruction register CSR address.
pub const MTINST: u16 = 0x34A;

/// Machine second trap value register CSR address.
pub const MTVAL2: u16 = 0x34B;

/// Machine cycle counter CSR address.
pub const MCYCLE: u16 = 0xB00;

/// Machine instructions retired counter CSR address.
pub const MINSTRET: u16 = 0xB02;

/// Upper half of the machine cycle counter (RV32 only).
pub const MCYCLEH: u16 = 0xB80;

/// Upper half of the machine instructions retired counter (RV32 only).
pub const MINSTRETH: u16 = 0xB82;

/// Cycle counter CSR address (read-only, user mode accessible).
pub const CYCLE: u16 = 0xC00;

/// Real-time counter CSR address (read-only, user mode accessible).
pub const TIME: u16 = 0xC01;

/// Instructions retired counter CSR address (read-only, user mode accessible).
pub const INSTRET: u16 = 0xC02;

/// Upper half of the cycle counter (RV32 only).
pub const CYCLEH: u16 = 0xC80;

/// Upper half of the real-time counter (RV32 only).
pub const TIMEH: u16 = 0xC81;

/// Upper half of the instructions retired counter (RV32 only).
pub const INSTRETH: u16 = 0xC82;

/// Machine vendor ID CSR address.
pub const MVENDORID: u16 = 0xF11;

/// Machine architecture ID CSR address.
pub const MARCHID: u16 = 0xF12;

/// Machine implementation ID CSR address.
pub const MIMPID: u16 = 0xF13;

/// Machine hardware thread ID CSR address.
pub const MHARTID: u16 = 0xF14;

/// Individually named CSRs, sorted by address.
const FIXED_NAMES: &[(u16, &str)] = &[
    (SSTATUS, "sstatus"),
    (SIE, "sie"),
    (STVEC, "stvec"),
    (SCOUNTEREN, "scounteren"),
    (SSCRATCH, "sscratch"),
    (SEPC, "sepc"),
    (SCAUSE, "scause"),
    (STVAL, "stval"),
    (SIP, "sip"),
    (STIMECMP, "stimecmp"),
    (SATP, "satp"),
    (MSTATUS, "mstatus"),
    (MISA, "misa"),
    (MEDELEG, "medeleg"),
    (MIDELEG, "mideleg"),
    (MIE, "mie"),
    (MTVEC, "mtvec"),
    (MCOUNTEREN, "mcounteren"),
    (MSTATUSH, "mstatush"),
    (MCOUNTINHIBIT, "mcountinhibit"),
    (MSCRATCH, "mscratch"),
    (MEPC, "mepc"),
    (MCAUSE, "mcause"),
    (MTVAL, "mtval"),
    (MIP, "mip"),
    (MTINST, "mtinst"),
    (MTVAL2, "mtval2"),
    (MCYCLE, "mcycle"),
    (MINSTRET, "minstret"),
    (MCYCLEH, "mcycleh"),
    (MINSTRETH, "minstreth"),
    (CYCLE, "cycle"),
    (TIME, "time"),
    (INSTRET, "instret"),
    (CYCLEH, "cycleh"),
    (TIMEH, "timeh"),
    (INSTRETH, "instreth"),
    (MVENDORID, "mvendorid"),
    (MARCHID, "marchid"),
    (MIMPID, "mimpid"),
    (MHARTID, "mhartid"),
];

/// A numbered CSR bank: `first..=last` map to `stem{first_index + offset}{suffix}`.
struct Bank {
    first: u16,
    last: u16,
    first_index: u16,
    stem: &'static str,
    suffix: &'static str,
}

/// Numbered CSR banks.
const BANKS: &[Bank] = &[
    Bank { first: 0x323, last: 0x33F, first_index: 3, stem: "mhpmevent", suffix: "" },
    Bank { first: 0x3A0, last: 0x3AF, first_index: 0, stem: "pmpcfg", suffix: "" },
    Bank { first: 0x3B0, last: 0x3EF, first_index: 0, stem: "pmpaddr", suffix: "" },
    Bank { first: 0xB03, last: 0xB1F, first_index: 3, stem: "mhpmcounter", suffix: "" },
    Bank { first: 0xB83, last: 0xB9F, first_index: 3, stem: "mhpmcounter", suffix: "h" },
    Bank { first: 0xC03, last: 0xC1F, first_index: 3, stem: "hpmcounter", suffix: "" },
    Bank { first: 0xC83, last: 0xC9F, first_index: 3, stem: "hpmcounter", suffix: "h" },
];

/// Canonical name of a CSR.
///
/// Banked CSRs are rendered from a stem and an index rather than stored as
/// individual strings, so the name is a small `Copy` value implementing
/// [`Display`](fmt::Display).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsrName {
    stem: &'static str,
    index: Option<u16>,
    suffix: &'static str,
}

impl CsrName {
    const fn fixed(name: &'static str) -> Self {
        Self {
            stem: name,
            index: None,
            suffix: "",
        }
    }
}

impl fmt::Display for CsrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem)?;
        if let Some(index) = self.index {
            write!(f, "{index}")?;
        }
        f.write_str(self.suffix)
    }
}

/// Looks up the canonical name of a CSR address.
///
/// # Arguments
///
/// * `addr` - 12-bit CSR address from the decode stage.
///
/// # Errors
///
/// Returns [`UnknownSymbolWarning::Csr`] when the address is neither a named
/// CSR nor part of a numbered bank.
pub fn csr_name(addr: u16) -> Result<CsrName, UnknownSymbolWarning> {
    if let Ok(pos) = FIXED_NAMES.binary_search_by_key(&addr, |&(a, _)| a) {
        return Ok(CsrName::fixed(FIXED_NAMES[pos].1));
    }

    BANKS
        .iter()
        .find(|bank| (bank.first..=bank.last).contains(&addr))
        .map(|bank| CsrName {
            stem: bank.stem,
            index: Some(bank.first_index + (addr - bank.first)),
            suffix: bank.suffix,
        })
        .ok_or(UnknownSymbolWarning::Csr(addr))
}
