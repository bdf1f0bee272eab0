//! RISC-V Application Binary Interface (ABI) register names.
//!
//! Maps integer register indices to the standard ABI mnemonics used in trace
//! lines (`a0`, `sp`, `t3`, ...).

use crate::common::constants::NUM_REGS;
use crate::common::error::UnknownSymbolWarning;

/// Register x0 (zero register, always zero).
pub const REG_ZERO: u8 = 0;
/// Register x1 (return address, ra).
pub const REG_RA: u8 = 1;
/// Register x2 (stack pointer, sp).
pub const REG_SP: u8 = 2;
/// Register x10 (first argument/return value, a0).
pub const REG_A0: u8 = 10;
/// Register x11 (second argument, a1).
pub const REG_A1: u8 = 11;
/// Register x15 (sixth argument, a5).
pub const REG_A5: u8 = 15;

/// ABI register names for x0–x31.
const REG_NAMES: [&str; NUM_REGS] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name of an integer register.
///
/// # Arguments
///
/// * `index` - Register index as reported by the writeback or CSR unit.
///
/// # Errors
///
/// Returns [`UnknownSymbolWarning::Register`] for indices above 31.
#[inline]
pub fn reg_name(index: u8) -> Result<&'static str, UnknownSymbolWarning> {
    REG_NAMES
        .get(index as usize)
        .copied()
        .ok_or(UnknownSymbolWarning::Register(index))
}
