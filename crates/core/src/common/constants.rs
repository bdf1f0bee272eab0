//! Global Trace Constants.
//!
//! This module defines constants shared by the event decoder, the tracker and
//! the formatter. It includes:
//! 1. **Slot Constants:** The sentinel program counter of an empty pipeline slot.
//! 2. **Field Widths:** Bit widths of the narrow fields in the simulator log.
//! 3. **Rendering Constants:** Column widths of the trace line grammar.

/// Program counter reported by a stage that holds no valid instruction.
pub const SENTINEL_PC: u32 = 0xFFFF_FFFF;

/// Number of integer registers addressable by `wb_reg` / `csr_writeback_reg`.
pub const NUM_REGS: usize = 32;

/// Width of a CSR address in bits.
pub const CSR_ADDR_BITS: u32 = 12;

/// Width of the store byte-enable mask in bits (one bit per byte of a word).
pub const STORE_MASK_BITS: u32 = 4;

/// Column width of the program counter field.
pub const PC_COLUMN_WIDTH: usize = 8;

/// Minimum number of hex digits printed for the program counter.
pub const PC_MIN_DIGITS: usize = 2;

/// Column width of a register name inside a writeback clause.
pub const REG_NAME_WIDTH: usize = 5;

/// Column width of a writeback clause when another clause follows it.
pub const WRITEBACK_COLUMN_WIDTH: usize = 16;

/// Column width of a CSR read clause when a CSR write clause follows it.
pub const CSR_READ_COLUMN_WIDTH: usize = 24;

/// Marker that prefixes a line whose fields form no legal combination.
pub const ANOMALY_MARKER: &str = "!!!!!!!!";
