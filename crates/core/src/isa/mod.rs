//! Instruction set symbols used for trace rendering.
//!
//! This module provides the two static symbol tables of the trace engine:
//! 1. **ABI:** Integer register index to ABI mnemonic (`a0`, `sp`, ...).
//! 2. **CSR:** CSR address to canonical name (`mstatus`, `pmpaddr12`, ...).
//!
//! Both tables are process-lifetime constants; lookups never fail hard, they
//! report an [`UnknownSymbolWarning`](crate::common::error::UnknownSymbolWarning).

/// RISC-V ABI register names.
pub mod abi;

/// CSR addresses and names.
pub mod csr;

pub use abi::reg_name;
pub use csr::{CsrName, csr_name};
