//! Wire decoding of simulator log objects.
//!
//! The simulator's logger emits every signal as whatever its display routine
//! produced: JSON numbers, decimal strings, `"x"` for undriven buses. This
//! module accepts those encodings, applies the canonical and legacy field
//! names, and validates each object into a typed [`StageEvent`].

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, Visitor};

use super::{
    CsrPhase, CsrTransaction, DecodeSignals, ExecuteSignals, MemAccess, MemorySignals, Stage,
    StageEvent, StageSignals, StoreAccess, WritebackResult, WritebackSignals,
};
use crate::common::constants::{CSR_ADDR_BITS, SENTINEL_PC, STORE_MASK_BITS};
use crate::common::error::EventError;

/// A scalar signal value as it appears in the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Scalar {
    /// JSON number or boolean.
    Int(u64),
    /// JSON string, trimmed.
    Text(String),
    /// JSON `null`.
    Null,
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

struct ScalarVisitor;

impl Visitor<'_> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer, a boolean, or a string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
        Ok(Scalar::Int(u64::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
        Ok(Scalar::Int(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
        u64::try_from(v)
            .map(Scalar::Int)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
        Ok(Scalar::Text(v.trim().to_owned()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Scalar, E> {
        Ok(Scalar::Null)
    }
}

impl Scalar {
    fn malformed(&self, field: &'static str) -> EventError {
        let text = match self {
            Self::Int(v) => v.to_string(),
            Self::Text(t) => t.clone(),
            Self::Null => "null".to_owned(),
        };
        EventError::Malformed { field, text }
    }

    /// Decodes an unsigned integer: number, decimal, `0x` hex or `0b` binary text.
    fn number(&self, field: &'static str) -> Result<u64, EventError> {
        let Self::Text(text) = self else {
            return match self {
                Self::Int(v) => Ok(*v),
                _ => Err(self.malformed(field)),
            };
        };

        let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
            u64::from_str_radix(bin, 2)
        } else {
            text.parse()
        };
        parsed.map_err(|_| self.malformed(field))
    }

    /// Decodes an unsigned integer no wider than `bits`.
    fn bits(&self, field: &'static str, bits: u32) -> Result<u64, EventError> {
        let value = self.number(field)?;
        if bits < u64::BITS && value >> bits != 0 {
            return Err(EventError::OutOfRange { field, value, bits });
        }
        Ok(value)
    }

    fn word(&self, field: &'static str) -> Result<u32, EventError> {
        self.bits(field, u32::BITS).map(|v| v as u32)
    }

    fn flag(&self, field: &'static str) -> Result<bool, EventError> {
        if let Self::Text(text) = self {
            if text.eq_ignore_ascii_case("true") {
                return Ok(true);
            }
            if text.eq_ignore_ascii_case("false") {
                return Ok(false);
            }
        }
        match self.number(field)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.malformed(field)),
        }
    }

    /// Decodes a program counter; undriven (`x`/`z`) and `null` are the invalid marker.
    fn pc(&self) -> Result<Option<u32>, EventError> {
        match self {
            Self::Null => Ok(None),
            Self::Text(t) if !t.is_empty() && t.chars().all(|c| matches!(c, 'x' | 'X' | 'z' | 'Z')) => Ok(None),
            _ => self.word("pc").map(Some),
        }
    }

    fn csr_phase(&self) -> Result<Phase, EventError> {
        if let Self::Text(text) = self {
            for (name, phase) in [("IDLE", Phase::Idle), ("BUSY", Phase::Busy), ("RETIRE", Phase::Retire)] {
                if text.eq_ignore_ascii_case(name) {
                    return Ok(phase);
                }
            }
        }
        match self.number("csr_state")? {
            0 => Ok(Phase::Idle),
            1 => Ok(Phase::Busy),
            2 => Ok(Phase::Retire),
            _ => Err(self.malformed("csr_state")),
        }
    }

    fn mem_mode(&self) -> Result<Mode, EventError> {
        if let Self::Text(text) = self {
            for (name, mode) in [("NONE", Mode::None), ("LOAD", Mode::Load), ("STORE", Mode::Store)] {
                if text.eq_ignore_ascii_case(name) {
                    return Ok(mode);
                }
            }
        }
        match self.number("mem_mode")? {
            0 => Ok(Mode::None),
            1 => Ok(Mode::Load),
            2 => Ok(Mode::Store),
            _ => Err(self.malformed("mem_mode")),
        }
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Idle,
    Busy,
    Retire,
}

#[derive(Clone, Copy)]
enum Mode {
    None,
    Load,
    Store,
}

fn opt_word(value: Option<&Scalar>, field: &'static str) -> Result<Option<u32>, EventError> {
    value.map(|v| v.word(field)).transpose()
}

fn opt_bits(value: Option<&Scalar>, field: &'static str, bits: u32) -> Result<Option<u64>, EventError> {
    value.map(|v| v.bits(field, bits)).transpose()
}

fn opt_flag(value: Option<&Scalar>, field: &'static str) -> Result<Option<bool>, EventError> {
    value.map(|v| v.flag(field)).transpose()
}

/// Presence policy for fields the event's meaning requires.
///
/// Events the tracker skips anyway (reset, empty slot, invalid fetch) are
/// decoded leniently: required fields default to zero instead of failing.
#[derive(Clone, Copy)]
struct Required {
    stage: Stage,
    lenient: bool,
}

impl Required {
    fn field<T: Default>(self, value: Option<T>, field: &'static str) -> Result<T, EventError> {
        match value {
            Some(v) => Ok(v),
            None if self.lenient => Ok(T::default()),
            None => Err(EventError::MissingField {
                stage: self.stage,
                field,
            }),
        }
    }
}

/// A log object with every known signal optional.
///
/// Field names are the canonical ones; aliases accept the legacy simulator
/// logger. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEvent {
    stage: Stage,
    pc: Scalar,
    #[serde(alias = "time")]
    cycle: Option<Scalar>,
    reset: Option<Scalar>,
    valid: Option<Scalar>,
    ir: Option<Scalar>,

    ready: Option<Scalar>,
    #[serde(alias = "jmp_valid")]
    jump_valid: Option<Scalar>,
    #[serde(alias = "jmp_addr")]
    jump_target: Option<Scalar>,
    csr_state: Option<Scalar>,
    csr_addr: Option<Scalar>,
    csr_read_data: Option<Scalar>,
    csr_write_data: Option<Scalar>,
    #[serde(alias = "csr_wb_enable")]
    csr_writeback_enable: Option<Scalar>,
    csr_write_enable: Option<Scalar>,
    #[serde(alias = "csr_wb_addr")]
    csr_writeback_reg: Option<Scalar>,

    #[serde(alias = "ma_addr")]
    alu_result: Option<Scalar>,

    #[serde(alias = "ma_mode")]
    mem_mode: Option<Scalar>,
    #[serde(alias = "dmem_addr")]
    mem_addr: Option<Scalar>,
    #[serde(alias = "dmem_write_data")]
    store_data: Option<Scalar>,
    #[serde(alias = "dmem_write_mask")]
    store_byte_mask: Option<Scalar>,

    #[serde(alias = "wb_addr")]
    wb_reg: Option<Scalar>,
    wb_data: Option<Scalar>,
    wb_valid: Option<Scalar>,
}

impl WireEvent {
    fn decode_signals(&self, req: Required) -> Result<DecodeSignals, EventError> {
        let jump_target = if opt_flag(self.jump_valid.as_ref(), "jump_valid")?.unwrap_or(false) {
            Some(req.field(opt_word(self.jump_target.as_ref(), "jump_target")?, "jump_target")?)
        } else {
            None
        };

        let phase = self
            .csr_state
            .as_ref()
            .map(Scalar::csr_phase)
            .transpose()?
            .unwrap_or(Phase::Idle);

        let csr = match phase {
            Phase::Idle => CsrPhase::Idle,
            Phase::Busy => CsrPhase::Busy,
            Phase::Retire => CsrPhase::Retire(self.csr_transaction(req)?),
        };

        Ok(DecodeSignals {
            ir: opt_word(self.ir.as_ref(), "ir")?,
            ready: opt_flag(self.ready.as_ref(), "ready")?,
            jump_target,
            csr,
        })
    }

    fn csr_transaction(&self, req: Required) -> Result<CsrTransaction, EventError> {
        let addr = opt_bits(self.csr_addr.as_ref(), "csr_addr", CSR_ADDR_BITS)?;
        let writeback_enable = opt_flag(self.csr_writeback_enable.as_ref(), "csr_writeback_enable")?;
        let write_enable = opt_flag(self.csr_write_enable.as_ref(), "csr_write_enable")?;
        let writeback_reg = opt_bits(self.csr_writeback_reg.as_ref(), "csr_writeback_reg", u8::BITS)?;

        let writeback_enable = req.field(writeback_enable, "csr_writeback_enable")?;
        let write_enable = req.field(write_enable, "csr_write_enable")?;

        let read_data = opt_word(self.csr_read_data.as_ref(), "csr_read_data")?;
        let write_data = opt_word(self.csr_write_data.as_ref(), "csr_write_data")?;

        Ok(CsrTransaction {
            addr: req.field(addr, "csr_addr")? as u16,
            read_data: if writeback_enable {
                req.field(read_data, "csr_read_data")?
            } else {
                read_data.unwrap_or(0)
            },
            write_data: if write_enable {
                req.field(write_data, "csr_write_data")?
            } else {
                write_data.unwrap_or(0)
            },
            writeback_enable,
            write_enable,
            writeback_reg: req.field(writeback_reg, "csr_writeback_reg")? as u8,
        })
    }

    fn memory_signals(&self, req: Required) -> Result<MemorySignals, EventError> {
        let mode = self
            .mem_mode
            .as_ref()
            .map(Scalar::mem_mode)
            .transpose()?
            .unwrap_or(Mode::None);
        let addr = opt_word(self.mem_addr.as_ref(), "mem_addr")?;

        let access = match mode {
            Mode::None => MemAccess::None,
            Mode::Load => MemAccess::Load {
                addr: req.field(addr, "mem_addr")?,
            },
            Mode::Store => MemAccess::Store(StoreAccess {
                addr: req.field(addr, "mem_addr")?,
                data: req.field(opt_word(self.store_data.as_ref(), "store_data")?, "store_data")?,
                mask: req.field(
                    opt_bits(self.store_byte_mask.as_ref(), "store_byte_mask", STORE_MASK_BITS)?,
                    "store_byte_mask",
                )? as u8,
            }),
        };

        Ok(MemorySignals {
            ir: opt_word(self.ir.as_ref(), "ir")?,
            access,
        })
    }

    fn writeback_signals(&self, req: Required) -> Result<WritebackSignals, EventError> {
        let ir = opt_word(self.ir.as_ref(), "ir")?;
        let reg = opt_bits(self.wb_reg.as_ref(), "wb_reg", u8::BITS)?;
        let data = opt_word(self.wb_data.as_ref(), "wb_data")?;
        let valid = opt_flag(self.wb_valid.as_ref(), "wb_valid")?.unwrap_or(true);

        let result = if ir.is_some() || reg.is_some() || data.is_some() {
            Some(WritebackResult {
                reg: req.field(reg, "wb_reg")? as u8,
                data: req.field(data, "wb_data")?,
                valid,
            })
        } else {
            None
        };

        Ok(WritebackSignals { ir, result })
    }
}

impl TryFrom<WireEvent> for StageEvent {
    type Error = EventError;

    fn try_from(wire: WireEvent) -> Result<Self, EventError> {
        let stage = wire.stage;
        let pc = wire.pc.pc()?;
        let reset = opt_flag(wire.reset.as_ref(), "reset")?.unwrap_or(false);
        let cycle = wire.cycle.as_ref().map(|c| c.number("cycle")).transpose()?;
        let valid = opt_flag(wire.valid.as_ref(), "valid")?.unwrap_or(true);

        let empty_slot = pc.is_none_or(|pc| pc == SENTINEL_PC);
        let req = Required {
            stage,
            lenient: reset || empty_slot || (stage == Stage::Fetch && !valid),
        };

        let signals = match stage {
            Stage::Fetch => StageSignals::Fetch {
                ir: req.field(opt_word(wire.ir.as_ref(), "ir")?, "ir")?,
                valid,
            },
            Stage::Decode => StageSignals::Decode(wire.decode_signals(req)?),
            Stage::Execute => StageSignals::Execute(ExecuteSignals {
                ir: opt_word(wire.ir.as_ref(), "ir")?,
                alu_result: opt_word(wire.alu_result.as_ref(), "alu_result")?,
            }),
            Stage::MemAccess => StageSignals::MemAccess(wire.memory_signals(req)?),
            Stage::Writeback => StageSignals::Writeback(wire.writeback_signals(req)?),
        };

        Ok(Self {
            cycle,
            pc,
            reset,
            signals,
        })
    }
}
