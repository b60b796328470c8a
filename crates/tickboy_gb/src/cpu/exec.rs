mod alu;
mod cb;
mod control;
mod ld;

use anyhow::{bail, Result};

use super::alu::{unpack_flags, unpack_value, Flag, RotDir};
use super::opcode::{Family, Opcode};
use super::regs::{Reg, Reg16};
use super::{Bus, Cpu, Flow};
use crate::bits;

/// Where each flag of an instruction result comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FlagSrc {
    /// Forced to 0.
    V0,
    /// Forced to 1.
    V1,
    /// Taken from the ALU result.
    Alu,
    /// Left as the CPU had it.
    Cpu,
}

/// Sources for Z, N, H and C, in that order.
pub(super) type FlagRule = [FlagSrc; 4];

use FlagSrc::{Alu, Cpu as Keep, V0, V1};

pub(super) const ALU_ALL: FlagRule = [Alu, Alu, Alu, Alu];
pub(super) const INC_DEC_N0: FlagRule = [Alu, V0, Alu, Keep];
pub(super) const INC_DEC_N1: FlagRule = [Alu, V1, Alu, Keep];
pub(super) const ROT_A: FlagRule = [V0, V0, V0, Alu];
pub(super) const SHIFT: FlagRule = [Alu, V0, V0, Alu];

impl Cpu {
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B, op: Opcode, next_pc: u16) -> Result<Flow> {
        use Family::*;

        match op.family {
            Nop => {}
            LdR8Hlr | LdAHlru | LdAN8r | LdACr | LdAN16r | LdABcr | LdADer | LdR8N8
            | LdR16SpN16 | PopR16 | LdHlrR8 | LdHlruA | LdN8rA | LdCrA | LdN16rA | LdBcrA
            | LdDerA | LdHlrN8 | LdN16rSp | LdR8R8 | LdSpHl | PushR16 => self.exec_ld(bus, op),
            AddAR8 | AddAN8 | AddAHlr | IncR8 | IncHlr | IncR16Sp | AddHlR16Sp | LdHlSpS8
            | SubAR8 | SubAN8 | SubAHlr | DecR8 | DecHlr | CpAR8 | CpAN8 | CpAHlr | DecR16Sp
            | AndAN8 | AndAR8 | AndAHlr | OrAR8 | OrAN8 | OrAHlr | XorAR8 | XorAN8 | XorAHlr
            | Cpl | RotCa | RotA | Daa | Sccf => self.exec_alu(bus, op),
            RotCR8 | RotR8 | RotCHlr | RotHlr | SwapR8 | SwapHlr | SlaR8 | SraR8 | SrlR8
            | SlaHlr | SraHlr | SrlHlr | BitU3R8 | BitU3Hlr | ChgU3R8 | ChgU3Hlr => {
                self.exec_cb(bus, op)?
            }
            JpHl | JpN16 | JpCcN16 | JrE8 | JrCcE8 | CallN16 | CallCcN16 | RstU3 | Ret
            | RetCc | Edi | Reti => return Ok(self.exec_control(bus, op, next_pc)),
            Halt => return Ok(Flow::Halt),
            Stop => {
                log::error!("STOP executed at 0x{:04X}", self.pc);
                bail!("STOP instruction at {:#06X} is not supported", self.pc)
            }
        }
        Ok(Flow::Next)
    }

    #[inline]
    fn read8_after_opcode<B: Bus>(&self, bus: &mut B) -> u8 {
        bus.read8(self.pc.wrapping_add(1))
    }

    #[inline]
    fn read16_after_opcode<B: Bus>(&self, bus: &mut B) -> u16 {
        bus.read16(self.pc.wrapping_add(1))
    }

    #[inline]
    fn read_hl<B: Bus>(&self, bus: &mut B) -> u8 {
        bus.read8(self.reg16(Reg16::HL))
    }

    #[inline]
    fn write_hl<B: Bus>(&self, bus: &mut B, value: u8) {
        bus.write8(self.reg16(Reg16::HL), value);
    }

    /// Stores the value half of an ALU result in `reg` and merges its flags.
    fn set_reg_from_alu(&mut self, reg: Reg, vf: u32, rule: FlagRule) {
        self.set_reg(reg, unpack_value(vf) as u8);
        self.combine_alu_flags(vf, rule);
    }

    fn write_hl_from_alu<B: Bus>(&mut self, bus: &mut B, vf: u32, rule: FlagRule) {
        self.write_hl(bus, unpack_value(vf) as u8);
        self.combine_alu_flags(vf, rule);
    }

    /// Rebuilds F from the ALU flags and the current F according to `rule`.
    fn combine_alu_flags(&mut self, vf: u32, rule: FlagRule) {
        let alu_flags = unpack_flags(vf);
        let f = [Flag::Z, Flag::N, Flag::H, Flag::C]
            .into_iter()
            .zip(rule)
            .fold(0u32, |f, (flag, src)| {
                let value = match src {
                    V0 => false,
                    V1 => true,
                    Alu => bits::test_bit(u32::from(alu_flags), flag),
                    Keep => self.flag(flag),
                };
                bits::set_bit(f, flag, value)
            });
        self.set_reg(Reg::F, f as u8);
    }
}

/// The 8-bit register in the operand field starting at bit `start`.
#[inline]
fn reg_at(op: Opcode, start: u8) -> Reg {
    Reg::from_code(op.encoding >> start)
}

/// The register pair in bits 4–5.
#[inline]
fn pair(op: Opcode) -> Reg16 {
    Reg16::from_code(op.encoding >> 4)
}

/// The bit index in bits 3–5.
#[inline]
fn bit_index(op: Opcode) -> u8 {
    (op.encoding >> 3) & 0b111
}

/// Bit 3: selects the carry variant (ADC, SBC) or a right rotation.
#[inline]
fn bit3(op: Opcode) -> bool {
    op.encoding & 0b1000 != 0
}

#[inline]
fn rot_dir(op: Opcode) -> RotDir {
    if bit3(op) {
        RotDir::Right
    } else {
        RotDir::Left
    }
}

/// Bit 4 picks decrement for the `(HL+)`/`(HL-)` forms.
#[inline]
fn hl_increment(op: Opcode) -> u16 {
    if op.encoding & 0b1_0000 != 0 {
        0xFFFF
    } else {
        1
    }
}
