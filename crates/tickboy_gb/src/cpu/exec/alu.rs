use super::super::alu::{self, mask_znhc, Flag};
use super::super::opcode::{Family, Opcode};
use super::super::regs::{Reg, Reg16};
use super::super::{Bus, Cpu};
use super::{bit3, pair, reg_at, rot_dir, FlagSrc, ALU_ALL, INC_DEC_N0, INC_DEC_N1, ROT_A};
use crate::bits;

use FlagSrc::{Alu, Cpu as Keep, V0, V1};

impl Cpu {
    /// Arithmetic and logic on A, 8-bit increments and 16-bit arithmetic.
    pub(super) fn exec_alu<B: Bus>(&mut self, bus: &mut B, op: Opcode) {
        match op.family {
            Family::AddAR8 | Family::AddAN8 | Family::AddAHlr => {
                let rhs = self.alu_operand(bus, op);
                let carry = bit3(op) && self.flag(Flag::C);
                let vf = alu::add(self.reg(Reg::A), rhs, carry);
                self.set_reg_from_alu(Reg::A, vf, ALU_ALL);
            }
            Family::SubAR8 | Family::SubAN8 | Family::SubAHlr => {
                let rhs = self.alu_operand(bus, op);
                let borrow = bit3(op) && self.flag(Flag::C);
                let vf = alu::sub(self.reg(Reg::A), rhs, borrow);
                self.set_reg_from_alu(Reg::A, vf, ALU_ALL);
            }
            Family::CpAR8 | Family::CpAN8 | Family::CpAHlr => {
                let rhs = self.alu_operand(bus, op);
                let vf = alu::sub(self.reg(Reg::A), rhs, false);
                self.combine_alu_flags(vf, ALU_ALL);
            }
            Family::AndAR8 | Family::AndAN8 | Family::AndAHlr => {
                let rhs = self.alu_operand(bus, op);
                let vf = alu::and(self.reg(Reg::A), rhs);
                self.set_reg_from_alu(Reg::A, vf, ALU_ALL);
            }
            Family::OrAR8 | Family::OrAN8 | Family::OrAHlr => {
                let rhs = self.alu_operand(bus, op);
                let vf = alu::or(self.reg(Reg::A), rhs);
                self.set_reg_from_alu(Reg::A, vf, ALU_ALL);
            }
            Family::XorAR8 | Family::XorAN8 | Family::XorAHlr => {
                let rhs = self.alu_operand(bus, op);
                let vf = alu::xor(self.reg(Reg::A), rhs);
                self.set_reg_from_alu(Reg::A, vf, ALU_ALL);
            }
            Family::IncR8 => {
                let reg = reg_at(op, 3);
                let vf = alu::add(self.reg(reg), 1, false);
                self.set_reg_from_alu(reg, vf, INC_DEC_N0);
            }
            Family::DecR8 => {
                let reg = reg_at(op, 3);
                let vf = alu::sub(self.reg(reg), 1, false);
                self.set_reg_from_alu(reg, vf, INC_DEC_N1);
            }
            Family::IncHlr => {
                let vf = alu::add(self.read_hl(bus), 1, false);
                self.write_hl_from_alu(bus, vf, INC_DEC_N0);
            }
            Family::DecHlr => {
                let vf = alu::sub(self.read_hl(bus), 1, false);
                self.write_hl_from_alu(bus, vf, INC_DEC_N1);
            }
            Family::IncR16Sp => {
                let value = self.reg16_sp(pair(op)).wrapping_add(1);
                self.set_reg16_sp(pair(op), value);
            }
            Family::DecR16Sp => {
                let value = self.reg16_sp(pair(op)).wrapping_sub(1);
                self.set_reg16_sp(pair(op), value);
            }
            Family::AddHlR16Sp => {
                let vf = alu::add16_h(self.reg16(Reg16::HL), self.reg16_sp(pair(op)));
                self.set_reg16(Reg16::HL, alu::unpack_value(vf));
                self.combine_alu_flags(vf, [Keep, V0, Alu, Alu]);
            }
            Family::LdHlSpS8 => {
                // 0xE8 is ADD SP,e8 and 0xF8 is LD HL,SP+e8.
                let offset = bits::sign_extend8(self.read8_after_opcode(bus)) as u16;
                let vf = alu::add16_l(self.sp, offset);
                let value = alu::unpack_value(vf);
                if op.encoding & 0b1_0000 != 0 {
                    self.set_reg16(Reg16::HL, value);
                } else {
                    self.sp = value;
                }
                self.combine_alu_flags(vf, [V0, V0, Alu, Alu]);
            }
            Family::Cpl => {
                let value = bits::complement8(self.reg(Reg::A));
                self.set_reg(Reg::A, value);
                self.combine_alu_flags(0, [Keep, V1, V1, Keep]);
            }
            Family::Daa => {
                let vf = alu::bcd_adjust(
                    self.reg(Reg::A),
                    self.flag(Flag::N),
                    self.flag(Flag::H),
                    self.flag(Flag::C),
                );
                self.set_reg_from_alu(Reg::A, vf, [Alu, Keep, V0, Alu]);
            }
            Family::Sccf => {
                // Bit 3 clear is SCF, set is CCF.
                let carry = !bit3(op) || !self.flag(Flag::C);
                let vf = u32::from(mask_znhc(false, false, false, carry));
                self.combine_alu_flags(vf, [Keep, V0, V0, Alu]);
            }
            Family::RotCa => {
                let vf = alu::rotate(rot_dir(op), self.reg(Reg::A));
                self.set_reg_from_alu(Reg::A, vf, ROT_A);
            }
            Family::RotA => {
                let vf = alu::rotate_through_carry(rot_dir(op), self.reg(Reg::A), self.flag(Flag::C));
                self.set_reg_from_alu(Reg::A, vf, ROT_A);
            }
            _ => unreachable!("{:?} is not an ALU operation", op.family),
        }
    }

    /// Right-hand operand of an A-register operation: a register, the byte
    /// after the opcode, or the byte at HL.
    fn alu_operand<B: Bus>(&self, bus: &mut B, op: Opcode) -> u8 {
        match op.family {
            Family::AddAN8
            | Family::SubAN8
            | Family::CpAN8
            | Family::AndAN8
            | Family::OrAN8
            | Family::XorAN8 => self.read8_after_opcode(bus),
            Family::AddAHlr
            | Family::SubAHlr
            | Family::CpAHlr
            | Family::AndAHlr
            | Family::OrAHlr
            | Family::XorAHlr => self.read_hl(bus),
            _ => self.reg(reg_at(op, 0)),
        }
    }
}
