use anyhow::Result;

use super::super::alu::{self, Flag};
use super::super::opcode::{Family, Opcode};
use super::super::{Bus, Cpu};
use super::{bit_index, reg_at, rot_dir, FlagSrc, SHIFT};

use FlagSrc::{Alu, Cpu as Keep, V0, V1};

impl Cpu {
    /// `0xCB`-prefixed rotations, shifts and single-bit operations.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B, op: Opcode) -> Result<()> {
        match op.family {
            Family::RotCR8 | Family::RotR8 | Family::SlaR8 | Family::SraR8 | Family::SrlR8 => {
                let reg = reg_at(op, 0);
                let vf = self.shift_op(op, self.reg(reg));
                self.set_reg_from_alu(reg, vf, SHIFT);
            }
            Family::RotCHlr | Family::RotHlr | Family::SlaHlr | Family::SraHlr | Family::SrlHlr => {
                let vf = self.shift_op(op, self.read_hl(bus));
                self.write_hl_from_alu(bus, vf, SHIFT);
            }
            Family::SwapR8 => {
                let reg = reg_at(op, 0);
                let vf = alu::swap(self.reg(reg));
                self.set_reg_from_alu(reg, vf, [Alu, V0, V0, V0]);
            }
            Family::SwapHlr => {
                let vf = alu::swap(self.read_hl(bus));
                self.write_hl_from_alu(bus, vf, [Alu, V0, V0, V0]);
            }
            Family::BitU3R8 => {
                let vf = alu::test_bit(self.reg(reg_at(op, 0)), bit_index(op))?;
                self.combine_alu_flags(vf, [Alu, V0, V1, Keep]);
            }
            Family::BitU3Hlr => {
                let vf = alu::test_bit(self.read_hl(bus), bit_index(op))?;
                self.combine_alu_flags(vf, [Alu, V0, V1, Keep]);
            }
            Family::ChgU3R8 => {
                let reg = reg_at(op, 0);
                let value = change_bit(op, self.reg(reg));
                self.set_reg(reg, value);
            }
            Family::ChgU3Hlr => {
                let value = change_bit(op, self.read_hl(bus));
                self.write_hl(bus, value);
            }
            _ => unreachable!("{:?} is not a prefixed operation", op.family),
        }
        Ok(())
    }

    fn shift_op(&self, op: Opcode, value: u8) -> u32 {
        match op.family {
            Family::RotCR8 | Family::RotCHlr => alu::rotate(rot_dir(op), value),
            Family::RotR8 | Family::RotHlr => {
                alu::rotate_through_carry(rot_dir(op), value, self.flag(Flag::C))
            }
            Family::SlaR8 | Family::SlaHlr => alu::shift_left(value),
            Family::SraR8 | Family::SraHlr => alu::shift_right_a(value),
            _ => alu::shift_right_l(value),
        }
    }
}

/// `SET` when bit 6 of the encoding is set, `RES` otherwise.
fn change_bit(op: Opcode, value: u8) -> u8 {
    let mask = 1 << bit_index(op);
    if op.encoding & 0b0100_0000 != 0 {
        value | mask
    } else {
        value & !mask
    }
}
