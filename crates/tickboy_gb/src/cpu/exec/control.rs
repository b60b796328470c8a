use super::super::alu::Flag;
use super::super::opcode::{Family, Opcode};
use super::super::regs::{Condition, Reg16};
use super::super::{Bus, Cpu, Flow};
use super::{bit3, bit_index};
use crate::bits;

impl Cpu {
    /// Jumps, calls, returns and the IME instructions.
    pub(super) fn exec_control<B: Bus>(&mut self, bus: &mut B, op: Opcode, next_pc: u16) -> Flow {
        match op.family {
            Family::JpHl => Flow::Jump(self.reg16(Reg16::HL)),
            Family::JpN16 => Flow::Jump(self.read16_after_opcode(bus)),
            Family::JpCcN16 => {
                let target = self.read16_after_opcode(bus);
                self.branch_if(op, target)
            }
            Family::JrE8 => Flow::Jump(relative_target(next_pc, self.read8_after_opcode(bus))),
            Family::JrCcE8 => {
                let target = relative_target(next_pc, self.read8_after_opcode(bus));
                self.branch_if(op, target)
            }
            Family::CallN16 => {
                let target = self.read16_after_opcode(bus);
                self.push16(bus, next_pc);
                Flow::Jump(target)
            }
            Family::CallCcN16 => {
                let target = self.read16_after_opcode(bus);
                match self.branch_if(op, target) {
                    Flow::Taken(target) => {
                        self.push16(bus, next_pc);
                        Flow::Taken(target)
                    }
                    flow => flow,
                }
            }
            Family::RstU3 => {
                self.push16(bus, next_pc);
                Flow::Jump(8 * u16::from(bit_index(op)))
            }
            Family::Ret => Flow::Jump(self.pop16(bus)),
            Family::RetCc => {
                if self.condition(op) {
                    Flow::Taken(self.pop16(bus))
                } else {
                    Flow::Next
                }
            }
            Family::Edi => {
                // 0xF3 is DI, 0xFB is EI.
                self.ime = bit3(op);
                Flow::Next
            }
            Family::Reti => {
                self.ime = true;
                Flow::Jump(self.pop16(bus))
            }
            _ => unreachable!("{:?} is not a control transfer", op.family),
        }
    }

    fn condition(&self, op: Opcode) -> bool {
        match Condition::from_code(op.encoding >> 3) {
            Condition::NotZero => !self.flag(Flag::Z),
            Condition::Zero => self.flag(Flag::Z),
            Condition::NotCarry => !self.flag(Flag::C),
            Condition::Carry => self.flag(Flag::C),
        }
    }

    fn branch_if(&self, op: Opcode, target: u16) -> Flow {
        if self.condition(op) {
            Flow::Taken(target)
        } else {
            Flow::Next
        }
    }
}

/// `next_pc` moved by the signed displacement `e8`.
#[inline]
fn relative_target(next_pc: u16, e8: u8) -> u16 {
    next_pc.wrapping_add(bits::sign_extend8(e8) as u16)
}
