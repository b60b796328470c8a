use super::super::opcode::{Family, Opcode};
use super::super::regs::{Reg, Reg16};
use super::super::{Bus, Cpu};
use super::{hl_increment, pair, reg_at};

/// Base of the `LDH` high page.
const HIGH_PAGE: u16 = 0xFF00;

impl Cpu {
    /// Loads, stores and stack transfers. None of them touch the flags,
    /// except `POP AF` which restores F itself.
    pub(super) fn exec_ld<B: Bus>(&mut self, bus: &mut B, op: Opcode) {
        match op.family {
            Family::LdR8Hlr => {
                let value = self.read_hl(bus);
                self.set_reg(reg_at(op, 3), value);
            }
            Family::LdAHlru => {
                let value = self.read_hl(bus);
                self.set_reg(Reg::A, value);
                self.step_hl(op);
            }
            Family::LdAN8r => {
                let addr = HIGH_PAGE + u16::from(self.read8_after_opcode(bus));
                let value = bus.read8(addr);
                self.set_reg(Reg::A, value);
            }
            Family::LdACr => {
                let value = bus.read8(HIGH_PAGE + u16::from(self.reg(Reg::C)));
                self.set_reg(Reg::A, value);
            }
            Family::LdAN16r => {
                let addr = self.read16_after_opcode(bus);
                let value = bus.read8(addr);
                self.set_reg(Reg::A, value);
            }
            Family::LdABcr => {
                let value = bus.read8(self.reg16(Reg16::BC));
                self.set_reg(Reg::A, value);
            }
            Family::LdADer => {
                let value = bus.read8(self.reg16(Reg16::DE));
                self.set_reg(Reg::A, value);
            }
            Family::LdR8N8 => {
                let value = self.read8_after_opcode(bus);
                self.set_reg(reg_at(op, 3), value);
            }
            Family::LdR16SpN16 => {
                let value = self.read16_after_opcode(bus);
                self.set_reg16_sp(pair(op), value);
            }
            Family::PopR16 => {
                let value = self.pop16(bus);
                self.set_reg16(pair(op), value);
            }
            Family::LdHlrR8 => self.write_hl(bus, self.reg(reg_at(op, 0))),
            Family::LdHlruA => {
                self.write_hl(bus, self.reg(Reg::A));
                self.step_hl(op);
            }
            Family::LdN8rA => {
                let addr = HIGH_PAGE + u16::from(self.read8_after_opcode(bus));
                bus.write8(addr, self.reg(Reg::A));
            }
            Family::LdCrA => {
                bus.write8(HIGH_PAGE + u16::from(self.reg(Reg::C)), self.reg(Reg::A));
            }
            Family::LdN16rA => {
                let addr = self.read16_after_opcode(bus);
                bus.write8(addr, self.reg(Reg::A));
            }
            Family::LdBcrA => bus.write8(self.reg16(Reg16::BC), self.reg(Reg::A)),
            Family::LdDerA => bus.write8(self.reg16(Reg16::DE), self.reg(Reg::A)),
            Family::LdHlrN8 => {
                let value = self.read8_after_opcode(bus);
                self.write_hl(bus, value);
            }
            Family::LdN16rSp => {
                let addr = self.read16_after_opcode(bus);
                bus.write16(addr, self.sp);
            }
            Family::LdR8R8 => {
                let value = self.reg(reg_at(op, 0));
                self.set_reg(reg_at(op, 3), value);
            }
            Family::LdSpHl => self.sp = self.reg16(Reg16::HL),
            Family::PushR16 => {
                let value = self.reg16(pair(op));
                self.push16(bus, value);
            }
            _ => unreachable!("{:?} is not a load", op.family),
        }
    }

    /// Post-increment or post-decrement of HL for `(HL+)` and `(HL-)`.
    fn step_hl(&mut self, op: Opcode) {
        let hl = self.reg16(Reg16::HL).wrapping_add(hl_increment(op));
        self.set_reg16(Reg16::HL, hl);
    }
}
