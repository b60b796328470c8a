//! Sharp LR35902 core.
//!
//! The CPU is stepped once per machine cycle by the driver. Each instruction
//! executes entirely on its first cycle; the CPU then idles until the cycle
//! at which the instruction would have finished on hardware.

pub mod alu;
mod bus;
mod exec;
mod interrupts;
pub mod opcode;
mod regs;

use anyhow::{bail, Result};

use crate::bits::{self, Bit};
use crate::machine::memory_map::{REG_IE, REG_IF};
use crate::register_file::RegisterFile;

pub use alu::Flag;
pub use bus::Bus;
pub use interrupts::{Interrupt, InterruptController, IrqLine};
use opcode::{Kind, Opcode};
pub use regs::{Reg, Reg16};

/// "No cycle scheduled": the CPU is halted until an interrupt is pending.
pub const NEVER: u64 = u64::MAX;

const PREFIX: u8 = 0xCB;
/// Machine cycles spent jumping to an interrupt handler.
const INTERRUPT_CYCLES: u64 = 5;
const INTERRUPT_MASK: u8 = 0x1F;

pub struct Cpu {
    regs: RegisterFile<Reg, 8>,
    pc: u16,
    sp: u16,
    ime: bool,
    next_active_cycle: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU with every register cleared, scheduled to run from cycle 0.
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::default(),
            pc: 0,
            sp: 0,
            ime: false,
            next_active_cycle: 0,
        }
    }

    /// Initialize registers to match the DMG boot ROM's state after it
    /// hands control to cartridge code.
    pub fn set_post_boot_state(&mut self) {
        self.regs.set(Reg::A, 0x01);
        self.regs.set(Reg::F, 0xB0);
        self.regs.set(Reg::B, 0x00);
        self.regs.set(Reg::C, 0x13);
        self.regs.set(Reg::D, 0x00);
        self.regs.set(Reg::E, 0xD8);
        self.regs.set(Reg::H, 0x01);
        self.regs.set(Reg::L, 0x4D);
        self.sp = 0xFFFE;
        self.pc = 0x0100;
        self.ime = false;
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    #[inline]
    pub fn sp(&self) -> u16 {
        self.sp
    }

    #[inline]
    pub fn reg(&self, reg: Reg) -> u8 {
        self.regs.get(reg)
    }

    #[inline]
    pub fn reg16(&self, pair: Reg16) -> u16 {
        let (high, low) = pair.halves();
        bits::make16(self.regs.get(high), self.regs.get(low))
    }

    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        self.regs.test_bit(Reg::F, flag)
    }

    #[inline]
    pub fn ime(&self) -> bool {
        self.ime
    }

    /// Whether the CPU is halted waiting for an interrupt.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.next_active_cycle == NEVER
    }

    #[inline]
    pub fn next_active_cycle(&self) -> u64 {
        self.next_active_cycle
    }

    #[inline]
    fn set_reg(&mut self, reg: Reg, value: u8) {
        self.regs.set(reg, value);
    }

    /// Writes a register pair; the low nibble of F always reads as zero.
    fn set_reg16(&mut self, pair: Reg16, value: u16) {
        let [high, low] = value.to_be_bytes();
        let (rh, rl) = pair.halves();
        self.regs.set(rh, high);
        self.regs.set(rl, if pair == Reg16::AF { low & 0xF0 } else { low });
    }

    /// Pair access where the AF slot stands for SP.
    fn reg16_sp(&self, pair: Reg16) -> u16 {
        match pair {
            Reg16::AF => self.sp,
            _ => self.reg16(pair),
        }
    }

    fn set_reg16_sp(&mut self, pair: Reg16, value: u16) {
        match pair {
            Reg16::AF => self.sp = value,
            _ => self.set_reg16(pair, value),
        }
    }

    /// Advances the CPU to machine cycle `cycle`.
    ///
    /// A halted CPU wakes up as soon as an enabled interrupt is requested,
    /// whether or not interrupts are enabled (IME).
    pub fn cycle<B: Bus>(&mut self, cycle: u64, bus: &mut B) -> Result<()> {
        if self.next_active_cycle == NEVER && pending_interrupts(bus) != 0 {
            log::trace!("CPU woken from HALT at cycle {cycle}");
            self.next_active_cycle = cycle;
        }
        if cycle == self.next_active_cycle {
            self.really_cycle(bus)?;
        }
        Ok(())
    }

    fn really_cycle<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        let pending = pending_interrupts(bus);
        if self.ime && pending != 0 {
            self.service_interrupt(bus, pending);
            return Ok(());
        }
        let encoding = bus.read8(self.pc);
        let opcode = if encoding == PREFIX {
            opcode::decode(Kind::Prefixed, bus.read8(self.pc.wrapping_add(1)))
        } else {
            opcode::decode(Kind::Direct, encoding)
        };
        match opcode {
            Some(op) => self.dispatch(bus, op),
            None => {
                log::error!("Invalid opcode 0x{:02X} at 0x{:04X}", encoding, self.pc);
                bail!("invalid opcode {encoding:#04X} at {:#06X}", self.pc)
            }
        }
    }

    /// Jumps to the handler of the highest-priority pending interrupt.
    fn service_interrupt<B: Bus>(&mut self, bus: &mut B, pending: u8) {
        let index = pending.trailing_zeros() as usize;
        let interrupt = Interrupt::ALL[index];
        log::trace!("Servicing {:?} from 0x{:04X}", interrupt, self.pc);
        self.ime = false;
        let flags = bus.read8(REG_IF);
        bus.write8(REG_IF, flags & !(interrupt.mask() as u8));
        self.push16(bus, self.pc);
        self.pc = interrupt.vector();
        self.next_active_cycle += INTERRUPT_CYCLES;
    }

    fn dispatch<B: Bus>(&mut self, bus: &mut B, op: Opcode) -> Result<()> {
        let next_pc = self.pc.wrapping_add(u16::from(op.total_bytes));
        let flow = self.execute(bus, op, next_pc)?;

        let (pc, extra) = match flow {
            Flow::Next => (next_pc, 0),
            Flow::Jump(target) => (target, 0),
            Flow::Taken(target) => (target, op.additional_cycles),
            Flow::Halt => {
                self.pc = next_pc;
                self.next_active_cycle = NEVER;
                return Ok(());
            }
        };
        self.pc = pc;
        self.next_active_cycle += u64::from(op.cycles + extra);
        Ok(())
    }

    fn push16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.sp = self.sp.wrapping_sub(2);
        bus.write16(self.sp, value);
    }

    fn pop16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = bus.read16(self.sp);
        self.sp = self.sp.wrapping_add(2);
        value
    }
}

/// Where execution continues after an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(u16),
    /// A conditional branch that was taken; costs the extra cycles.
    Taken(u16),
    Halt,
}

/// Interrupts both requested and enabled.
fn pending_interrupts<B: Bus>(bus: &mut B) -> u8 {
    bus.read8(REG_IE) & bus.read8(REG_IF) & INTERRUPT_MASK
}

#[cfg(test)]
mod tests;
