use std::cell::Cell;
use std::rc::Rc;

use crate::bits::Bit;
use crate::component::Component;
use crate::machine::memory_map::{REG_IE, REG_IF};

/// Interrupt sources in priority order (lowest bit wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Bit for Interrupt {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Address the CPU jumps to when servicing this interrupt.
    #[inline]
    pub fn vector(self) -> u16 {
        0x40 + 8 * self as u16
    }
}

/// Shared handle on the IF register.
///
/// Peripherals keep a clone and raise their interrupts through it; the
/// [`InterruptController`] exposes the same cell on the bus.
#[derive(Clone, Debug, Default)]
pub struct IrqLine(Rc<Cell<u8>>);

impl IrqLine {
    #[inline]
    pub fn request(&self, interrupt: Interrupt) {
        self.0.set(self.0.get() | interrupt.mask() as u8);
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.0.get()
    }

    #[inline]
    fn set_flags(&self, value: u8) {
        self.0.set(value);
    }
}

/// IE (0xFFFF) and IF (0xFF0F).
#[derive(Debug, Default)]
pub struct InterruptController {
    enable: u8,
    line: IrqLine,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle for a peripheral that raises interrupts.
    pub fn line(&self) -> IrqLine {
        self.line.clone()
    }

    pub fn enabled(&self) -> u8 {
        self.enable
    }

    pub fn requested(&self) -> u8 {
        self.line.flags()
    }
}

impl Component for InterruptController {
    fn read(&self, address: u16) -> Option<u8> {
        match address {
            REG_IE => Some(self.enable),
            REG_IF => Some(self.line.flags()),
            _ => None,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            REG_IE => self.enable = data,
            REG_IF => self.line.set_flags(data),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_follow_priority() {
        let vectors: Vec<u16> = Interrupt::ALL.iter().map(|i| i.vector()).collect();
        assert_eq!(vectors, vec![0x40, 0x48, 0x50, 0x58, 0x60]);
    }

    #[test]
    fn requests_show_up_in_if() {
        let mut controller = InterruptController::new();
        let line = controller.line();
        line.request(Interrupt::Timer);
        line.request(Interrupt::Joypad);
        assert_eq!(controller.read(REG_IF), Some(0b1_0100));

        controller.write(REG_IF, 0);
        assert_eq!(line.flags(), 0);
        controller.write(REG_IE, 0x1F);
        assert_eq!(controller.read(REG_IE), Some(0x1F));
        assert_eq!(controller.read(0xFF10), None);
    }
}
