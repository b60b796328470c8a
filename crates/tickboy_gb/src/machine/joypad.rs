use crate::component::Component;
use crate::cpu::{Interrupt, IrqLine};

use super::memory_map::REG_P1;

/// The eight DMG buttons. The first four sit on the direction line, the
/// others on the button line, each in P1 bit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    #[inline]
    fn line(self) -> usize {
        self as usize / 4
    }

    #[inline]
    fn mask(self) -> u8 {
        1 << (self as u8 % 4)
    }
}

const SELECT_DIRECTIONS: u8 = 0x10;
const SELECT_BUTTONS: u8 = 0x20;
const KEY_BITS: u8 = 0x0F;

/// Joypad matrix behind P1 (0xFF00).
///
/// P1 is kept inverted internally so that a set bit means "selected" or
/// "pressed"; reads complement it back to the active-low hardware view.
pub struct Joypad {
    p1: u8,
    lines: [u8; 2],
    irq: IrqLine,
}

impl Joypad {
    pub fn new(irq: IrqLine) -> Self {
        Self {
            p1: 0,
            lines: [0; 2],
            irq,
        }
    }

    pub fn key_pressed(&mut self, button: Button) {
        self.lines[button.line()] |= button.mask();
        self.update_p1();
    }

    pub fn key_released(&mut self, button: Button) {
        self.lines[button.line()] &= !button.mask();
        self.update_p1();
    }

    /// Recomputes the key bits from the selected lines and raises the
    /// joypad interrupt when any of them goes from released to pressed.
    fn update_p1(&mut self) {
        let before = self.p1;
        let mut keys = 0;
        if self.p1 & SELECT_DIRECTIONS != 0 {
            keys |= self.lines[0];
        }
        if self.p1 & SELECT_BUTTONS != 0 {
            keys |= self.lines[1];
        }
        self.p1 = (self.p1 & !KEY_BITS) | keys;
        if (before ^ self.p1) & self.p1 & KEY_BITS != 0 {
            log::trace!("Joypad interrupt, P1=0x{:02X}", !self.p1);
            self.irq.request(Interrupt::Joypad);
        }
    }
}

impl Component for Joypad {
    fn read(&self, address: u16) -> Option<u8> {
        (address == REG_P1).then_some(!self.p1)
    }

    fn write(&mut self, address: u16, data: u8) {
        if address == REG_P1 {
            let select = !data & (SELECT_DIRECTIONS | SELECT_BUTTONS);
            self.p1 = select | (self.p1 & KEY_BITS);
            self.update_p1();
        }
    }
}
