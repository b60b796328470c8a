//! Timer / divider unit (DIV, TIMA, TMA, TAC).
//!
//! A 16-bit main counter advances by 4 every machine cycle; DIV exposes its
//! upper byte. TIMA increments on every falling edge of the selected counter
//! bit ANDed with the TAC enable bit, so writes to DIV or TAC can produce an
//! extra increment too.

use crate::component::Component;
use crate::cpu::{Interrupt, IrqLine};

use super::memory_map::{REG_DIV, REG_TAC, REG_TIMA, REG_TMA};

const TAC_ENABLE: u8 = 0b100;
/// Counter bit watched for each TAC clock select value.
const COUNTER_BIT: [u16; 4] = [9, 3, 5, 7];

pub struct Timer {
    main_counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    irq: IrqLine,
}

impl Timer {
    pub fn new(irq: IrqLine) -> Self {
        Self {
            main_counter: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            irq,
        }
    }

    /// Advances the timer by one machine cycle.
    pub fn cycle(&mut self, _cycle: u64) {
        let before = self.state();
        self.main_counter = self.main_counter.wrapping_add(4);
        self.inc_if_change(before);
    }

    /// The timer input: the enable bit ANDed with the selected counter bit.
    fn state(&self) -> bool {
        let bit = COUNTER_BIT[usize::from(self.tac & 0b11)];
        self.tac & TAC_ENABLE != 0 && self.main_counter & (1 << bit) != 0
    }

    fn inc_if_change(&mut self, before: bool) {
        if before && !self.state() {
            if self.tima == 0xFF {
                log::trace!("TIMA overflow, reloading 0x{:02X}", self.tma);
                self.irq.request(Interrupt::Timer);
                self.tima = self.tma;
            } else {
                self.tima += 1;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn main_counter(&self) -> u16 {
        self.main_counter
    }
}

impl Component for Timer {
    fn read(&self, address: u16) -> Option<u8> {
        match address {
            REG_DIV => Some((self.main_counter >> 8) as u8),
            REG_TIMA => Some(self.tima),
            REG_TMA => Some(self.tma),
            REG_TAC => Some(self.tac),
            _ => None,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            REG_DIV => {
                let before = self.state();
                self.main_counter = 0;
                self.inc_if_change(before);
            }
            REG_TIMA => self.tima = data,
            REG_TMA => self.tma = data,
            REG_TAC => {
                let before = self.state();
                self.tac = data & 0b111;
                self.inc_if_change(before);
            }
            _ => {}
        }
    }
}
