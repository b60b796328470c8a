use std::marker::PhantomData;

use crate::bits::{self, Bit};

/// An enumerated 8-bit register; the index selects its cell in a
/// [`RegisterFile`].
pub trait Register: Copy {
    fn index(self) -> usize;
}

/// Fixed bank of 8-bit registers addressed by an enumerated register type.
#[derive(Clone, Debug)]
pub struct RegisterFile<R, const N: usize> {
    cells: [u8; N],
    _register: PhantomData<R>,
}

impl<R: Register, const N: usize> Default for RegisterFile<R, N> {
    fn default() -> Self {
        Self {
            cells: [0; N],
            _register: PhantomData,
        }
    }
}

impl<R: Register, const N: usize> RegisterFile<R, N> {
    #[inline]
    pub fn get(&self, reg: R) -> u8 {
        self.cells[reg.index()]
    }

    #[inline]
    pub fn set(&mut self, reg: R, value: u8) {
        self.cells[reg.index()] = value;
    }

    #[inline]
    pub fn test_bit(&self, reg: R, bit: impl Bit) -> bool {
        bits::test_bit(u32::from(self.get(reg)), bit)
    }

    /// Updates a single bit, leaving the others untouched.
    #[inline]
    pub fn set_bit(&mut self, reg: R, bit: impl Bit, value: bool) {
        let updated = bits::set_bit(u32::from(self.get(reg)), bit, value);
        self.set(reg, updated as u8);
    }
}
