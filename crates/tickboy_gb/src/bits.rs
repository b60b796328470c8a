//! Bit-level helpers shared by the CPU, the LCD controller and the
//! peripherals.
//!
//! All functions operate on `u32` "bit bags" unless the operation is
//! inherently 8- or 16-bit. Index and size arguments are validated and
//! reported through `anyhow` errors; operations whose argument types already
//! rule out bad input are infallible.

mod bit_vector;

pub use bit_vector::{BitVector, BitVectorBuilder};

use anyhow::{ensure, Result};

/// An enumerated bit position inside a register or a flag byte.
///
/// Implementors are plain C-like enums whose discriminant order matches the
/// bit order (e.g. `Interrupt`, `Flag`).
pub trait Bit: Copy {
    /// Position of this bit, counted from the least significant bit.
    fn index(self) -> u32;

    #[inline]
    fn mask(self) -> u32 {
        1 << self.index()
    }
}

/// Bit mask with only bit `index` set.
pub fn mask(index: u32) -> Result<u32> {
    ensure!(index < 32, "bit index {index} out of range 0..32");
    Ok(1 << index)
}

/// Value of bit `index` in `bits`.
pub fn test(bits: u32, index: u32) -> Result<bool> {
    Ok(bits & mask(index)? != 0)
}

#[inline]
pub fn test_bit(bits: u32, bit: impl Bit) -> bool {
    bits & bit.mask() != 0
}

/// `bits` with bit `index` forced to `value`.
pub fn set(bits: u32, index: u32, value: bool) -> Result<u32> {
    let m = mask(index)?;
    Ok(if value { bits | m } else { bits & !m })
}

#[inline]
pub fn set_bit(bits: u32, bit: impl Bit, value: bool) -> u32 {
    if value {
        bits | bit.mask()
    } else {
        bits & !bit.mask()
    }
}

/// Keeps the `size` low bits of `bits`, clearing the others.
pub fn clip(size: u32, bits: u32) -> Result<u32> {
    ensure!(size <= 32, "clip size {size} out of range 0..=32");
    Ok(low_mask(size) & bits)
}

/// The `size` bits of `bits` starting at `start`, moved down to bit 0.
pub fn extract(bits: u32, start: u32, size: u32) -> Result<u32> {
    ensure!(
        start <= 32 && size <= 32 - start,
        "extract range {start}+{size} out of range 0..=32"
    );
    Ok(low_mask(size) & bits.checked_shr(start).unwrap_or(0))
}

/// Rotates the `size` low bits of `bits` by `distance`; positive distances
/// rotate left, negative ones rotate right.
pub fn rotate(size: u32, bits: u32, distance: i32) -> Result<u32> {
    ensure!(
        size > 0 && size <= 32,
        "rotation size {size} out of range 1..=32"
    );
    ensure!(
        size == 32 || bits >> size == 0,
        "value {bits:#X} does not fit in {size} bits"
    );
    let d = distance.rem_euclid(size as i32) as u32;
    let wide = u64::from(bits);
    let rotated = (wide << d) | (wide >> (size - d));
    Ok(rotated as u32 & low_mask(size))
}

/// Sign-extends a byte to a full 32-bit pattern.
#[inline]
pub fn sign_extend8(b: u8) -> u32 {
    b as i8 as i32 as u32
}

/// Mirrors the bit order of a byte (bit 0 becomes bit 7 and so on).
#[inline]
pub fn reverse8(b: u8) -> u8 {
    REVERSED[b as usize]
}

#[inline]
pub fn complement8(b: u8) -> u8 {
    !b
}

/// Builds a 16-bit value from its high and low bytes.
#[inline]
pub fn make16(high: u8, low: u8) -> u16 {
    u16::from_be_bytes([high, low])
}

#[inline]
fn low_mask(size: u32) -> u32 {
    if size >= 32 {
        u32::MAX
    } else {
        (1 << size) - 1
    }
}

const REVERSED: [u8; 256] = reverse_table();

const fn reverse_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut b = i as u8;
        let mut r = 0u8;
        let mut n = 0;
        while n < 8 {
            r = (r << 1) | (b & 1);
            b >>= 1;
            n += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests;
