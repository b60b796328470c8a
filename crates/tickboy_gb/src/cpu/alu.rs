//! Pure arithmetic/logic unit.
//!
//! Every operation returns a packed `u32`: the result value shifted left by
//! eight, OR-ed with a flag byte laid out as `Z N H C 0 0 0 0`. Use
//! [`unpack_value`] and [`unpack_flags`] to split it again.

use anyhow::{ensure, Result};

use crate::bits::Bit;

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    C = 4,
    H = 5,
    N = 6,
    Z = 7,
}

impl Bit for Flag {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotDir {
    Left,
    Right,
}

/// Flag byte with the given Z, N, H, C values.
#[inline]
pub fn mask_znhc(z: bool, n: bool, h: bool, c: bool) -> u8 {
    (u8::from(z) << 7) | (u8::from(n) << 6) | (u8::from(h) << 5) | (u8::from(c) << 4)
}

#[inline]
fn pack(value: u32, z: bool, n: bool, h: bool, c: bool) -> u32 {
    (value << 8) | u32::from(mask_znhc(z, n, h, c))
}

#[inline]
pub fn unpack_value(vf: u32) -> u16 {
    (vf >> 8) as u16
}

#[inline]
pub fn unpack_flags(vf: u32) -> u8 {
    vf as u8
}

/// `l + r + carry_in`.
pub fn add(l: u8, r: u8, carry_in: bool) -> u32 {
    let c0 = u32::from(carry_in);
    let (l, r) = (u32::from(l), u32::from(r));
    let half = (l & 0xF) + (r & 0xF) + c0 > 0xF;
    let sum = l + r + c0;
    let value = sum & 0xFF;
    pack(value, value == 0, false, half, sum > 0xFF)
}

/// 16-bit sum whose H and C flags come from the low byte.
pub fn add16_l(l: u16, r: u16) -> u32 {
    let value = u32::from(l.wrapping_add(r));
    let half = (l & 0xF) + (r & 0xF) > 0xF;
    let carry = (l & 0xFF) + (r & 0xFF) > 0xFF;
    pack(value, false, false, half, carry)
}

/// 16-bit sum whose H and C flags come from the high byte.
pub fn add16_h(l: u16, r: u16) -> u32 {
    let value = u32::from(l.wrapping_add(r));
    let half = (l & 0xFFF) + (r & 0xFFF) > 0xFFF;
    let carry = u32::from(l) + u32::from(r) > 0xFFFF;
    pack(value, false, false, half, carry)
}

/// `l - r - borrow_in`.
pub fn sub(l: u8, r: u8, borrow_in: bool) -> u32 {
    let b0 = i32::from(borrow_in);
    let (l, r) = (i32::from(l), i32::from(r));
    let half = (l & 0xF) - (r & 0xF) - b0 < 0;
    let diff = l - r - b0;
    let value = (diff & 0xFF) as u32;
    pack(value, value == 0, true, half, diff < 0)
}

/// Decimal adjustment after a BCD addition (`n == false`) or subtraction.
pub fn bcd_adjust(v: u8, n: bool, h: bool, c: bool) -> u32 {
    let fix_l = h || (!n && v & 0xF > 9);
    let fix_h = c || (!n && v > 0x99);
    let fix = 0x60 * u8::from(fix_h) + 0x06 * u8::from(fix_l);
    let value = if n { v.wrapping_sub(fix) } else { v.wrapping_add(fix) };
    pack(u32::from(value), value == 0, n, false, fix_h)
}

pub fn and(l: u8, r: u8) -> u32 {
    let value = l & r;
    pack(u32::from(value), value == 0, false, true, false)
}

pub fn or(l: u8, r: u8) -> u32 {
    let value = l | r;
    pack(u32::from(value), value == 0, false, false, false)
}

pub fn xor(l: u8, r: u8) -> u32 {
    let value = l ^ r;
    pack(u32::from(value), value == 0, false, false, false)
}

pub fn shift_left(v: u8) -> u32 {
    let value = v << 1;
    pack(u32::from(value), value == 0, false, false, v & 0x80 != 0)
}

/// Arithmetic right shift; bit 7 is preserved.
pub fn shift_right_a(v: u8) -> u32 {
    let value = (v >> 1) | (v & 0x80);
    pack(u32::from(value), value == 0, false, false, v & 1 != 0)
}

/// Logical right shift.
pub fn shift_right_l(v: u8) -> u32 {
    let value = v >> 1;
    pack(u32::from(value), value == 0, false, false, v & 1 != 0)
}

/// Rotates `v` by one bit; C receives the bit that wrapped around.
pub fn rotate(dir: RotDir, v: u8) -> u32 {
    let value = v.rotate_left(if dir == RotDir::Left { 1 } else { 7 });
    let carry = match dir {
        RotDir::Left => v & 0x80 != 0,
        RotDir::Right => v & 1 != 0,
    };
    pack(u32::from(value), value == 0, false, false, carry)
}

/// Rotates the 9-bit value formed by `c` and `v` by one bit.
pub fn rotate_through_carry(dir: RotDir, v: u8, c: bool) -> u32 {
    let (value, carry) = match dir {
        RotDir::Left => ((v << 1) | u8::from(c), v & 0x80 != 0),
        RotDir::Right => ((v >> 1) | (u8::from(c) << 7), v & 1 != 0),
    };
    pack(u32::from(value), value == 0, false, false, carry)
}

/// Exchanges the two nibbles of `v`.
pub fn swap(v: u8) -> u32 {
    let value = v.rotate_left(4);
    pack(u32::from(value), value == 0, false, false, false)
}

/// Packed result with value 0 and flags `Z 0 1 0`, Z set when bit `index`
/// of `v` is clear.
pub fn test_bit(v: u8, index: u8) -> Result<u32> {
    ensure!(index < 8, "bit index {index} out of range 0..8");
    Ok(pack(0, v & (1 << index) == 0, false, true, false))
}
