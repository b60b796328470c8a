use crate::register_file::Register;

/// 8-bit CPU registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Register for Reg {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl Reg {
    /// Register selected by the 3-bit operand field of an instruction,
    /// ordered B, C, D, E, H, L, (HL), A. Code 6 addresses memory and is
    /// decoded by the `(HL)` instruction families instead.
    #[inline]
    pub(super) fn from_code(code: u8) -> Reg {
        match code & 0b111 {
            0 => Reg::B,
            1 => Reg::C,
            2 => Reg::D,
            3 => Reg::E,
            4 => Reg::H,
            5 => Reg::L,
            _ => Reg::A,
        }
    }
}

/// 16-bit register pairs, high register first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
}

impl Reg16 {
    #[inline]
    pub fn halves(self) -> (Reg, Reg) {
        match self {
            Reg16::AF => (Reg::A, Reg::F),
            Reg16::BC => (Reg::B, Reg::C),
            Reg16::DE => (Reg::D, Reg::E),
            Reg16::HL => (Reg::H, Reg::L),
        }
    }

    /// Pair selected by the 2-bit operand field, ordered BC, DE, HL, AF.
    /// Instructions that address SP read the AF slot as SP.
    #[inline]
    pub(super) fn from_code(code: u8) -> Reg16 {
        match code & 0b11 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::AF,
        }
    }
}

/// Branch conditions, in encoding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Condition {
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl Condition {
    #[inline]
    pub(super) fn from_code(code: u8) -> Condition {
        match code & 0b11 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NotCarry,
            _ => Condition::Carry,
        }
    }
}
