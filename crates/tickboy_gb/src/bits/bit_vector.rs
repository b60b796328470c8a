use std::fmt;

use anyhow::{ensure, Result};

const WORD_BITS: usize = 32;

/// Immutable, fixed-size vector of bits stored as 32-bit words.
///
/// Bit `i` lives in word `i / 32` at position `i % 32`. The size is always a
/// positive multiple of 32, so every word is fully used.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Box<[u32]>,
}

impl BitVector {
    /// A vector of `size` bits, all set to `init`.
    pub fn new(size: usize, init: bool) -> Result<Self> {
        check_size(size)?;
        let fill = if init { u32::MAX } else { 0 };
        Ok(Self {
            words: vec![fill; size / WORD_BITS].into_boxed_slice(),
        })
    }

    /// A vector of `size` cleared bits.
    pub fn zeros(size: usize) -> Result<Self> {
        Self::new(size, false)
    }

    pub fn builder(size: usize) -> Result<BitVectorBuilder> {
        BitVectorBuilder::new(size)
    }

    fn from_words(words: Vec<u32>) -> Self {
        Self {
            words: words.into_boxed_slice(),
        }
    }

    /// Number of bits in the vector.
    #[inline]
    pub fn size(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    pub fn test_bit(&self, index: usize) -> Result<bool> {
        ensure!(
            index < self.size(),
            "bit index {index} out of range 0..{}",
            self.size()
        );
        Ok(self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        Self::from_words(self.words.iter().map(|w| !w).collect())
    }

    pub fn and(&self, that: &Self) -> Result<Self> {
        self.zip_with(that, |a, b| a & b)
    }

    pub fn or(&self, that: &Self) -> Result<Self> {
        self.zip_with(that, |a, b| a | b)
    }

    fn zip_with(&self, that: &Self, op: impl Fn(u32, u32) -> u32) -> Result<Self> {
        ensure!(
            self.size() == that.size(),
            "bit vector sizes differ: {} vs {}",
            self.size(),
            that.size()
        );
        Ok(Self::from_words(
            self.words
                .iter()
                .zip(that.words.iter())
                .map(|(&a, &b)| op(a, b))
                .collect(),
        ))
    }

    /// The `size` bits starting at `start` of the infinite zero-extension of
    /// this vector. `start` may be negative or past the end.
    pub fn extract_zero_extended(&self, start: isize, size: usize) -> Result<Self> {
        self.extract(start, size, false)
    }

    /// The `size` bits starting at `start` of the infinite periodic
    /// repetition of this vector.
    pub fn extract_wrapped(&self, start: isize, size: usize) -> Result<Self> {
        self.extract(start, size, true)
    }

    /// Logical shift; positive distances move bits towards higher indices.
    pub fn shift(&self, distance: isize) -> Self {
        let words = (0..self.words.len())
            .map(|i| self.extract_word((i * WORD_BITS) as isize - distance, false))
            .collect();
        Self::from_words(words)
    }

    fn extract(&self, start: isize, size: usize, wrapped: bool) -> Result<Self> {
        check_size(size)?;
        let words = (0..size / WORD_BITS)
            .map(|i| self.extract_word(start + (i * WORD_BITS) as isize, wrapped))
            .collect();
        Ok(Self::from_words(words))
    }

    /// The 32 bits starting at bit `start` of the extension.
    fn extract_word(&self, start: isize, wrapped: bool) -> u32 {
        let index = start.div_euclid(WORD_BITS as isize);
        let offset = start.rem_euclid(WORD_BITS as isize) as u32;
        let low = self.word_at(index, wrapped);
        if offset == 0 {
            low
        } else {
            let high = self.word_at(index + 1, wrapped);
            (low >> offset) | (high << (WORD_BITS as u32 - offset))
        }
    }

    fn word_at(&self, index: isize, wrapped: bool) -> u32 {
        let len = self.words.len() as isize;
        if wrapped {
            self.words[index.rem_euclid(len) as usize]
        } else if (0..len).contains(&index) {
            self.words[index as usize]
        } else {
            0
        }
    }
}

/// Renders the bits from the most significant down to bit 0.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.words.iter().rev() {
            write!(f, "{word:032b}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({self})")
    }
}

/// Byte-wise builder for a [`BitVector`]; byte `i` covers bits `8i..8i+8`.
#[derive(Debug)]
pub struct BitVectorBuilder {
    words: Vec<u32>,
}

impl BitVectorBuilder {
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Self {
            words: vec![0; size / WORD_BITS],
        })
    }

    pub fn set_byte(&mut self, index: usize, value: u8) -> Result<&mut Self> {
        let byte_count = self.words.len() * 4;
        ensure!(
            index < byte_count,
            "byte index {index} out of range 0..{byte_count}"
        );
        let shift = (index % 4) * 8;
        let word = &mut self.words[index / 4];
        *word = (*word & !(0xFF << shift)) | (u32::from(value) << shift);
        Ok(self)
    }

    pub fn build(self) -> BitVector {
        BitVector::from_words(self.words)
    }
}

fn check_size(size: usize) -> Result<()> {
    ensure!(
        size > 0 && size % WORD_BITS == 0,
        "bit vector size {size} must be a positive multiple of {WORD_BITS}"
    );
    Ok(())
}
