use anyhow::{ensure, Result};

use crate::bits::{BitVector, BitVectorBuilder};

/// Palette byte that maps every colour onto itself.
const IDENTITY_PALETTE: u8 = 0b11_10_01_00;

/// One row of pixels stored as three bitplanes.
///
/// Pixel `i` has colour `(msb[i] << 1) | lsb[i]`; `opacity[i]` tells whether
/// it covers whatever lies below when lines are composited.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LcdImageLine {
    msb: BitVector,
    lsb: BitVector,
    opacity: BitVector,
}

impl LcdImageLine {
    pub fn new(msb: BitVector, lsb: BitVector, opacity: BitVector) -> Result<Self> {
        ensure!(
            msb.size() == lsb.size() && msb.size() == opacity.size(),
            "bitplane sizes differ: {}, {}, {}",
            msb.size(),
            lsb.size(),
            opacity.size()
        );
        Ok(Self { msb, lsb, opacity })
    }

    /// A line whose opaque pixels are exactly the non-zero colours.
    pub fn from_planes(msb: BitVector, lsb: BitVector) -> Result<Self> {
        let opacity = msb.or(&lsb)?;
        Self::new(msb, lsb, opacity)
    }

    /// A fully transparent line of colour 0.
    pub fn blank(width: usize) -> Result<Self> {
        let zeros = BitVector::zeros(width)?;
        Ok(Self {
            msb: zeros.clone(),
            lsb: zeros.clone(),
            opacity: zeros,
        })
    }

    pub fn builder(size: usize) -> Result<LcdImageLineBuilder> {
        LcdImageLineBuilder::new(size)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.msb.size()
    }

    pub fn opacity(&self) -> &BitVector {
        &self.opacity
    }

    /// Colour index of pixel `x`.
    pub fn color(&self, x: usize) -> Result<u8> {
        let high = u8::from(self.msb.test_bit(x)?);
        let low = u8::from(self.lsb.test_bit(x)?);
        Ok((high << 1) | low)
    }

    /// Moves every plane by `distance` pixels; positive moves right.
    pub fn shift(&self, distance: isize) -> Self {
        Self {
            msb: self.msb.shift(distance),
            lsb: self.lsb.shift(distance),
            opacity: self.opacity.shift(distance),
        }
    }

    pub fn extract_wrapped(&self, start: isize, size: usize) -> Result<Self> {
        Ok(Self {
            msb: self.msb.extract_wrapped(start, size)?,
            lsb: self.lsb.extract_wrapped(start, size)?,
            opacity: self.opacity.extract_wrapped(start, size)?,
        })
    }

    /// Remaps colours through a DMG palette byte: colour `c` becomes bits
    /// `2c+1..2c` of `palette`. Opacity is unchanged.
    pub fn map_colors(&self, palette: u8) -> Result<Self> {
        if palette == IDENTITY_PALETTE {
            return Ok(self.clone());
        }

        let not_msb = self.msb.not();
        let not_lsb = self.lsb.not();
        let selectors = [
            not_msb.and(&not_lsb)?,
            not_msb.and(&self.lsb)?,
            self.msb.and(&not_lsb)?,
            self.msb.and(&self.lsb)?,
        ];

        let mut msb = BitVector::zeros(self.size())?;
        let mut lsb = BitVector::zeros(self.size())?;
        for (color, selector) in selectors.iter().enumerate() {
            let mapped = palette >> (2 * color);
            if mapped & 0b01 != 0 {
                lsb = lsb.or(selector)?;
            }
            if mapped & 0b10 != 0 {
                msb = msb.or(selector)?;
            }
        }
        Self::new(msb, lsb, self.opacity.clone())
    }

    /// Composites `above` over this line, using the opacity of `above`.
    pub fn below(&self, above: &Self) -> Result<Self> {
        self.below_with_opacity(above, &above.opacity)
    }

    /// Composites `above` over this line; pixels set in `opacity` come from
    /// `above`, the others from this line.
    pub fn below_with_opacity(&self, above: &Self, opacity: &BitVector) -> Result<Self> {
        ensure!(
            above.size() == self.size() && opacity.size() == self.size(),
            "cannot composite lines of sizes {}, {} with opacity {}",
            self.size(),
            above.size(),
            opacity.size()
        );
        let transparent = opacity.not();
        let pick = |top: &BitVector, bottom: &BitVector| -> Result<BitVector> {
            top.and(opacity)?.or(&bottom.and(&transparent)?)
        };
        Self::new(
            pick(&above.msb, &self.msb)?,
            pick(&above.lsb, &self.lsb)?,
            pick(&above.opacity, &self.opacity)?,
        )
    }

    /// The first `size` pixels of this line followed by the rest of `that`.
    pub fn join(&self, size: usize, that: &Self) -> Result<Self> {
        ensure!(
            that.size() == self.size(),
            "cannot join lines of sizes {} and {}",
            self.size(),
            that.size()
        );
        ensure!(
            size <= self.size(),
            "join point {size} past line end {}",
            self.size()
        );
        let keep = (self.size() - size) as isize;
        let mask = BitVector::new(self.size(), true)?.shift(keep).shift(-keep);
        that.below_with_opacity(self, &mask)
    }
}

/// Builds an [`LcdImageLine`] eight pixels at a time.
#[derive(Debug)]
pub struct LcdImageLineBuilder {
    msb: BitVectorBuilder,
    lsb: BitVectorBuilder,
}

impl LcdImageLineBuilder {
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            msb: BitVector::builder(size)?,
            lsb: BitVector::builder(size)?,
        })
    }

    /// Sets pixels `8 * index .. 8 * index + 8`, least significant bit on the left.
    pub fn set_bytes(&mut self, index: usize, msb: u8, lsb: u8) -> Result<&mut Self> {
        self.msb.set_byte(index, msb)?;
        self.lsb.set_byte(index, lsb)?;
        Ok(self)
    }

    pub fn build(self) -> Result<LcdImageLine> {
        LcdImageLine::from_planes(self.msb.build(), self.lsb.build())
    }
}
