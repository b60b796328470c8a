use anyhow::{ensure, Context, Result};

use super::image_line::LcdImageLine;

/// A complete frame: `height` lines of `width` pixels each.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LcdImage {
    width: usize,
    height: usize,
    lines: Vec<LcdImageLine>,
}

impl LcdImage {
    pub fn new(width: usize, height: usize, lines: Vec<LcdImageLine>) -> Result<Self> {
        ensure!(
            lines.len() == height,
            "image needs {height} lines, got {}",
            lines.len()
        );
        ensure!(
            lines.iter().all(|line| line.size() == width),
            "every image line must be {width} pixels wide"
        );
        Ok(Self {
            width,
            height,
            lines,
        })
    }

    /// An all-white (colour 0) image.
    pub fn blank(width: usize, height: usize) -> Result<Self> {
        LcdImageBuilder::new(width, height).map(LcdImageBuilder::build)
    }

    pub fn builder(width: usize, height: usize) -> Result<LcdImageBuilder> {
        LcdImageBuilder::new(width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn line(&self, y: usize) -> Option<&LcdImageLine> {
        self.lines.get(y)
    }

    /// Colour index (0 to 3) of the pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<u8> {
        ensure!(x < self.width, "x {x} outside 0..{}", self.width);
        self.line(y)
            .with_context(|| format!("y {y} outside 0..{}", self.height))?
            .color(x)
    }
}

/// Accumulates the lines of the next frame; unset lines stay blank.
#[derive(Debug)]
pub struct LcdImageBuilder {
    width: usize,
    lines: Vec<LcdImageLine>,
}

impl LcdImageBuilder {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let blank = LcdImageLine::blank(width)?;
        Ok(Self {
            width,
            lines: vec![blank; height],
        })
    }

    pub fn set_line(&mut self, y: usize, line: LcdImageLine) -> Result<&mut Self> {
        ensure!(
            line.size() == self.width,
            "line of {} pixels in a {} pixel wide image",
            line.size(),
            self.width
        );
        let height = self.lines.len();
        let slot = self
            .lines
            .get_mut(y)
            .with_context(|| format!("line {y} outside 0..{height}"))?;
        *slot = line;
        Ok(self)
    }

    pub fn build(self) -> LcdImage {
        LcdImage {
            width: self.width,
            height: self.lines.len(),
            lines: self.lines,
        }
    }
}
