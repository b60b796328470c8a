use std::ops::Range;

use anyhow::{ensure, Result};

use crate::component::Component;

/// Plain byte-addressed memory, zero-filled at creation.
#[derive(Clone, Debug)]
pub struct Ram {
    data: Box<[u8]>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Panics if `index` is past the end.
    #[inline]
    pub fn read(&self, index: usize) -> u8 {
        self.data[index]
    }

    #[inline]
    pub fn write(&mut self, index: usize, value: u8) {
        self.data[index] = value;
    }

    #[cfg(test)]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Maps a [`Ram`] onto a window of the address space, optionally with a
/// second "echo" window that mirrors the start of it.
#[derive(Debug)]
pub struct RamController {
    ram: Ram,
    window: Range<u32>,
    echo: Option<Range<u32>>,
}

impl RamController {
    /// Maps the whole of `ram` from `start`.
    pub fn new(ram: Ram, start: u16) -> Result<Self> {
        let end = u32::from(start) + ram.size() as u32;
        Self::with_range(ram, start, end)
    }

    /// Maps `start..end` onto the beginning of `ram`.
    pub fn with_range(ram: Ram, start: u16, end: u32) -> Result<Self> {
        let start = u32::from(start);
        ensure!(
            start <= end && end <= 0x1_0000,
            "invalid RAM window {start:#06X}..{end:#06X}"
        );
        ensure!(
            (end - start) as usize <= ram.size(),
            "RAM window {start:#06X}..{end:#06X} exceeds {} bytes",
            ram.size()
        );
        Ok(Self {
            ram,
            window: start..end,
            echo: None,
        })
    }

    /// Mirrors `start..end` onto the beginning of the RAM as well.
    pub fn with_echo(mut self, start: u16, end: u16) -> Result<Self> {
        let echo = u32::from(start)..u32::from(end);
        ensure!(
            echo.len() <= self.window.len(),
            "echo window {start:#06X}..{end:#06X} larger than the RAM window"
        );
        self.echo = Some(echo);
        Ok(self)
    }

    #[cfg(test)]
    pub(crate) fn ram(&self) -> &Ram {
        &self.ram
    }

    fn offset(&self, address: u16) -> Option<usize> {
        let address = u32::from(address);
        if self.window.contains(&address) {
            Some((address - self.window.start) as usize)
        } else {
            match &self.echo {
                Some(echo) if echo.contains(&address) => Some((address - echo.start) as usize),
                _ => None,
            }
        }
    }
}

impl Component for RamController {
    fn read(&self, address: u16) -> Option<u8> {
        self.offset(address).map(|i| self.ram.read(i))
    }

    fn write(&mut self, address: u16, data: u8) {
        if let Some(i) = self.offset(address) {
            self.ram.write(i, data);
        }
    }
}
