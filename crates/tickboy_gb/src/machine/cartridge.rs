mod mbc1;

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};

use crate::component::Component;

use super::memory_map::{ROM_END, ROM_START};

pub use mbc1::Mbc1;

const CARTRIDGE_TYPE: usize = 0x147;
const RAM_SIZE: usize = 0x149;
/// External RAM sizes for the header codes 0 to 3.
const RAM_SIZES: [usize; 4] = [0, 2048, 8192, 32768];

/// A cartridge with its memory bank controller.
pub enum Cartridge {
    RomOnly(Mbc0),
    Mbc1(Mbc1),
}

impl Cartridge {
    /// Builds the cartridge described by the header of `rom`.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self> {
        ensure!(rom.len() > RAM_SIZE, "ROM too short for a header: {} bytes", rom.len());
        let kind = rom[CARTRIDGE_TYPE];
        let cartridge = match kind {
            0 => Cartridge::RomOnly(Mbc0::new(rom)?),
            1..=3 => {
                let code = rom[RAM_SIZE];
                let Some(&ram_size) = RAM_SIZES.get(usize::from(code)) else {
                    bail!("unsupported RAM size code {code:#04X}");
                };
                Cartridge::Mbc1(Mbc1::new(rom, ram_size)?)
            }
            _ => bail!("unsupported cartridge type {kind:#04X}"),
        };
        log::info!("Loaded cartridge type 0x{:02X}", kind);
        Ok(cartridge)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rom = std::fs::read(path)
            .with_context(|| format!("failed to read ROM {}", path.display()))?;
        Self::from_rom(rom)
    }
}

impl Component for Cartridge {
    fn read(&self, address: u16) -> Option<u8> {
        match self {
            Cartridge::RomOnly(mbc) => mbc.read(address),
            Cartridge::Mbc1(mbc) => mbc.read(address),
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match self {
            Cartridge::RomOnly(mbc) => mbc.write(address, data),
            Cartridge::Mbc1(mbc) => mbc.write(address, data),
        }
    }
}

/// A plain 32 KiB ROM without banking or external RAM.
pub struct Mbc0 {
    rom: Box<[u8]>,
}

impl Mbc0 {
    pub const ROM_SIZE: usize = 0x8000;

    pub fn new(rom: Vec<u8>) -> Result<Self> {
        ensure!(
            rom.len() == Self::ROM_SIZE,
            "ROM-only cartridge must be {} bytes, got {}",
            Self::ROM_SIZE,
            rom.len()
        );
        Ok(Self {
            rom: rom.into_boxed_slice(),
        })
    }
}

impl Component for Mbc0 {
    fn read(&self, address: u16) -> Option<u8> {
        (ROM_START..ROM_END)
            .contains(&address)
            .then(|| self.rom[usize::from(address - ROM_START)])
    }

    fn write(&mut self, _address: u16, _data: u8) {}
}
