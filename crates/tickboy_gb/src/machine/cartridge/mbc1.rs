use anyhow::{ensure, Result};

use crate::component::Component;
use crate::machine::memory::Ram;
use crate::machine::memory_map::EXTERNAL_RAM_START;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// MBC1 memory bank controller.
///
/// ROM banking uses the 5-bit bank register plus two high bits; in mode 1
/// the high bits also bank the lower ROM area and external RAM. Battery
/// persistence is not modelled.
pub struct Mbc1 {
    rom: Box<[u8]>,
    ram: Ram,
    rom_bank_low5: u8,
    bank_high2: u8,
    ram_enable: bool,
    banking_mode: u8,
}

impl Mbc1 {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Result<Self> {
        ensure!(
            rom.len() >= 2 * ROM_BANK_SIZE && rom.len() % ROM_BANK_SIZE == 0,
            "MBC1 ROM size {} is not a whole number of banks",
            rom.len()
        );
        log::debug!(
            "MBC1: {} ROM banks, {} bytes of RAM",
            rom.len() / ROM_BANK_SIZE,
            ram_size
        );
        Ok(Self {
            rom: rom.into_boxed_slice(),
            ram: Ram::new(ram_size),
            rom_bank_low5: 1,
            bank_high2: 0,
            ram_enable: false,
            banking_mode: 0,
        })
    }

    fn rom_index(&self, bank: usize, address: u16) -> usize {
        (bank * ROM_BANK_SIZE + (usize::from(address) & (ROM_BANK_SIZE - 1))) % self.rom.len()
    }

    fn ram_index(&self, address: u16) -> Option<usize> {
        if !self.ram_enable || self.ram.size() == 0 {
            return None;
        }
        let bank = if self.banking_mode == 1 {
            usize::from(self.bank_high2)
        } else {
            0
        };
        let offset = usize::from(address - EXTERNAL_RAM_START);
        Some((bank * RAM_BANK_SIZE + offset) % self.ram.size())
    }
}

impl Component for Mbc1 {
    fn read(&self, address: u16) -> Option<u8> {
        match address {
            0x0000..=0x3FFF => {
                let bank = if self.banking_mode == 1 {
                    usize::from(self.bank_high2) << 5
                } else {
                    0
                };
                Some(self.rom[self.rom_index(bank, address)])
            }
            0x4000..=0x7FFF => {
                let bank = (usize::from(self.bank_high2) << 5) | usize::from(self.rom_bank_low5);
                Some(self.rom[self.rom_index(bank, address)])
            }
            0xA000..=0xBFFF => Some(
                self.ram_index(address)
                    .map_or(0xFF, |index| self.ram.read(index)),
            ),
            _ => None,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            0x0000..=0x1FFF => self.ram_enable = data & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.rom_bank_low5 = (data & 0x1F).max(1),
            0x4000..=0x5FFF => self.bank_high2 = data & 0x03,
            0x6000..=0x7FFF => self.banking_mode = data & 0x01,
            0xA000..=0xBFFF => {
                if let Some(index) = self.ram_index(address) {
                    self.ram.write(index, data);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 128 KiB ROM where every byte holds its bank number.
    fn mbc1(ram_size: usize) -> Mbc1 {
        let rom = (0..8 * ROM_BANK_SIZE).map(|i| (i / ROM_BANK_SIZE) as u8).collect();
        Mbc1::new(rom, ram_size).unwrap()
    }

    #[test]
    fn switchable_bank_defaults_to_one() {
        let mut mbc = mbc1(0);
        assert_eq!(mbc.read(0x0000), Some(0));
        assert_eq!(mbc.read(0x4000), Some(1));
        mbc.write(0x2000, 5);
        assert_eq!(mbc.read(0x7FFF), Some(5));
        mbc.write(0x2000, 0);
        assert_eq!(mbc.read(0x4000), Some(1));
    }

    #[test]
    fn out_of_range_banks_wrap() {
        let mut mbc = mbc1(0);
        mbc.write(0x2000, 0x0B);
        assert_eq!(mbc.read(0x4000), Some(3));
    }

    #[test]
    fn ram_needs_enabling() {
        let mut mbc = mbc1(8192);
        mbc.write(0xA000, 0x42);
        assert_eq!(mbc.read(0xA000), Some(0xFF));
        mbc.write(0x0000, 0x0A);
        mbc.write(0xA000, 0x42);
        assert_eq!(mbc.read(0xA000), Some(0x42));
        mbc.write(0x0000, 0x00);
        assert_eq!(mbc.read(0xA000), Some(0xFF));
        assert_eq!(mbc.read(0xC000), None);
    }

    #[test]
    fn mode_one_banks_ram() {
        let mut mbc = mbc1(32768);
        mbc.write(0x0000, 0x0A);
        mbc.write(0x6000, 1);
        mbc.write(0x4000, 2);
        mbc.write(0xA010, 0x77);
        mbc.write(0x4000, 0);
        assert_eq!(mbc.read(0xA010), Some(0x00));
        mbc.write(0x4000, 2);
        assert_eq!(mbc.read(0xA010), Some(0x77));
    }
}
