use anyhow::{ensure, Result};

use crate::component::Component;

use super::cartridge::Cartridge;
use super::memory_map::{BOOT_ROM_END, BOOT_ROM_SIZE, BOOT_ROM_START, REG_BOOT_ROM_DISABLE};

/// Overlays the 256-byte boot ROM on the start of the cartridge until the
/// boot code writes to 0xFF50.
pub struct BootRomController {
    boot_rom: Option<Box<[u8]>>,
    cartridge: Cartridge,
}

impl BootRomController {
    /// Without a boot image the overlay starts out disabled.
    pub fn new(boot_rom: Option<Vec<u8>>, cartridge: Cartridge) -> Result<Self> {
        if let Some(rom) = &boot_rom {
            ensure!(
                rom.len() == BOOT_ROM_SIZE,
                "boot ROM must be {BOOT_ROM_SIZE} bytes, got {}",
                rom.len()
            );
        }
        Ok(Self {
            boot_rom: boot_rom.map(Vec::into_boxed_slice),
            cartridge,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_enabled(&self) -> bool {
        self.boot_rom.is_some()
    }
}

impl Component for BootRomController {
    fn read(&self, address: u16) -> Option<u8> {
        match &self.boot_rom {
            Some(rom) if (BOOT_ROM_START..BOOT_ROM_END).contains(&address) => {
                Some(rom[usize::from(address - BOOT_ROM_START)])
            }
            _ => self.cartridge.read(address),
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        if address == REG_BOOT_ROM_DISABLE {
            if self.boot_rom.take().is_some() {
                log::info!("Boot ROM disabled");
            }
        } else {
            self.cartridge.write(address, data);
        }
    }
}
