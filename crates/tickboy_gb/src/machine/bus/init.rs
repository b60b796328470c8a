use super::GameBoyBus;

/// I/O register values the DMG boot ROM leaves behind.
const POST_BOOT_IO: [(u16, u8); 12] = [
    (0xFF00, 0xCF), // P1
    (0xFF05, 0x00), // TIMA
    (0xFF06, 0x00), // TMA
    (0xFF07, 0xF8), // TAC
    (0xFF0F, 0x01), // IF: VBlank is pending at 0x0100
    (0xFF42, 0x00), // SCY
    (0xFF43, 0x00), // SCX
    (0xFF45, 0x00), // LYC
    (0xFF47, 0xFC), // BGP
    (0xFF48, 0xFF), // OBP0
    (0xFF49, 0xFF), // OBP1
    (0xFF40, 0x91), // LCDC last, so the display starts with its palettes set
];

impl GameBoyBus {
    /// Writes the register state of a completed boot sequence, for runs
    /// that start directly at the cartridge entry point.
    pub(in crate::machine) fn apply_post_boot_io_state(&mut self) {
        for (address, value) in POST_BOOT_IO {
            self.write(address, value);
        }
        log::debug!("Applied DMG post-boot I/O state");
    }
}
