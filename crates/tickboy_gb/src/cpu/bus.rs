/// Abstraction over the Game Boy bus (memory and IO) as seen by the CPU.
///
/// Reads take `&mut self` so that system buses can forward them to
/// components with read side effects.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Little-endian 16-bit read; the address wraps at the top of memory.
    fn read16(&mut self, addr: u16) -> u16 {
        let low = self.read8(addr);
        let high = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    fn write16(&mut self, addr: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write8(addr, low);
        self.write8(addr.wrapping_add(1), high);
    }
}
