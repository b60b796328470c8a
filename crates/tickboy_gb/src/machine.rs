mod boot_rom;
mod bus;
pub mod cartridge;
mod gameboy;
mod joypad;
pub mod lcd;
mod memory;
pub mod memory_map;
mod serial;
mod timer;
mod video;

pub(crate) use bus::GameBoyBus;
pub use cartridge::Cartridge;
pub use gameboy::{GameBoy, MachineConfig, CYCLES_PER_FRAME, CYCLES_PER_SECOND};
pub use joypad::Button;
pub use serial::{SerialOutput, SerialPrinter};
pub use video::write_rgb24;
