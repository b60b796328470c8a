use std::path::Path;

use anyhow::{ensure, Result};
use tickboy_common::key::Key;
use typed_builder::TypedBuilder;

use crate::component::Component;
use crate::cpu::Cpu;

use super::boot_rom::BootRomController;
use super::cartridge::Cartridge;
use super::joypad::Button;
use super::lcd::{LcdImage, LINES_PER_FRAME, LINE_CYCLES};
use super::GameBoyBus;

/// Machine cycles per second (4 MiHz oscillator / 4).
pub const CYCLES_PER_SECOND: u64 = 1 << 20;
/// Machine cycles per displayed frame.
pub const CYCLES_PER_FRAME: u64 = LINES_PER_FRAME * LINE_CYCLES;

/// Construction options for a [`GameBoy`].
#[derive(Debug, Default, TypedBuilder)]
pub struct MachineConfig {
    /// 256-byte DMG boot image. Without one the machine starts in the
    /// state the boot ROM leaves behind, at the cartridge entry point.
    #[builder(default, setter(strip_option))]
    pub boot_rom: Option<Vec<u8>>,
}

/// High-level Game Boy machine.
///
/// Owns the CPU, the bus with every peripheral and the global cycle counter.
/// Each machine cycle steps the timer, the LCD controller and then the CPU,
/// so that interrupts raised by the first two are seen by the CPU in the
/// same cycle.
pub struct GameBoy {
    cpu: Cpu,
    pub(super) bus: GameBoyBus,
    cycles: u64,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, config: MachineConfig) -> Result<Self> {
        let skip_boot = config.boot_rom.is_none();
        let boot = BootRomController::new(config.boot_rom, cartridge)?;
        let mut bus = GameBoyBus::new(boot)?;
        let mut cpu = Cpu::new();
        if skip_boot {
            cpu.set_post_boot_state();
            bus.apply_post_boot_io_state();
        }
        log::info!(
            "Game Boy ready, starting at 0x{:04X}{}",
            cpu.pc(),
            if skip_boot { "" } else { " in the boot ROM" }
        );
        Ok(Self {
            cpu,
            bus,
            cycles: 0,
        })
    }

    pub fn from_rom_file(path: impl AsRef<Path>, config: MachineConfig) -> Result<Self> {
        Self::new(Cartridge::from_file(path)?, config)
    }

    /// Adds an extra bus participant, such as a [`super::SerialPrinter`].
    pub fn attach(&mut self, component: Box<dyn Component>) {
        self.bus.attach(component);
    }

    /// Runs every cycle up to, but not including, `cycle`.
    pub fn run_until(&mut self, cycle: u64) -> Result<()> {
        ensure!(
            cycle >= self.cycles,
            "cannot run back to cycle {cycle}, already at {}",
            self.cycles
        );
        while self.cycles < cycle {
            self.step()?;
        }
        Ok(())
    }

    /// Runs until the next multiple of [`CYCLES_PER_FRAME`] past now.
    pub fn run_frame(&mut self) -> Result<()> {
        let target = (self.cycles / CYCLES_PER_FRAME + 1) * CYCLES_PER_FRAME;
        self.run_until(target)
    }

    fn step(&mut self) -> Result<()> {
        let cycle = self.cycles;
        self.bus.step_timer(cycle);
        self.bus.step_lcd(cycle)?;
        self.cpu.cycle(cycle, &mut self.bus)?;
        self.cycles += 1;
        Ok(())
    }

    /// Number of cycles executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The last frame the LCD completed.
    pub fn current_image(&self) -> &LcdImage {
        self.bus.lcd.current_image()
    }

    /// Reads a byte as the CPU would see it.
    pub fn read8(&self, address: u16) -> u8 {
        self.bus.read(address)
    }

    pub fn key_pressed(&mut self, button: Button) {
        self.bus.joypad.key_pressed(button);
    }

    pub fn key_released(&mut self, button: Button) {
        self.bus.joypad.key_released(button);
    }

    /// Update joypad state from a frontend key event.
    ///
    /// - Arrow keys => D-pad
    /// - Z => A, X => B
    /// - A => Select, S => Start
    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        let button = match key {
            Key::Right => Button::Right,
            Key::Left => Button::Left,
            Key::Up => Button::Up,
            Key::Down => Button::Down,
            Key::Z => Button::A,
            Key::X => Button::B,
            Key::A => Button::Select,
            Key::S => Button::Start,
            _ => return,
        };
        if pressed {
            self.key_pressed(button);
        } else {
            self.key_released(button);
        }
    }
}
