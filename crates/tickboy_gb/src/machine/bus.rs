mod init;

use anyhow::Result;

use crate::component::Component;
use crate::cpu::{Bus, InterruptController};

use super::boot_rom::BootRomController;
use super::joypad::Joypad;
use super::lcd::LcdController;
use super::memory::{Ram, RamController};
use super::memory_map::{
    ECHO_RAM_END, ECHO_RAM_START, HIGH_RAM_END, HIGH_RAM_SIZE, HIGH_RAM_START, WORK_RAM_SIZE,
    WORK_RAM_START,
};
use super::timer::Timer;

/// Value read from addresses no component answers for.
const OPEN_BUS: u8 = 0xFF;

/// The DMG address space.
///
/// Reads go to the first participant that answers, in a fixed order;
/// writes are offered to every participant, each of which ignores the
/// addresses it does not own.
pub struct GameBoyBus {
    pub(super) interrupts: InterruptController,
    high_ram: RamController,
    pub(super) timer: Timer,
    work_ram: RamController,
    pub(super) boot: BootRomController,
    pub(super) lcd: LcdController,
    pub(super) joypad: Joypad,
    attached: Vec<Box<dyn Component>>,
}

impl GameBoyBus {
    pub fn new(boot: BootRomController) -> Result<Self> {
        let interrupts = InterruptController::new();
        let timer = Timer::new(interrupts.line());
        let lcd = LcdController::new(interrupts.line())?;
        let joypad = Joypad::new(interrupts.line());
        let work_ram = RamController::new(Ram::new(WORK_RAM_SIZE), WORK_RAM_START)?
            .with_echo(ECHO_RAM_START, ECHO_RAM_END)?;
        let high_ram = RamController::with_range(
            Ram::new(HIGH_RAM_SIZE),
            HIGH_RAM_START,
            u32::from(HIGH_RAM_END),
        )?;
        Ok(Self {
            interrupts,
            high_ram,
            timer,
            work_ram,
            boot,
            lcd,
            joypad,
            attached: Vec::new(),
        })
    }

    /// Adds a participant after the built-in ones.
    pub fn attach(&mut self, component: Box<dyn Component>) {
        self.attached.push(component);
    }

    pub fn read(&self, address: u16) -> u8 {
        let built_in: [&dyn Component; 7] = [
            &self.timer,
            &self.work_ram,
            &self.boot,
            &self.lcd,
            &self.joypad,
            &self.interrupts,
            &self.high_ram,
        ];
        built_in
            .iter()
            .find_map(|c| c.read(address))
            .or_else(|| self.attached.iter().find_map(|c| c.read(address)))
            .unwrap_or(OPEN_BUS)
    }

    pub fn write(&mut self, address: u16, data: u8) {
        self.timer.write(address, data);
        self.work_ram.write(address, data);
        self.boot.write(address, data);
        self.lcd.write(address, data);
        self.joypad.write(address, data);
        self.interrupts.write(address, data);
        self.high_ram.write(address, data);
        for component in &mut self.attached {
            component.write(address, data);
        }
    }

    pub fn step_timer(&mut self, cycle: u64) {
        self.timer.cycle(cycle);
    }

    /// Copies the next OAM DMA byte, if a transfer is running, then
    /// advances the LCD controller.
    pub fn step_lcd(&mut self, cycle: u64) -> Result<()> {
        if let Some(source) = self.lcd.dma_source() {
            let data = self.read(source);
            self.lcd.dma_store(data);
        }
        self.lcd.cycle(cycle)
    }
}

impl Bus for GameBoyBus {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write(addr, value)
    }
}
