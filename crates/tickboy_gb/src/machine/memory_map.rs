//! DMG address map. Ranges are half-open: `*_START..*_END`.

pub const BOOT_ROM_START: u16 = 0x0000;
pub const BOOT_ROM_END: u16 = 0x0100;
pub const BOOT_ROM_SIZE: usize = (BOOT_ROM_END - BOOT_ROM_START) as usize;

pub const ROM_START: u16 = 0x0000;
pub const ROM_END: u16 = 0x8000;

pub const VIDEO_RAM_START: u16 = 0x8000;
pub const VIDEO_RAM_END: u16 = 0xA000;
pub const VIDEO_RAM_SIZE: usize = (VIDEO_RAM_END - VIDEO_RAM_START) as usize;

pub const EXTERNAL_RAM_START: u16 = 0xA000;

pub const WORK_RAM_START: u16 = 0xC000;
pub const WORK_RAM_END: u16 = 0xE000;
pub const WORK_RAM_SIZE: usize = (WORK_RAM_END - WORK_RAM_START) as usize;

pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFE00;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFEA0;
pub const OAM_SIZE: usize = (OAM_END - OAM_START) as usize;

pub const REG_P1: u16 = 0xFF00;
pub const REG_SB: u16 = 0xFF01;

pub const REG_DIV: u16 = 0xFF04;
pub const REG_TIMA: u16 = 0xFF05;
pub const REG_TMA: u16 = 0xFF06;
pub const REG_TAC: u16 = 0xFF07;

pub const REG_IF: u16 = 0xFF0F;

pub const REGS_LCD_START: u16 = 0xFF40;
pub const REGS_LCD_END: u16 = 0xFF4C;

pub const REG_BOOT_ROM_DISABLE: u16 = 0xFF50;

pub const HIGH_RAM_START: u16 = 0xFF80;
pub const HIGH_RAM_END: u16 = 0xFFFF;
pub const HIGH_RAM_SIZE: usize = (HIGH_RAM_END - HIGH_RAM_START) as usize;

pub const REG_IE: u16 = 0xFFFF;
