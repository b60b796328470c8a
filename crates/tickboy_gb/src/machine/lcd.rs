//! LCD controller: scanline timing, STAT/LY bookkeeping, OAM DMA and
//! per-line rendering of background, window and sprites.

mod image;
mod image_line;

use anyhow::Result;
use bitflags::bitflags;

use crate::bits::{make16, reverse8};
use crate::component::Component;
use crate::cpu::{Interrupt, IrqLine, NEVER};
use crate::register_file::{Register, RegisterFile};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::memory::Ram;
use super::memory_map::{
    OAM_END, OAM_SIZE, OAM_START, REGS_LCD_END, REGS_LCD_START, VIDEO_RAM_END, VIDEO_RAM_SIZE,
    VIDEO_RAM_START,
};

pub use image::{LcdImage, LcdImageBuilder};
pub use image_line::{LcdImageLine, LcdImageLineBuilder};

const MODE2_CYCLES: u64 = 20;
const MODE3_CYCLES: u64 = 43;
const MODE0_CYCLES: u64 = 51;
pub const LINE_CYCLES: u64 = MODE2_CYCLES + MODE3_CYCLES + MODE0_CYCLES;
/// Visible lines plus the ten lines of vertical blank.
pub const LINES_PER_FRAME: u64 = 154;

/// Side of the square background and window maps, in pixels.
const MAP_PIXELS: usize = 256;
const TILES_PER_ROW: usize = MAP_PIXELS / 8;
const TILE_BYTES: usize = 16;
const SPRITE_BYTES: usize = 4;
const SPRITE_COUNT: usize = OAM_SIZE / SPRITE_BYTES;
const MAX_SPRITES_PER_LINE: usize = 10;

/// Registers at 0xFF40..0xFF4C, in address order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LcdReg {
    Lcdc,
    Stat,
    Scy,
    Scx,
    Ly,
    Lyc,
    Dma,
    Bgp,
    Obp0,
    Obp1,
    Wy,
    Wx,
}

impl LcdReg {
    const ALL: [LcdReg; 12] = [
        LcdReg::Lcdc,
        LcdReg::Stat,
        LcdReg::Scy,
        LcdReg::Scx,
        LcdReg::Ly,
        LcdReg::Lyc,
        LcdReg::Dma,
        LcdReg::Bgp,
        LcdReg::Obp0,
        LcdReg::Obp1,
        LcdReg::Wy,
        LcdReg::Wx,
    ];

    fn at(address: u16) -> Option<LcdReg> {
        if (REGS_LCD_START..REGS_LCD_END).contains(&address) {
            Some(Self::ALL[usize::from(address - REGS_LCD_START)])
        } else {
            None
        }
    }
}

impl Register for LcdReg {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Lcdc: u8 {
        const BG = 1 << 0;
        const OBJ = 1 << 1;
        const OBJ_SIZE = 1 << 2;
        const BG_AREA = 1 << 3;
        const TILE_SOURCE = 1 << 4;
        const WIN = 1 << 5;
        const WIN_AREA = 1 << 6;
        const LCD_STATUS = 1 << 7;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Stat: u8 {
        const MODE0 = 1 << 0;
        const MODE1 = 1 << 1;
        const LYC_EQ_LY = 1 << 2;
        const INT_MODE0 = 1 << 3;
        const INT_MODE1 = 1 << 4;
        const INT_MODE2 = 1 << 5;
        const INT_LYC = 1 << 6;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct SpriteAttributes: u8 {
        const PALETTE = 1 << 4;
        const FLIP_H = 1 << 5;
        const FLIP_V = 1 << 6;
        const BEHIND_BG = 1 << 7;
    }
}

/// STAT mode bits 0..1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    Transfer = 3,
}

impl Mode {
    fn from_stat(stat: u8) -> Mode {
        match stat & 0b11 {
            0 => Mode::HBlank,
            1 => Mode::VBlank,
            2 => Mode::OamSearch,
            _ => Mode::Transfer,
        }
    }
}

pub struct LcdController {
    regs: RegisterFile<LcdReg, 12>,
    vram: Ram,
    oam: Ram,
    irq: IrqLine,
    next_active_cycle: u64,
    win_y: usize,
    /// Source page and index of the next OAM byte while a DMA transfer runs.
    dma: Option<(u8, usize)>,
    next_image: LcdImageBuilder,
    current_image: LcdImage,
}

impl LcdController {
    pub fn new(irq: IrqLine) -> Result<Self> {
        Ok(Self {
            regs: RegisterFile::default(),
            vram: Ram::new(VIDEO_RAM_SIZE),
            oam: Ram::new(OAM_SIZE),
            irq,
            next_active_cycle: NEVER,
            win_y: 0,
            dma: None,
            next_image: LcdImage::builder(SCREEN_WIDTH, SCREEN_HEIGHT)?,
            current_image: LcdImage::blank(SCREEN_WIDTH, SCREEN_HEIGHT)?,
        })
    }

    /// The last completed frame, or a white image before the first one.
    pub fn current_image(&self) -> &LcdImage {
        &self.current_image
    }

    pub fn mode(&self) -> Mode {
        Mode::from_stat(self.regs.get(LcdReg::Stat))
    }

    pub fn reg(&self, reg: LcdReg) -> u8 {
        self.regs.get(reg)
    }

    pub fn is_on(&self) -> bool {
        self.next_active_cycle != NEVER
    }

    /// Source address of the next DMA byte, if a transfer is running.
    pub fn dma_source(&self) -> Option<u16> {
        self.dma.map(|(page, index)| make16(page, index as u8))
    }

    /// Stores the byte read from [`Self::dma_source`] and advances the
    /// transfer.
    pub fn dma_store(&mut self, data: u8) {
        if let Some((page, index)) = self.dma {
            self.oam.write(index, data);
            self.dma = (index + 1 < OAM_SIZE).then_some((page, index + 1));
        }
    }

    pub fn cycle(&mut self, cycle: u64) -> Result<()> {
        if self.next_active_cycle == NEVER {
            if self.lcdc().contains(Lcdc::LCD_STATUS) {
                log::debug!("LCD on at cycle {cycle}");
                self.win_y = 0;
                self.next_image = LcdImage::builder(SCREEN_WIDTH, SCREEN_HEIGHT)?;
                self.write_ly(0);
                self.set_mode(Mode::OamSearch);
                self.next_active_cycle = cycle + MODE2_CYCLES;
            }
        } else if self.next_active_cycle == cycle {
            self.really_cycle()?;
        }
        Ok(())
    }

    fn really_cycle(&mut self) -> Result<()> {
        let ly = usize::from(self.regs.get(LcdReg::Ly));
        match self.mode() {
            Mode::OamSearch => {
                let line = self.compute_line(ly)?;
                self.next_image.set_line(ly, line)?;
                self.set_mode(Mode::Transfer);
                self.next_active_cycle += MODE3_CYCLES;
            }
            Mode::Transfer => {
                self.set_mode(Mode::HBlank);
                self.next_active_cycle += MODE0_CYCLES;
            }
            Mode::HBlank => {
                let next = ly + 1;
                self.write_ly(next as u8);
                if next == SCREEN_HEIGHT {
                    let builder = LcdImage::builder(SCREEN_WIDTH, SCREEN_HEIGHT)?;
                    self.current_image = std::mem::replace(&mut self.next_image, builder).build();
                    self.set_mode(Mode::VBlank);
                    self.next_active_cycle += LINE_CYCLES;
                } else {
                    self.set_mode(Mode::OamSearch);
                    self.next_active_cycle += MODE2_CYCLES;
                }
            }
            Mode::VBlank => {
                let next = ly as u64 + 1;
                if next == LINES_PER_FRAME {
                    self.win_y = 0;
                    self.write_ly(0);
                    self.set_mode(Mode::OamSearch);
                    self.next_active_cycle += MODE2_CYCLES;
                } else {
                    self.write_ly(next as u8);
                    self.next_active_cycle += LINE_CYCLES;
                }
            }
        }
        Ok(())
    }

    fn lcdc(&self) -> Lcdc {
        Lcdc::from_bits_retain(self.regs.get(LcdReg::Lcdc))
    }

    fn stat(&self) -> Stat {
        Stat::from_bits_retain(self.regs.get(LcdReg::Stat))
    }

    fn set_mode_bits(&mut self, mode: Mode) {
        let stat = self.regs.get(LcdReg::Stat);
        self.regs.set(LcdReg::Stat, (stat & !0b11) | mode as u8);
    }

    /// Enters `mode` and raises the interrupts tied to it.
    fn set_mode(&mut self, mode: Mode) {
        self.set_mode_bits(mode);
        let stat = self.stat();
        let stat_interrupt = match mode {
            Mode::HBlank => stat.contains(Stat::INT_MODE0),
            Mode::VBlank => {
                self.irq.request(Interrupt::VBlank);
                stat.contains(Stat::INT_MODE1)
            }
            Mode::OamSearch => stat.contains(Stat::INT_MODE2),
            Mode::Transfer => false,
        };
        if stat_interrupt {
            self.irq.request(Interrupt::LcdStat);
        }
    }

    fn write_ly(&mut self, value: u8) {
        self.regs.set(LcdReg::Ly, value);
        self.compare_ly();
    }

    fn compare_ly(&mut self) {
        let equal = self.regs.get(LcdReg::Ly) == self.regs.get(LcdReg::Lyc);
        let mut stat = self.stat();
        stat.set(Stat::LYC_EQ_LY, equal);
        self.regs.set(LcdReg::Stat, stat.bits());
        if equal && stat.contains(Stat::INT_LYC) {
            self.irq.request(Interrupt::LcdStat);
        }
    }

    fn compute_line(&mut self, y: usize) -> Result<LcdImageLine> {
        let lcdc = self.lcdc();
        let background = self.background_line(y)?;

        let wx = self.window_x();
        let wy = usize::from(self.regs.get(LcdReg::Wy));
        let mut line = if lcdc.contains(Lcdc::WIN) && wx < SCREEN_WIDTH && y >= wy {
            let window = self.window_line(wx)?;
            background.join(wx, &window)?
        } else {
            background
        };

        let blank = LcdImageLine::blank(SCREEN_WIDTH)?;
        let mut behind = blank.clone();
        let mut front = blank;
        if lcdc.contains(Lcdc::OBJ) {
            for index in self.sprites_on_line(y) {
                let sprite = self.sprite_line(index, y)?;
                if self.sprite_attributes(index).contains(SpriteAttributes::BEHIND_BG) {
                    behind = sprite.below(&behind)?;
                } else {
                    front = sprite.below(&front)?;
                }
            }
        }

        // Background-priority sprites only show through colour 0 of the
        // background and window.
        let opacity = behind.opacity().not().or(line.opacity())?;
        line = behind.below_with_opacity(&line, &opacity)?;
        line.below(&front)
    }

    fn background_line(&self, y: usize) -> Result<LcdImageLine> {
        let lcdc = self.lcdc();
        if !lcdc.contains(Lcdc::BG) {
            return LcdImageLine::blank(SCREEN_WIDTH);
        }
        let scx = isize::from(self.regs.get(LcdReg::Scx));
        let scy = usize::from(self.regs.get(LcdReg::Scy));
        self.map_line(lcdc.contains(Lcdc::BG_AREA), (scy + y) % MAP_PIXELS)?
            .extract_wrapped(scx, SCREEN_WIDTH)?
            .map_colors(self.regs.get(LcdReg::Bgp))
    }

    fn window_line(&mut self, wx: usize) -> Result<LcdImageLine> {
        let line = self
            .map_line(self.lcdc().contains(Lcdc::WIN_AREA), self.win_y % MAP_PIXELS)?
            .extract_wrapped(0, SCREEN_WIDTH)?
            .map_colors(self.regs.get(LcdReg::Bgp))?
            .shift(wx as isize);
        self.win_y += 1;
        Ok(line)
    }

    /// WX is offset by 7; values below 7 clamp to the left edge.
    fn window_x(&self) -> usize {
        usize::from(self.regs.get(LcdReg::Wx)).saturating_sub(7)
    }

    /// Row `y` of the 256 pixel wide background or window map.
    fn map_line(&self, high_map: bool, y: usize) -> Result<LcdImageLine> {
        let map_start = if high_map { 0x1C00 } else { 0x1800 };
        let row_start = map_start + TILES_PER_ROW * (y / 8);
        let mut builder = LcdImageLine::builder(MAP_PIXELS)?;
        for column in 0..TILES_PER_ROW {
            let tile = self.vram.read(row_start + column);
            let address = self.tile_address(tile) + 2 * (y % 8);
            builder.set_bytes(
                column,
                reverse8(self.vram.read(address + 1)),
                reverse8(self.vram.read(address)),
            )?;
        }
        builder.build()
    }

    /// VRAM offset of a background or window tile.
    fn tile_address(&self, tile: u8) -> usize {
        let tile = usize::from(tile);
        if self.lcdc().contains(Lcdc::TILE_SOURCE) {
            tile * TILE_BYTES
        } else if tile < 0x80 {
            0x1000 + tile * TILE_BYTES
        } else {
            0x0800 + (tile - 0x80) * TILE_BYTES
        }
    }

    fn sprite_height(&self) -> usize {
        if self.lcdc().contains(Lcdc::OBJ_SIZE) {
            16
        } else {
            8
        }
    }

    fn sprite_byte(&self, index: usize, field: usize) -> u8 {
        self.oam.read(index * SPRITE_BYTES + field)
    }

    fn sprite_attributes(&self, index: usize) -> SpriteAttributes {
        SpriteAttributes::from_bits_truncate(self.sprite_byte(index, 3))
    }

    /// The first ten sprites covering line `y`, by ascending X and then
    /// OAM index.
    fn sprites_on_line(&self, y: usize) -> Vec<usize> {
        let height = self.sprite_height() as isize;
        let y = y as isize;
        let mut keys: Vec<u16> = (0..SPRITE_COUNT)
            .filter(|&index| {
                let top = isize::from(self.sprite_byte(index, 0)) - 16;
                (top..top + height).contains(&y)
            })
            .take(MAX_SPRITES_PER_LINE)
            .map(|index| make16(self.sprite_byte(index, 1), index as u8))
            .collect();
        keys.sort_unstable();
        keys.into_iter().map(|key| usize::from(key as u8)).collect()
    }

    fn sprite_line(&self, index: usize, y: usize) -> Result<LcdImageLine> {
        let top = isize::from(self.sprite_byte(index, 0)) - 16;
        let x = isize::from(self.sprite_byte(index, 1)) - 8;
        let attributes = self.sprite_attributes(index);
        let height = self.sprite_height();

        let mut row = (y as isize - top) as usize;
        if attributes.contains(SpriteAttributes::FLIP_V) {
            row = height - 1 - row;
        }
        let mut tile = usize::from(self.sprite_byte(index, 2));
        if height == 16 {
            tile &= 0xFE;
        }
        let address = tile * TILE_BYTES + 2 * row;
        let (mut msb, mut lsb) = (self.vram.read(address + 1), self.vram.read(address));
        if !attributes.contains(SpriteAttributes::FLIP_H) {
            msb = reverse8(msb);
            lsb = reverse8(lsb);
        }

        let palette = if attributes.contains(SpriteAttributes::PALETTE) {
            LcdReg::Obp1
        } else {
            LcdReg::Obp0
        };
        let mut builder = LcdImageLine::builder(SCREEN_WIDTH)?;
        builder.set_bytes(0, msb, lsb)?;
        builder.build()?.shift(x).map_colors(self.regs.get(palette))
    }
}

impl Component for LcdController {
    fn read(&self, address: u16) -> Option<u8> {
        if let Some(reg) = LcdReg::at(address) {
            Some(self.regs.get(reg))
        } else if (VIDEO_RAM_START..VIDEO_RAM_END).contains(&address) {
            Some(self.vram.read(usize::from(address - VIDEO_RAM_START)))
        } else if (OAM_START..OAM_END).contains(&address) {
            Some(self.oam.read(usize::from(address - OAM_START)))
        } else {
            None
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        if let Some(reg) = LcdReg::at(address) {
            match reg {
                LcdReg::Lcdc => {
                    self.regs.set(LcdReg::Lcdc, data);
                    if !self.lcdc().contains(Lcdc::LCD_STATUS) && self.is_on() {
                        log::debug!("LCD off");
                        self.next_active_cycle = NEVER;
                        self.set_mode_bits(Mode::HBlank);
                        self.write_ly(0);
                    }
                }
                LcdReg::Stat => {
                    let stat = self.regs.get(LcdReg::Stat);
                    self.regs.set(LcdReg::Stat, (data & 0xF8) | (stat & 0x07));
                }
                LcdReg::Ly => {}
                LcdReg::Lyc => {
                    self.regs.set(LcdReg::Lyc, data);
                    self.compare_ly();
                }
                LcdReg::Dma => {
                    self.regs.set(LcdReg::Dma, data);
                    if self.dma.is_none() {
                        log::debug!("OAM DMA from 0x{:02X}00", data);
                        self.dma = Some((data, 0));
                    }
                }
                _ => self.regs.set(reg, data),
            }
        } else if (VIDEO_RAM_START..VIDEO_RAM_END).contains(&address) {
            self.vram.write(usize::from(address - VIDEO_RAM_START), data);
        } else if (OAM_START..OAM_END).contains(&address) {
            self.oam.write(usize::from(address - OAM_START), data);
        }
    }
}
