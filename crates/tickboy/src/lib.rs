use std::path::Path;

use anyhow::{Context, Result};
use tickboy_common::app::App;
use tickboy_gb::machine::SerialPrinter;
use tickboy_gb::{GameBoy, GameBoyApp, MachineConfig};
use tickboy_sdl2::{SdlContext, SdlInitInfo};

/// Loads `rom_path`, optionally behind a DMG boot image, and runs it in an
/// SDL2 window until the user quits.
pub fn run(rom_path: &Path, boot_rom_path: Option<&Path>) -> Result<()> {
    let config = match boot_rom_path {
        Some(path) => {
            let boot_rom = std::fs::read(path)
                .with_context(|| format!("reading boot ROM {}", path.display()))?;
            MachineConfig::builder().boot_rom(boot_rom).build()
        }
        None => MachineConfig::default(),
    };
    let mut gb = GameBoy::from_rom_file(rom_path, config)
        .with_context(|| format!("loading {}", rom_path.display()))?;
    gb.attach(Box::new(SerialPrinter::new()));

    let app = GameBoyApp::new(gb);
    let init_info = SdlInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .scale(app.scale())
        .title(app.title())
        .build();
    SdlContext::run(init_info, app)
}
