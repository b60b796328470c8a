use tickboy_common::app::App;
use tickboy_common::key::Key;

use crate::machine::write_rgb24;
use crate::{GameBoy, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};

/// SDL-facing application wrapper for the Game Boy machine.
pub struct GameBoyApp {
    should_exit: bool,
    pub gb: GameBoy,
    frame_counter: u64,
}

impl GameBoyApp {
    pub fn new(gb: GameBoy) -> Self {
        Self {
            should_exit: false,
            gb,
            frame_counter: 0,
        }
    }
}

impl App for GameBoyApp {
    fn init(&mut self) {
        log::info!("Game Boy init");
    }

    fn update(&mut self, screen_state: &mut [u8]) {
        if self.should_exit {
            return;
        }
        let result = self
            .gb
            .run_frame()
            .and_then(|()| write_rgb24(self.gb.current_image(), screen_state));
        if let Err(err) = result {
            log::error!(
                "Emulation stopped at cycle {} (PC=0x{:04X}): {err:#}",
                self.gb.cycles(),
                self.gb.cpu().pc()
            );
            self.should_exit = true;
            return;
        }

        self.frame_counter += 1;
        if self.frame_counter % 600 == 0 {
            let cpu = self.gb.cpu();
            log::debug!(
                "GB: frame={} pc=0x{:04X} sp=0x{:04X} ime={} halted={}",
                self.frame_counter,
                cpu.pc(),
                cpu.sp(),
                cpu.ime(),
                cpu.is_halted()
            );
        }
    }

    fn handle_key_event(&mut self, key: Key, is_pressed: bool) {
        log::debug!("GB key event: {:?} pressed={}", key, is_pressed);
        if key == Key::Escape && is_pressed {
            self.should_exit = true;
            return;
        }
        self.gb.handle_key(key, is_pressed);
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Game Boy exit after {} cycles", self.gb.cycles());
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        "TickBoy".to_string()
    }
}
