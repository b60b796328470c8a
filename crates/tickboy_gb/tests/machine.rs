use tickboy_common::app::App;
use tickboy_gb::machine::{Button, Cartridge, SerialPrinter, CYCLES_PER_FRAME};
use tickboy_gb::{GameBoy, GameBoyApp, MachineConfig, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Builds a ROM-only image with `code` at the 0x0100 entry point.
fn rom_with(code: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0100..0x0100 + code.len()].copy_from_slice(code);
    rom
}

fn machine(code: &[u8]) -> GameBoy {
    let cartridge = Cartridge::from_rom(rom_with(code)).unwrap();
    GameBoy::new(cartridge, MachineConfig::default()).unwrap()
}

#[test]
fn call_scenario_stores_the_return_address() {
    // Same layout as a program loaded at 0, shifted to the entry point:
    // LD SP,0xFFFF; LD A,0x0B; CALL 0x010A; HALT; ...; 0x010A: HALT
    let mut code = vec![0x31, 0xFF, 0xFF, 0x3E, 0x0B, 0xCD, 0x0A, 0x01, 0x76, 0x00];
    code.push(0x76);
    let mut gb = machine(&code);
    gb.run_until(20).unwrap();
    assert_eq!(gb.cpu().sp(), 0xFFFD);
    assert_eq!(gb.read8(0xFFFD), 0x08);
    assert_eq!(gb.read8(0xFFFE), 0x01);
    assert_eq!(gb.cpu().pc(), 0x010B);
}

#[test]
fn background_reaches_the_frame() {
    let code = [
        0x3E, 0xFF, // LD A,0xFF
        0x21, 0x00, 0x80, // LD HL,0x8000
        0x06, 0x10, // LD B,16
        0x22, // loop: LD (HL+),A
        0x05, // DEC B
        0x20, 0xFC, // JR NZ,loop
        0x18, 0xFE, // JR -2
    ];
    let mut gb = machine(&code);
    gb.run_until(2 * CYCLES_PER_FRAME).unwrap();
    let image = gb.current_image();
    assert_eq!(image.width(), SCREEN_WIDTH);
    assert_eq!(image.height(), SCREEN_HEIGHT);
    // BGP 0xFC maps tile colour 3 to black.
    assert_eq!(image.get(0, 0).unwrap(), 3);
    assert_eq!(image.get(159, 143).unwrap(), 3);
}

#[test]
fn app_fills_the_rgb_screen() {
    let mut app = GameBoyApp::new(machine(&[0x18, 0xFE]));
    app.init();
    let mut screen = vec![0u8; (app.width() * app.height() * 3) as usize];
    app.update(&mut screen);
    assert!(!app.should_exit());
    assert_eq!(app.gb.cycles(), CYCLES_PER_FRAME);
    // Tile data is all zero, so every pixel is BGP colour 0: white.
    assert!(screen.iter().all(|&b| b == 0xFF));
}

#[test]
fn app_stops_on_emulation_errors() {
    let mut app = GameBoyApp::new(machine(&[0x10, 0x00]));
    let mut screen = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    app.update(&mut screen);
    assert!(app.should_exit());
}

#[test]
fn joypad_and_serial_from_outside() {
    let code = [
        0x3E, 0x20, // LD A,0x20   select the direction line
        0xE0, 0x00, // LDH (0x00),A
        0x18, 0xFE, // JR -2
    ];
    let mut gb = machine(&code);
    let printer = SerialPrinter::new();
    let output = printer.output();
    gb.attach(Box::new(printer));
    gb.run_until(10).unwrap();
    gb.key_pressed(Button::Up);
    assert_eq!(gb.read8(0xFF00) & 0x0F, 0b1011);
    gb.key_released(Button::Up);
    assert_eq!(gb.read8(0xFF00) & 0x0F, 0b1111);
    assert!(output.borrow().is_empty());
}
