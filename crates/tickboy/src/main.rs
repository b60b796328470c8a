use std::path::PathBuf;

fn main() {
    env_logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(rom_path) = args.next() else {
        eprintln!(
            "No ROM path provided.\n\
             Usage: tickboy path/to/game.gb [path/to/dmg_boot.bin]"
        );
        std::process::exit(1);
    };
    let boot_rom_path = args.next();
    log::info!("Playing ROM path: '{}'", rom_path.display());

    if let Err(err) = tickboy::run(&rom_path, boot_rom_path.as_deref()) {
        log::error!("{err:#}");
        eprintln!("tickboy: {err:#}");
        std::process::exit(1);
    }
}
