//! Uxn console emulator binary.
//!
//! Boots the machine, loads the ROM at the program page, runs the
//! reset vector, then serves console input from stdin.

use std::path::PathBuf;
use std::process;

use emu_uxn::{Varvara, load_rom};

struct CliArgs {
    rom_path: PathBuf,
}

fn usage() -> ! {
    eprintln!("Usage: emu-uxn <rom>");
    eprintln!();
    eprintln!("Runs the ROM from its reset vector, then feeds stdin to the");
    eprintln!("console device until EOF.");
    process::exit(1);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut rom_path = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => usage(),
            other if rom_path.is_none() && !other.starts_with('-') => {
                rom_path = Some(PathBuf::from(other));
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
    }

    match rom_path {
        Some(rom_path) => CliArgs { rom_path },
        None => usage(),
    }
}

fn main() {
    let cli = parse_args();

    let rom = match load_rom(&cli.rom_path) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let mut machine = Varvara::new(&rom);
    if let Err(fault) = machine.run() {
        eprintln!("{fault}");
        process::exit(1);
    }
}
