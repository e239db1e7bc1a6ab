//! Console Uxn emulator.
//!
//! Wraps the interpreter core in the canonical peripheral set a
//! terminal host can honor: system, console, file and datetime.
//! Devices that need a window or a speaker (screen, sprite,
//! controller, key, mouse, audio, midi) are registered as named stubs
//! so programs can probe them without effect.

mod console;
mod datetime;
mod file;
mod rom;
mod system;
mod varvara;

pub use console::Console;
pub use datetime::Datetime;
pub use file::FileDevice;
pub use rom::{ROM_CAPACITY, RomError, load_rom};
pub use system::System;
pub use varvara::Varvara;
