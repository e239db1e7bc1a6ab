//! Core types for the Uxn virtual machine.
//!
//! The interpreter, the peripherals and the host all meet here: a flat
//! 64 KiB memory with a 16-bit program counter, and the `talk` callback
//! protocol through which the interpreter drives memory-mapped devices.

mod device;
mod memory;

pub use device::{DEV_COUNT, DEV_PAGE_SIZE, NullTalk, Talk, TalkEnv};
pub use memory::{Memory, PAGE_PROGRAM, RAM_SIZE};
