//! Uxn virtual machine interpreter.
//!
//! A synchronous stack machine: 256 one-byte opcodes (a 5-bit base
//! opcode crossed with short/return/keep mode bits) dispatched over two
//! 256-byte stacks and 64 KiB of RAM, talking to the outside world
//! through sixteen memory-mapped device pages.
//!
//! The host boots a machine, loads a ROM at `0x0100`, installs
//! peripherals, and calls [`Uxn::eval`] — once with the reset vector,
//! then with a device's event vector whenever that device has
//! something to report. Evaluation runs until BRK or a stack fault.

mod device;
mod stack;
mod vm;

pub use device::Device;
pub use stack::{ERR_NONE, ERR_OVERFLOW, ERR_UNDERFLOW, FaultKind, Stack, StackId};
pub use vm::{Fault, Uxn};
