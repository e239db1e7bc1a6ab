//! The device-callback protocol.
//!
//! The interpreter owns sixteen 16-byte device pages. Every read or
//! write to a page goes through the owning peripheral's [`Talk`]
//! callback: on input (`write == false`) the callback runs first and may
//! stage bytes for the imminent read; on output (`write == true`) the
//! byte has already landed in the page and the callback reacts to it.
//!
//! Callbacks receive a [`TalkEnv`] borrowed for the duration of the
//! call instead of holding a reference back to the machine, so a
//! callback can never re-enter the interpreter.

use crate::Memory;

/// Number of devices in the machine.
pub const DEV_COUNT: usize = 16;

/// Bytes in one device page.
pub const DEV_PAGE_SIZE: usize = 16;

/// What a device callback may reach while it runs.
pub struct TalkEnv<'a> {
    /// Main memory, for peripherals that exchange buffers with the
    /// program (console strings, file transfers).
    pub ram: &'a mut Memory,
    /// Working-stack depth, saturated to a byte.
    pub wst_depth: u8,
    /// Return-stack depth, saturated to a byte.
    pub rst_depth: u8,
}

/// A peripheral's half of the device protocol.
pub trait Talk {
    /// Called on every access to the peripheral's page.
    ///
    /// `port` is the offset within the page (0..16). `write` is false
    /// for a device-input staging call and true for a device-output
    /// reaction call.
    fn talk(&mut self, dat: &mut [u8; DEV_PAGE_SIZE], env: &mut TalkEnv<'_>, port: u8, write: bool);
}

/// Peripheral that ignores all traffic — the default for empty slots.
pub struct NullTalk;

impl Talk for NullTalk {
    fn talk(
        &mut self,
        _dat: &mut [u8; DEV_PAGE_SIZE],
        _env: &mut TalkEnv<'_>,
        _port: u8,
        _write: bool,
    ) {
    }
}
