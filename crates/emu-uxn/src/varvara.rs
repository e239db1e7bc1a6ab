//! The assembled machine: interpreter core plus the peripheral set.

use std::io::{self, Read};

use uxn_core::{NullTalk, PAGE_PROGRAM};
use uxn_cpu::{Fault, Uxn};

use crate::console::Console;
use crate::datetime::Datetime;
use crate::file::FileDevice;
use crate::system::System;

/// Console device slot.
const DEV_CONSOLE: usize = 0x1;

pub struct Varvara {
    uxn: Uxn,
}

impl Varvara {
    /// Boot a machine with the ROM loaded and the canonical peripheral
    /// set registered.
    #[must_use]
    pub fn new(rom: &[u8]) -> Self {
        let mut uxn = Uxn::new();
        uxn.load(rom);
        uxn.install(0x0, "system", Box::new(System));
        uxn.install(0x1, "console", Box::new(Console::new()));
        uxn.install(0x2, "screen", Box::new(NullTalk));
        uxn.install(0x3, "sprite", Box::new(NullTalk));
        uxn.install(0x4, "controller", Box::new(NullTalk));
        uxn.install(0x5, "key", Box::new(NullTalk));
        uxn.install(0x6, "mouse", Box::new(NullTalk));
        uxn.install(0x7, "file", Box::new(FileDevice));
        uxn.install(0x8, "audio", Box::new(NullTalk));
        uxn.install(0x9, "midi", Box::new(NullTalk));
        uxn.install(0xa, "datetime", Box::new(Datetime));
        Self { uxn }
    }

    #[must_use]
    pub fn uxn(&self) -> &Uxn {
        &self.uxn
    }

    pub fn uxn_mut(&mut self) -> &mut Uxn {
        &mut self.uxn
    }

    /// Run the reset vector, then serve console input from stdin until
    /// the program stops listening or the input runs dry.
    pub fn run(&mut self) -> Result<(), Fault> {
        self.uxn.eval(PAGE_PROGRAM)?;
        self.pump_console(io::stdin().lock())
    }

    /// Feed `input` one byte at a time to the console device's read
    /// port, firing its event vector for each byte. Returns when the
    /// vector is unset, on end of input, or on a fault.
    pub fn pump_console<R: Read>(&mut self, mut input: R) -> Result<(), Fault> {
        loop {
            let vector = self.uxn.dev[DEV_CONSOLE].vector();
            if vector == 0 {
                return Ok(());
            }
            let mut byte = [0u8; 1];
            match input.read(&mut byte) {
                Ok(0) | Err(_) => return Ok(()),
                Ok(_) => {
                    self.uxn.dev[DEV_CONSOLE].dat[0x2] = byte[0];
                    self.uxn.eval(vector)?;
                }
            }
        }
    }
}
