//! Device slots: a 16-byte page plus the owning peripheral's callback.

use uxn_core::{DEV_PAGE_SIZE, NullTalk, Talk, TalkEnv};

/// One of the machine's sixteen device slots.
///
/// The page is plain data owned by the machine; behavior lives in the
/// boxed [`Talk`] handler installed by the host. Ports 0x0..0x1 hold
/// the device's event vector by convention, so [`Device::vector`] just
/// reads the first short of the page.
pub struct Device {
    id: u8,
    name: &'static str,
    /// The 16-byte I/O page.
    pub dat: [u8; DEV_PAGE_SIZE],
    talk: Box<dyn Talk>,
}

impl Device {
    pub(crate) fn empty(id: u8) -> Self {
        Self {
            id,
            name: "---",
            dat: [0; DEV_PAGE_SIZE],
            talk: Box::new(NullTalk),
        }
    }

    pub(crate) fn install(&mut self, name: &'static str, talk: Box<dyn Talk>) {
        self.name = name;
        self.talk = talk;
    }

    /// Base of this device's page in the 256-byte device space.
    #[must_use]
    pub fn addr(&self) -> u8 {
        self.id << 4
    }

    /// The peripheral's registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The event vector: the big-endian short at ports 0x0..0x1,
    /// written by the program with a `DEO2` to port 0. Zero means the
    /// device has no listener.
    #[must_use]
    pub fn vector(&self) -> u16 {
        u16::from_be_bytes([self.dat[0], self.dat[1]])
    }

    /// Device input: run the callback so it can stage a byte, then read
    /// the page.
    pub(crate) fn peek(&mut self, env: &mut TalkEnv<'_>, port: u8) -> u8 {
        let off = port & 0x0f;
        self.talk.talk(&mut self.dat, env, off, false);
        self.dat[usize::from(off)]
    }

    /// Device output: write the page, then let the callback react.
    pub(crate) fn poke(&mut self, env: &mut TalkEnv<'_>, port: u8, value: u8) {
        let off = port & 0x0f;
        self.dat[usize::from(off)] = value;
        self.talk.talk(&mut self.dat, env, off, true);
    }
}
