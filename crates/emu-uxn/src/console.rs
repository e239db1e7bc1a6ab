//! Console device (slot 1).
//!
//! Output ports, all write-triggered:
//! - 0x8 — the byte, raw
//! - 0x9 — the byte, hex with a newline
//! - 0xb — the short at 0xa..0xc, hex with a newline
//! - 0xd — the NUL-terminated RAM string addressed by 0xc..0xe
//!
//! The host stores incoming bytes at port 0x2 before firing the
//! device's vector.

use std::io::{self, Write};

use uxn_core::{DEV_PAGE_SIZE, Talk, TalkEnv};

pub struct Console<W: Write = io::Stdout> {
    out: W,
}

impl Console<io::Stdout> {
    #[must_use]
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for Console<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Console<W> {
    /// A console printing somewhere other than stdout.
    pub fn with_output(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Talk for Console<W> {
    fn talk(
        &mut self,
        dat: &mut [u8; DEV_PAGE_SIZE],
        env: &mut TalkEnv<'_>,
        port: u8,
        write: bool,
    ) {
        if !write {
            return;
        }
        match port {
            0x8 => {
                let _ = self.out.write_all(&[dat[0x8]]);
            }
            0x9 => {
                let _ = writeln!(self.out, "0x{:02x}", dat[0x9]);
            }
            0xb => {
                let v = u16::from_be_bytes([dat[0xa], dat[0xb]]);
                let _ = writeln!(self.out, "0x{v:04x}");
            }
            0xd => {
                let addr = u16::from_be_bytes([dat[0xc], dat[0xd]]);
                let s = env.ram.peek_str(addr);
                let _ = self.out.write_all(&s);
                let _ = self.out.write_all(b"\n");
            }
            _ => {}
        }
        let _ = self.out.flush();
    }
}
