//! File device (slot 7): block transfers between a named host file
//! and RAM.
//!
//! Page layout, all shorts big-endian:
//!
//! ```text
//! 0x0 offset  0x2 append flag (bit 0)
//! 0x8 name    0xa length  0xc load addr  0xe save addr
//! ```
//!
//! Writing the low byte of the load address reads `length` bytes from
//! the file at `offset` into RAM; writing the low byte of the save
//! address writes `length` bytes of RAM out. The name port addresses a
//! NUL-terminated string in RAM. Host I/O errors go to stderr and
//! never reach the interpreter.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};

use uxn_core::{DEV_PAGE_SIZE, Talk, TalkEnv};

pub struct FileDevice;

fn page_short(dat: &[u8; DEV_PAGE_SIZE], port: usize) -> u16 {
    u16::from_be_bytes([dat[port], dat[port + 1]])
}

fn read_chunk(name: &str, offset: u16, length: u16) -> io::Result<Vec<u8>> {
    let mut f = File::open(name)?;
    f.seek(SeekFrom::Start(u64::from(offset)))?;
    let mut buf = Vec::new();
    f.take(u64::from(length)).read_to_end(&mut buf)?;
    Ok(buf)
}

fn write_chunk(name: &str, offset: u16, append: bool, bytes: &[u8]) -> io::Result<()> {
    if append {
        let mut f = OpenOptions::new().append(true).create(true).open(name)?;
        f.write_all(bytes)
    } else {
        let mut f = File::create(name)?;
        f.seek(SeekFrom::Start(u64::from(offset)))?;
        f.write_all(bytes)
    }
}

impl Talk for FileDevice {
    fn talk(
        &mut self,
        dat: &mut [u8; DEV_PAGE_SIZE],
        env: &mut TalkEnv<'_>,
        port: u8,
        write: bool,
    ) {
        if !write || (port != 0xd && port != 0xf) {
            return;
        }
        let name_bytes = env.ram.peek_str(page_short(dat, 0x8));
        let name = String::from_utf8_lossy(&name_bytes).into_owned();
        let offset = page_short(dat, 0x0);
        let length = page_short(dat, 0xa);
        match port {
            0xd => {
                let addr = page_short(dat, 0xc);
                match read_chunk(&name, offset, length) {
                    Ok(bytes) => {
                        for (i, &b) in bytes.iter().enumerate() {
                            env.ram.poke8(addr.wrapping_add(i as u16), b);
                        }
                        eprintln!("Loaded {} bytes, at 0x{addr:04x} from {name}", bytes.len());
                    }
                    Err(err) => eprintln!("File load failed ({name}): {err}"),
                }
            }
            0xf => {
                let addr = page_short(dat, 0xe);
                let append = dat[0x2] & 0x1 != 0;
                let bytes: Vec<u8> = (0..length)
                    .map(|i| env.ram.peek8(addr.wrapping_add(i)))
                    .collect();
                match write_chunk(&name, offset, append, &bytes) {
                    Ok(()) => eprintln!("Saved {length} bytes, at 0x{addr:04x} from {name}"),
                    Err(err) => eprintln!("File save failed ({name}): {err}"),
                }
            }
            _ => {}
        }
    }
}
