//! ROM image loading.
//!
//! A ROM is a bare byte stream loaded at the program page: no header,
//! no checksum.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uxn_core::{PAGE_PROGRAM, RAM_SIZE};

/// Largest image that fits between the program page and the end of RAM.
pub const ROM_CAPACITY: usize = RAM_SIZE - PAGE_PROGRAM as usize;

#[derive(Debug)]
pub enum RomError {
    Io(PathBuf, io::Error),
    TooLarge(PathBuf, usize),
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "cannot read ROM {}: {err}", path.display()),
            Self::TooLarge(path, size) => write!(
                f,
                "ROM {} is {size} bytes (capacity {ROM_CAPACITY})",
                path.display(),
            ),
        }
    }
}

impl std::error::Error for RomError {}

/// Read a ROM file, rejecting images larger than the address space can
/// hold.
pub fn load_rom(path: &Path) -> Result<Vec<u8>, RomError> {
    let data = fs::read(path).map_err(|err| RomError::Io(path.to_path_buf(), err))?;
    if data.len() > ROM_CAPACITY {
        return Err(RomError::TooLarge(path.to_path_buf(), data.len()));
    }
    Ok(data)
}
