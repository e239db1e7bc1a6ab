//! Datetime device (slot 10).
//!
//! Every read restages the whole page from local time:
//!
//! ```text
//! 0x0 year*   0x2 month  0x3 day     0x4 hour
//! 0x5 minute  0x6 second 0x7 weekday 0x8 yearday*
//! 0xa dst
//! ```
//!
//! Starred fields are big-endian shorts. Month, weekday (Sunday = 0)
//! and yearday count from zero.

use chrono::{Datelike, Local, Timelike};
use uxn_core::{DEV_PAGE_SIZE, Talk, TalkEnv};

pub struct Datetime;

impl Talk for Datetime {
    fn talk(
        &mut self,
        dat: &mut [u8; DEV_PAGE_SIZE],
        _env: &mut TalkEnv<'_>,
        _port: u8,
        write: bool,
    ) {
        if write {
            return;
        }
        let now = Local::now();
        let year = now.year() as u16;
        dat[0x0] = (year >> 8) as u8;
        dat[0x1] = year as u8;
        dat[0x2] = now.month0() as u8;
        dat[0x3] = now.day() as u8;
        dat[0x4] = now.hour() as u8;
        dat[0x5] = now.minute() as u8;
        dat[0x6] = now.second() as u8;
        dat[0x7] = now.weekday().num_days_from_sunday() as u8;
        let yday = now.ordinal0() as u16;
        dat[0x8] = (yday >> 8) as u8;
        dat[0x9] = yday as u8;
        // DST state isn't observable through chrono's local clock
        dat[0xa] = 0;
    }
}
