//! System device (slot 0).
//!
//! Reads of ports 0x2 and 0x3 stage the current stack depths. The
//! palette ports at 0x8..0xe are stored in the page like any other
//! write; a console host has nothing to paint with them.

use uxn_core::{DEV_PAGE_SIZE, Talk, TalkEnv};

pub struct System;

impl Talk for System {
    fn talk(
        &mut self,
        dat: &mut [u8; DEV_PAGE_SIZE],
        env: &mut TalkEnv<'_>,
        port: u8,
        write: bool,
    ) {
        if write {
            return;
        }
        match port {
            0x2 => dat[0x2] = env.wst_depth,
            0x3 => dat[0x3] = env.rst_depth,
            _ => {}
        }
    }
}
