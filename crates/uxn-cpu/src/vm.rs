//! Machine state and the opcode dispatch loop.
//!
//! Every instruction byte decodes as three mode bits over a 5-bit base
//! opcode: bit 5 widens operands to big-endian shorts, bit 6 makes the
//! return stack primary, bit 7 reads operands without consuming them.
//! One match arm per base opcode serves all eight mode variants; the
//! zero base opcode is BRK in every encoding.

use std::fmt;

use uxn_core::{DEV_COUNT, Memory, PAGE_PROGRAM, Talk, TalkEnv};

use crate::device::Device;
use crate::stack::{FaultKind, Halt, Stack, StackId, View};

/// A fatal stack fault: the machine has halted mid-vector.
///
/// The offending stack's error register is set before this is returned;
/// memory and device pages are left as they were at fault time, and the
/// program counter points past the faulting opcode's last fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    /// Stack the failed access targeted.
    pub stack: StackId,
    /// Whether the access ran off the bottom or the top.
    pub kind: FaultKind,
    /// The opcode byte that faulted.
    pub opcode: u8,
    /// Program counter after the faulting instruction's fetches.
    pub pc: u16,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = match self.stack {
            StackId::Working => "Working",
            StackId::Return => "Return",
        };
        let flow = match self.kind {
            FaultKind::Underflow => "under",
            FaultKind::Overflow => "over",
        };
        write!(
            f,
            "Halted: {stack}-stack {flow}flow#0x{:02x}, at 0x{:04x}",
            self.opcode, self.pc
        )
    }
}

impl std::error::Error for Fault {}

/// The Uxn machine: 64 KiB of RAM, two 256-byte stacks and sixteen
/// memory-mapped devices.
pub struct Uxn {
    pub ram: Memory,
    pub wst: Stack,
    pub rst: Stack,
    pub dev: [Device; DEV_COUNT],
}

/// Displacement arithmetic for the relative opcodes: sign-extend the
/// byte and add it to the post-fetch program counter.
fn relative(pc: u16, delta: u8) -> u16 {
    pc.wrapping_add(i16::from(delta as i8) as u16)
}

impl Uxn {
    /// Boot a zeroed machine. All device slots start with a callback
    /// that ignores traffic.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Memory::new(),
            wst: Stack::new(),
            rst: Stack::new(),
            dev: std::array::from_fn(|id| Device::empty(id as u8)),
        }
    }

    /// Copy a program image into RAM at the program page.
    pub fn load(&mut self, rom: &[u8]) {
        self.ram.load(PAGE_PROGRAM, rom);
    }

    /// Register a peripheral on device slot `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not in 0..16.
    pub fn install(&mut self, id: usize, name: &'static str, talk: Box<dyn Talk>) {
        self.dev[id].install(name, talk);
    }

    /// Run from `vector` until the program counter reaches zero (BRK)
    /// or a stack faults.
    ///
    /// A zero vector returns immediately: unset device vectors are
    /// no-ops for the host.
    pub fn eval(&mut self, vector: u16) -> Result<(), Fault> {
        self.ram.pc = vector;
        while self.ram.pc != 0 {
            self.step()?;
        }
        Ok(())
    }

    /// Fetch and execute a single instruction at the program counter.
    pub fn step(&mut self) -> Result<(), Fault> {
        let instr = self.ram.fetch();
        self.exec(instr).map_err(|halt| Fault {
            stack: halt.stack,
            kind: halt.kind,
            opcode: instr,
            pc: self.ram.pc,
        })
    }

    /// Keep-aware view of the primary stack for this instruction.
    fn primary(&mut self, ret: bool, keep: bool) -> View<'_> {
        if ret {
            View::new(&mut self.rst, StackId::Return, keep)
        } else {
            View::new(&mut self.wst, StackId::Working, keep)
        }
    }

    /// The other stack — the destination of STH and JSR. Never in keep
    /// mode: transfers always append.
    fn secondary(&mut self, ret: bool) -> View<'_> {
        if ret {
            View::new(&mut self.wst, StackId::Working, false)
        } else {
            View::new(&mut self.rst, StackId::Return, false)
        }
    }

    fn mem_load(&self, addr: u16, short: bool) -> u16 {
        if short {
            self.ram.peek16(addr)
        } else {
            u16::from(self.ram.peek8(addr))
        }
    }

    fn mem_store(&mut self, addr: u16, value: u16, short: bool) {
        if short {
            self.ram.poke16(addr, value);
        } else {
            self.ram.poke8(addr, value as u8);
        }
    }

    /// Device input for one byte: the callback stages, then the page is
    /// read. The device is pinned by the caller so that a 16-bit access
    /// crossing the page end stays on the same device.
    fn dev_peek(&mut self, dev: usize, port: u8) -> u8 {
        let mut env = TalkEnv {
            ram: &mut self.ram,
            wst_depth: u8::try_from(self.wst.ptr).unwrap_or(u8::MAX),
            rst_depth: u8::try_from(self.rst.ptr).unwrap_or(u8::MAX),
        };
        self.dev[dev].peek(&mut env, port)
    }

    /// Device output for one byte: the page is written, then the
    /// callback reacts.
    fn dev_poke(&mut self, dev: usize, port: u8, value: u8) {
        let mut env = TalkEnv {
            ram: &mut self.ram,
            wst_depth: u8::try_from(self.wst.ptr).unwrap_or(u8::MAX),
            rst_depth: u8::try_from(self.rst.ptr).unwrap_or(u8::MAX),
        };
        self.dev[dev].poke(&mut env, port, value);
    }

    /// Two-operand arithmetic/bitwise opcode: `f(second, top)`.
    fn binary(&mut self, ret: bool, keep: bool, short: bool, f: fn(u16, u16) -> u16) -> Result<(), Halt> {
        let mut s = self.primary(ret, keep);
        let a = s.pop(short)?;
        let b = s.pop(short)?;
        s.push(f(b, a), short)
    }

    /// Comparison opcode: `f(second, top)`, one byte of result even in
    /// short mode.
    fn compare(&mut self, ret: bool, keep: bool, short: bool, f: fn(u16, u16) -> bool) -> Result<(), Halt> {
        let mut s = self.primary(ret, keep);
        let a = s.pop(short)?;
        let b = s.pop(short)?;
        s.push8(u8::from(f(b, a)))
    }

    /// Execute one decoded instruction.
    fn exec(&mut self, instr: u8) -> Result<(), Halt> {
        let keep = instr & 0x80 != 0;
        let ret = instr & 0x40 != 0;
        let short = instr & 0x20 != 0;

        match instr & 0x1f {
            // BRK — halts in all eight mode encodings
            0x00 => self.ram.pc = 0,

            // LIT — push the next byte or short in memory
            0x01 => {
                let v = if short {
                    let hi = self.ram.fetch();
                    let lo = self.ram.fetch();
                    u16::from_be_bytes([hi, lo])
                } else {
                    u16::from(self.ram.fetch())
                };
                self.primary(ret, keep).push(v, short)?;
            }

            // NOP
            0x02 => {}

            // POP
            0x03 => {
                self.primary(ret, keep).pop(short)?;
            }

            // DUP
            0x04 => {
                let mut s = self.primary(ret, keep);
                let a = s.pop(short)?;
                s.push(a, short)?;
                s.push(a, short)?;
            }

            // SWP — exchange the top two values
            0x05 => {
                let mut s = self.primary(ret, keep);
                let a = s.pop(short)?;
                let b = s.pop(short)?;
                s.push(a, short)?;
                s.push(b, short)?;
            }

            // OVR — copy the second value over the top
            0x06 => {
                let mut s = self.primary(ret, keep);
                let a = s.pop(short)?;
                let b = s.pop(short)?;
                s.push(b, short)?;
                s.push(a, short)?;
                s.push(b, short)?;
            }

            // ROT — rotate the third value to the top
            0x07 => {
                let mut s = self.primary(ret, keep);
                let a = s.pop(short)?;
                let b = s.pop(short)?;
                let c = s.pop(short)?;
                s.push(b, short)?;
                s.push(a, short)?;
                s.push(c, short)?;
            }

            // EQU NEQ GTH LTH — second compared against top
            0x08 => self.compare(ret, keep, short, |b, a| b == a)?,
            0x09 => self.compare(ret, keep, short, |b, a| b != a)?,
            0x0a => self.compare(ret, keep, short, |b, a| b > a)?,
            0x0b => self.compare(ret, keep, short, |b, a| b < a)?,

            // JMP — relative byte displacement, or absolute in short mode
            0x0c => {
                let target = self.primary(ret, keep).pop(short)?;
                self.ram.pc = if short {
                    target
                } else {
                    relative(self.ram.pc, target as u8)
                };
            }

            // JCN — branch when the condition byte under the target is set
            0x0d => {
                let (target, cond) = {
                    let mut s = self.primary(ret, keep);
                    (s.pop(short)?, s.pop8()?)
                };
                if cond != 0 {
                    self.ram.pc = if short {
                        target
                    } else {
                        relative(self.ram.pc, target as u8)
                    };
                }
            }

            // JSR — stash the return address on the other stack, then jump
            0x0e => {
                let target = self.primary(ret, keep).pop(short)?;
                let pc = self.ram.pc;
                self.secondary(ret).push16(pc)?;
                self.ram.pc = if short { target } else { relative(pc, target as u8) };
            }

            // STH — move the top of the primary stack to the other stack
            0x0f => {
                let v = self.primary(ret, keep).pop(short)?;
                self.secondary(ret).push(v, short)?;
            }

            // LDZ — zero-page load
            0x10 => {
                let a = self.primary(ret, keep).pop8()?;
                let v = self.mem_load(u16::from(a), short);
                self.primary(ret, keep).push(v, short)?;
            }

            // STZ — zero-page store
            0x11 => {
                let (a, v) = {
                    let mut s = self.primary(ret, keep);
                    (s.pop8()?, s.pop(short)?)
                };
                self.mem_store(u16::from(a), v, short);
            }

            // LDR — load relative to the program counter
            0x12 => {
                let d = self.primary(ret, keep).pop8()?;
                let v = self.mem_load(relative(self.ram.pc, d), short);
                self.primary(ret, keep).push(v, short)?;
            }

            // STR — store relative to the program counter
            0x13 => {
                let (d, v) = {
                    let mut s = self.primary(ret, keep);
                    (s.pop8()?, s.pop(short)?)
                };
                self.mem_store(relative(self.ram.pc, d), v, short);
            }

            // LDA — absolute load
            0x14 => {
                let a = self.primary(ret, keep).pop16()?;
                let v = self.mem_load(a, short);
                self.primary(ret, keep).push(v, short)?;
            }

            // STA — absolute store
            0x15 => {
                let (a, v) = {
                    let mut s = self.primary(ret, keep);
                    (s.pop16()?, s.pop(short)?)
                };
                self.mem_store(a, v, short);
            }

            // DEI — device input
            0x16 => {
                let port = self.primary(ret, keep).pop8()?;
                let dev = usize::from(port >> 4);
                let v = if short {
                    let hi = self.dev_peek(dev, port);
                    let lo = self.dev_peek(dev, port.wrapping_add(1));
                    u16::from_be_bytes([hi, lo])
                } else {
                    u16::from(self.dev_peek(dev, port))
                };
                self.primary(ret, keep).push(v, short)?;
            }

            // DEO — device output; a short lands high byte first, with
            // one callback per byte
            0x17 => {
                let (port, v) = {
                    let mut s = self.primary(ret, keep);
                    (s.pop8()?, s.pop(short)?)
                };
                let dev = usize::from(port >> 4);
                if short {
                    self.dev_poke(dev, port, (v >> 8) as u8);
                    self.dev_poke(dev, port.wrapping_add(1), v as u8);
                } else {
                    self.dev_poke(dev, port, v as u8);
                }
            }

            // ADD SUB MUL DIV — modular arithmetic; division by zero
            // yields zero rather than faulting
            0x18 => self.binary(ret, keep, short, |b, a| b.wrapping_add(a))?,
            0x19 => self.binary(ret, keep, short, |b, a| b.wrapping_sub(a))?,
            0x1a => self.binary(ret, keep, short, |b, a| b.wrapping_mul(a))?,
            0x1b => self.binary(ret, keep, short, |b, a| if a == 0 { 0 } else { b / a })?,

            // AND ORA EOR
            0x1c => self.binary(ret, keep, short, |b, a| b & a)?,
            0x1d => self.binary(ret, keep, short, |b, a| b | a)?,
            0x1e => self.binary(ret, keep, short, |b, a| b ^ a)?,

            // SFT — low nibble shifts right, high nibble shifts left;
            // in short mode the control word's low byte carries the nibbles
            0x1f => {
                let mut s = self.primary(ret, keep);
                let ctrl = s.pop(short)?;
                let v = s.pop(short)?;
                let r = (u32::from(v) >> (ctrl & 0x0f)) << ((ctrl >> 4) & 0x0f);
                s.push(r as u16, short)?;
            }

            _ => unreachable!(),
        }

        Ok(())
    }
}

impl Default for Uxn {
    fn default() -> Self {
        Self::new()
    }
}
