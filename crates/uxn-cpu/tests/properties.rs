//! Randomized contract sweeps over the full opcode space.
//!
//! Seeded rather than time-based so failures reproduce. Devices hold
//! the default callback that ignores traffic, which makes device
//! access behave like page memory.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uxn_cpu::{FaultKind, StackId, Uxn};

/// Where the opcode under test is placed: mid-page, so relative loads
/// and stores with any displacement stay inside the randomized region.
const TEST_PC: u16 = 0x0180;

/// Build a machine with randomized stacks and a randomized window of
/// RAM around the test address, with the opcode at `TEST_PC`.
fn random_machine(rng: &mut StdRng, op: u8) -> Uxn {
    let mut u = Uxn::new();

    let wst_depth = rng.random_range(0..=256);
    for _ in 0..wst_depth {
        u.wst.push8(rng.random()).expect("fill fits");
    }
    let rst_depth = rng.random_range(0..=256);
    for _ in 0..rst_depth {
        u.rst.push8(rng.random()).expect("fill fits");
    }

    let window: Vec<u8> = (0..0x0300).map(|_| rng.random()).collect();
    u.ram.load(0x0000, &window);
    u.ram.poke8(TEST_PC, op);
    u.ram.pc = TEST_PC;
    u
}

/// Copy of a machine's observable state for comparison.
fn mirror_of(u: &Uxn) -> (Vec<u8>, Vec<u8>) {
    (u.wst.contents().to_vec(), u.rst.contents().to_vec())
}

/// Every opcode, from any state, either completes with both error
/// registers clear or faults with exactly one register set, matching
/// the returned diagnostic.
#[test]
fn every_opcode_steps_or_faults_cleanly() {
    let mut rng = StdRng::seed_from_u64(0x1f0a);
    for op in 0..=255u8 {
        for _ in 0..16 {
            let mut u = random_machine(&mut rng, op);
            match u.step() {
                Ok(()) => {
                    assert_eq!(u.wst.error, 0, "op {op:#04x}: healthy step, wst error");
                    assert_eq!(u.rst.error, 0, "op {op:#04x}: healthy step, rst error");
                }
                Err(fault) => {
                    assert_eq!(fault.opcode, op);
                    let expected = match fault.kind {
                        FaultKind::Underflow => 1,
                        FaultKind::Overflow => 2,
                    };
                    let (faulted, other) = match fault.stack {
                        StackId::Working => (u.wst.error, u.rst.error),
                        StackId::Return => (u.rst.error, u.wst.error),
                    };
                    assert_eq!(faulted, expected, "op {op:#04x}: error register");
                    assert_eq!(other, 0, "op {op:#04x}: only one stack faults");
                }
            }
        }
    }
}

/// The return-mode variant of any opcode is the same opcode with the
/// two stacks interchanged, including fault attribution.
#[test]
fn return_mode_mirrors_the_stacks() {
    let mut rng = StdRng::seed_from_u64(0x2b5d);
    for base in (0..=255u8).filter(|op| op & 0x40 == 0) {
        for _ in 0..4 {
            let seed: u64 = rng.random();

            let mut plain = random_machine(&mut StdRng::seed_from_u64(seed), base);
            let mut swapped = random_machine(&mut StdRng::seed_from_u64(seed), base | 0x40);
            std::mem::swap(&mut swapped.wst, &mut swapped.rst);

            let r1 = plain.step();
            let r2 = swapped.step();

            match (r1, r2) {
                (Ok(()), Ok(())) => {}
                (Err(f1), Err(f2)) => {
                    assert_eq!(f1.stack.other(), f2.stack, "op {base:#04x}: fault stack");
                    assert_eq!(f1.kind, f2.kind, "op {base:#04x}: fault kind");
                    assert_eq!(f1.pc, f2.pc, "op {base:#04x}: fault pc");
                }
                (r1, r2) => panic!("op {base:#04x}: outcomes diverge: {r1:?} vs {r2:?}"),
            }

            let (wst1, rst1) = mirror_of(&plain);
            let (wst2, rst2) = mirror_of(&swapped);
            assert_eq!(wst1, rst2, "op {base:#04x}: working vs mirrored return");
            assert_eq!(rst1, wst2, "op {base:#04x}: return vs mirrored working");
            assert_eq!(plain.ram.pc, swapped.ram.pc, "op {base:#04x}: pc");

            for addr in 0..=0xffffu16 {
                assert_eq!(
                    plain.ram.peek8(addr),
                    swapped.ram.peek8(addr),
                    "op {base:#04x}: ram at {addr:#06x}"
                );
            }
            for dev in 0..16 {
                assert_eq!(
                    plain.dev[dev].dat, swapped.dev[dev].dat,
                    "op {base:#04x}: device {dev} page"
                );
            }
        }
    }
}

/// Operand/result widths in stack bytes for the pure-stack opcodes.
fn stack_shape(base: u8, short: bool) -> Option<(u16, u16)> {
    let w = if short { 2 } else { 1 };
    Some(match base {
        0x03 => (w, 0),         // POP
        0x04 => (w, 2 * w),     // DUP
        0x05 => (2 * w, 2 * w), // SWP
        0x06 => (2 * w, 3 * w), // OVR
        0x07 => (3 * w, 3 * w), // ROT
        0x08..=0x0b => (2 * w, 1), // comparisons push one byte
        0x18..=0x1f => (2 * w, w), // arithmetic, bitwise, shift
        _ => return None,
    })
}

/// The keep variant leaves its operands untouched and appends exactly
/// the result bytes the plain variant produced in place; bytes below
/// the operand window never change in either form.
#[test]
fn keep_mode_appends_what_plain_mode_produced() {
    let mut rng = StdRng::seed_from_u64(0x3c7e);
    for base in (0x03..=0x1f).filter(|op| stack_shape(*op, false).is_some()) {
        for short in [false, true] {
            let op = base | if short { 0x20 } else { 0 };
            let (pops, pushes) = stack_shape(base, short).expect("filtered above");

            for _ in 0..32 {
                let depth = rng.random_range(pops..=200);
                let fill: Vec<u8> = (0..depth).map(|_| rng.random()).collect();

                let mut plain = Uxn::new();
                let mut kept = Uxn::new();
                for &b in &fill {
                    plain.wst.push8(b).expect("fill fits");
                    kept.wst.push8(b).expect("fill fits");
                }
                plain.ram.poke8(TEST_PC, op);
                plain.ram.pc = TEST_PC;
                kept.ram.poke8(TEST_PC, op | 0x80);
                kept.ram.pc = TEST_PC;

                plain.step().expect("deep enough stack");
                kept.step().expect("deep enough stack");

                let base_len = usize::from(depth - pops);
                let results = &plain.wst.contents()[base_len..];
                assert_eq!(results.len(), usize::from(pushes), "op {op:#04x}: result width");

                assert_eq!(
                    &plain.wst.contents()[..base_len],
                    &fill[..base_len],
                    "op {op:#04x}: bytes below the operand window"
                );
                assert_eq!(
                    &kept.wst.contents()[..usize::from(depth)],
                    &fill[..],
                    "op {op:#04x}: keep leaves operands untouched"
                );
                assert_eq!(
                    &kept.wst.contents()[usize::from(depth)..],
                    results,
                    "op {op:#04x}: keep appends the plain results"
                );
            }
        }
    }
}
