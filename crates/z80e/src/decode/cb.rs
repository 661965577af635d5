// CB xx: rotates, shifts and bit operations on r / (HL).

use z80e_core::MemoryBus;

use super::{bit_instruction, unknown, Handler};
use crate::Z80;

pub(super) const fn table() -> [Handler; 256] {
    build_table!(entry)
}

const fn entry(op: u8) -> Handler {
    match op {
        0x30..=0x37 => unknown, // SLL
        _ => cb_op,
    }
}

fn cb_op(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let target = cpu.loc(op);
    bit_instruction(cpu, bus, target, op);
}
