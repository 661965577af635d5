//! Opcode dispatch. One 256-entry handler table per decoding context, built
//! at compile time; each handler decodes its own operand fields from the
//! opcode byte it receives.

use z80e_core::MemoryBus;

use crate::{AluOp, Loc8, Z80};

pub(crate) type Handler = fn(&mut Z80, &mut dyn MemoryBus, u8);

/// Fills a table by evaluating the `const fn entry(u8) -> Handler` given.
macro_rules! build_table {
    ($entry:path) => {{
        let mut table = [$crate::decode::nop as $crate::decode::Handler; 256];
        let mut op = 0;
        while op < 256 {
            table[op] = $entry(op as u8);
            op += 1;
        }
        table
    }};
}

mod base;
mod cb;
mod ed;
mod index;

pub(crate) static BASE: [Handler; 256] = base::table();
pub(crate) static CB: [Handler; 256] = cb::table();
pub(crate) static ED: [Handler; 256] = ed::table();
pub(crate) static INDEX: [Handler; 256] = index::table();
pub(crate) static INDEX_CB: [Handler; 256] = index::bit_table();

pub(crate) fn nop(_cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {}

pub(crate) fn unknown(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    cpu.unknown(op);
}

/// Rotate/shift/BIT/RES/SET group of the CB and index-CB tables.
/// `None` for the undocumented SLL row.
const fn bit_op(op: u8) -> Option<AluOp> {
    let y = (op >> 3) & 7;
    match op >> 6 {
        0 => match y {
            0 => Some(AluOp::Rlc),
            1 => Some(AluOp::Rrc),
            2 => Some(AluOp::Rl),
            3 => Some(AluOp::Rr),
            4 => Some(AluOp::Sla),
            5 => Some(AluOp::Sra),
            6 => None,
            _ => Some(AluOp::Srl),
        },
        1 => Some(AluOp::Bit(y)),
        2 => Some(AluOp::Res(y)),
        _ => Some(AluOp::Set(y)),
    }
}

/// Resolves nothing itself: the caller picks the target (`r`, `(HL)` or
/// `(IX+d)`), this applies the bit operation to it.
fn bit_instruction(cpu: &mut Z80, bus: &mut dyn MemoryBus, target: Loc8, op: u8) {
    match bit_op(op) {
        Some(alu) => cpu.apply_byte(bus, target, 0, alu),
        None => cpu.unknown(op),
    }
}
