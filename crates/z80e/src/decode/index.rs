// DD xx / FD xx: HL replaced by IX or IY, (HL) by (IX+d) or (IY+d).
// DD CB d xx / FD CB d xx: bit operations on (IX+d) or (IY+d).

use z80e_core::MemoryBus;

use super::{bit_instruction, unknown, Handler, BASE, INDEX_CB};
use crate::alu::{AluOp, WordOp};
use crate::{Context, Index, Loc8, Reg16, Reg8, Z80};

pub(super) const fn table() -> [Handler; 256] {
    build_table!(entry)
}

pub(super) const fn bit_table() -> [Handler; 256] {
    build_table!(bit_entry)
}

const fn entry(op: u8) -> Handler {
    match op {
        0x09 | 0x19 | 0x29 | 0x39 => add_idx_rp,
        0x21 => ld_idx_nn,
        0x22 => ld_nn_idx,
        0x23 => inc_idx,
        0x2A => ld_idx_nn_ind,
        0x2B => dec_idx,
        0x34 => inc_mem,
        0x35 => dec_mem,
        0x36 => ld_mem_n,
        0x76 => unprefixed,
        0x70..=0x77 => ld_mem_r,
        0x40..=0x7F if op & 7 == 6 => ld_r_mem,
        0x80..=0xBF if op & 7 == 6 => alu_mem,
        0xCB => prefix_cb,
        0xE1 => pop_idx,
        0xE3 => ex_sp_idx,
        0xE5 => push_idx,
        0xE9 => jp_idx,
        0xF9 => ld_sp_idx,
        0xDD | 0xED | 0xFD => chained_prefix,
        _ if uses_h_or_l(op) => unknown,
        _ => unprefixed,
    }
}

/// Opcodes that would address the undocumented IXH/IXL/IYH/IYL halves.
const fn uses_h_or_l(op: u8) -> bool {
    let y = (op >> 3) & 7;
    let z = op & 7;
    match op {
        0x24 | 0x25 | 0x26 | 0x2C | 0x2D | 0x2E => true,
        0x40..=0x7F => y == 4 || y == 5 || z == 4 || z == 5,
        0x80..=0xBF => z == 4 || z == 5,
        _ => false,
    }
}

const fn bit_entry(op: u8) -> Handler {
    // Solo las formas documentadas: operando (IX+d), y BIT n con cualquier z
    if op & 7 == 6 || op >> 6 == 1 {
        index_bit
    } else {
        unknown
    }
}

// --- Helpers ---

#[inline]
fn idx(cpu: &Z80) -> u16 {
    cpu.regs.get16(cpu.index.reg())
}

/// Fetches `d` and returns IX+d / IY+d.
#[inline]
fn displaced(cpu: &mut Z80, bus: &mut dyn MemoryBus) -> u16 {
    let d = cpu.fetch(bus) as i8;
    idx(cpu).wrapping_add(d as i16 as u16)
}

/// The prefix has no effect on this opcode.
fn unprefixed(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    BASE[op as usize](cpu, bus, op);
}

/// DD/FD followed by another prefix: the first one is a NOP and the next
/// byte is decoded again from scratch.
fn chained_prefix(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    tracing::debug!(
        context = %cpu.context,
        next = format_args!("{:02X}", op),
        "index prefix ignored"
    );
    cpu.regs.pc = cpu.regs.pc.wrapping_sub(1);
}

fn prefix_cb(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    // El desplazamiento va antes del opcode
    let addr = displaced(cpu, bus);
    let op = cpu.fetch(bus);
    cpu.index_addr = addr;
    cpu.context = match cpu.index {
        Index::IX => Context::DdCb,
        Index::IY => Context::FdCb,
    };
    cpu.opcode = op;
    INDEX_CB[op as usize](cpu, bus, op);
}

fn index_bit(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let target = Loc8::Mem(cpu.index_addr);
    bit_instruction(cpu, bus, target, op);
}

// --- 16-bit ---

fn ld_idx_nn(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.regs.set16(cpu.index.reg(), nn);
}

fn ld_nn_idx(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.fetch_u16(bus);
    bus.write_u16_le(addr, idx(cpu));
}

fn ld_idx_nn_ind(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.fetch_u16(bus);
    let v = bus.read_u16_le(addr);
    cpu.regs.set16(cpu.index.reg(), v);
}

fn inc_idx(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.apply_word(cpu.index.reg(), 0, WordOp::Inc);
}

fn dec_idx(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.apply_word(cpu.index.reg(), 0, WordOp::Dec);
}

fn add_idx_rp(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    let reg = cpu.index.reg();
    // ADD IX,IX en lugar de ADD IX,HL
    let src = match Reg16::rp(op >> 4) {
        Reg16::HL => reg,
        other => other,
    };
    let v = cpu.regs.get16(src);
    cpu.apply_word(reg, v, WordOp::Add);
}

fn ld_sp_idx(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.sp = idx(cpu);
}

fn push_idx(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let v = idx(cpu);
    cpu.push(bus, v);
}

fn pop_idx(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let v = cpu.pop(bus);
    cpu.regs.set16(cpu.index.reg(), v);
}

fn ex_sp_idx(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let sp = cpu.regs.sp;
    let v = bus.read_u16_le(sp);
    bus.write_u16_le(sp, idx(cpu));
    cpu.regs.set16(cpu.index.reg(), v);
}

fn jp_idx(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.pc = idx(cpu);
}

// --- (IX+d) ---

fn ld_r_mem(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = displaced(cpu, bus);
    let v = bus.read(addr);
    if let Some(r) = Reg8::decode(op >> 3) {
        cpu.regs.set8(r, v);
    }
}

fn ld_mem_r(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = displaced(cpu, bus);
    if let Some(r) = Reg8::decode(op) {
        bus.write(addr, cpu.regs.get8(r));
    }
}

fn ld_mem_n(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = displaced(cpu, bus);
    let n = cpu.fetch(bus);
    bus.write(addr, n);
}

fn inc_mem(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = displaced(cpu, bus);
    cpu.apply_byte(bus, Loc8::Mem(addr), 0, AluOp::Inc);
}

fn dec_mem(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = displaced(cpu, bus);
    cpu.apply_byte(bus, Loc8::Mem(addr), 0, AluOp::Dec);
}

fn alu_mem(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = displaced(cpu, bus);
    let v = bus.read(addr);
    cpu.apply_byte(bus, Loc8::Reg(Reg8::A), v, AluOp::accumulator(op >> 3));
}
