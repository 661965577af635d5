// Unprefixed opcodes.

use z80e_core::MemoryBus;

use super::{nop, Handler, CB, ED, INDEX};
use crate::alu::{self, AluOp, WordOp};
use crate::flags::{C, H, N, P, S, Z};
use crate::{Context, Index, Loc8, Reg16, Reg8, Z80};

pub(super) const fn table() -> [Handler; 256] {
    build_table!(entry)
}

const fn entry(op: u8) -> Handler {
    match op {
        0x00 => nop,
        0x76 => halt,
        0x40..=0x7F => ld_r_r,
        0x80..=0xBF => alu_r,
        _ => match op & 0xC7 {
            0x04 => inc_r,
            0x05 => dec_r,
            0x06 => ld_r_n,
            0xC0 => ret_cc,
            0xC2 => jp_cc,
            0xC4 => call_cc,
            0xC6 => alu_n,
            0xC7 => rst,
            _ => match op & 0xCF {
                0x01 => ld_rp_nn,
                0x03 => inc_rp,
                0x0B => dec_rp,
                0x09 => add_hl_rp,
                0xC1 => pop_rp,
                0xC5 => push_rp,
                _ => single(op),
            },
        },
    }
}

const fn single(op: u8) -> Handler {
    match op {
        0x02 | 0x12 => ld_ind_a,
        0x0A | 0x1A => ld_a_ind,
        0x07 | 0x0F | 0x17 | 0x1F => rotate_a,
        0x08 => ex_af,
        0x10 => djnz,
        0x18 => jr,
        0x20 | 0x28 | 0x30 | 0x38 => jr_cc,
        0x22 => ld_nn_hl,
        0x2A => ld_hl_nn,
        0x27 => daa,
        0x2F => cpl,
        0x32 => ld_nn_a,
        0x3A => ld_a_nn,
        0x37 => scf,
        0x3F => ccf,
        0xC3 => jp,
        0xC9 => ret,
        0xCB => prefix_cb,
        0xCD => call,
        0xD3 => out_n_a,
        0xD9 => exx,
        0xDB => in_a_n,
        0xDD | 0xFD => prefix_index,
        0xE3 => ex_sp_hl,
        0xE9 => jp_hl,
        0xEB => ex_de_hl,
        0xED => prefix_ed,
        0xF3 => di,
        0xF9 => ld_sp_hl,
        0xFB => ei,
        _ => nop,
    }
}

// --- Prefixes ---

fn prefix_cb(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let op = cpu.fetch_opcode(bus);
    cpu.context = Context::Cb;
    cpu.opcode = op;
    CB[op as usize](cpu, bus, op);
}

fn prefix_ed(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let op = cpu.fetch_opcode(bus);
    cpu.context = Context::Ed;
    cpu.opcode = op;
    ED[op as usize](cpu, bus, op);
}

fn prefix_index(cpu: &mut Z80, bus: &mut dyn MemoryBus, prefix: u8) {
    let (index, context) = if prefix == 0xDD {
        (Index::IX, Context::Dd)
    } else {
        (Index::IY, Context::Fd)
    };
    let op = cpu.fetch_opcode(bus);
    cpu.index = index;
    cpu.context = context;
    cpu.opcode = op;
    INDEX[op as usize](cpu, bus, op);
}

// --- 8-bit loads ---

fn ld_r_r(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let src = cpu.loc(op);
    let dst = cpu.loc(op >> 3);
    let v = cpu.read_loc(bus, src);
    cpu.write_loc(bus, dst, v);
}

fn ld_r_n(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let n = cpu.fetch(bus);
    let dst = cpu.loc(op >> 3);
    cpu.write_loc(bus, dst, n);
}

fn ld_ind_a(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = if op == 0x02 { cpu.regs.bc() } else { cpu.regs.de() };
    bus.write(addr, cpu.regs.a);
}

fn ld_a_ind(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = if op == 0x0A { cpu.regs.bc() } else { cpu.regs.de() };
    cpu.regs.a = bus.read(addr);
}

fn ld_nn_a(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.fetch_u16(bus);
    bus.write(addr, cpu.regs.a);
}

fn ld_a_nn(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.fetch_u16(bus);
    cpu.regs.a = bus.read(addr);
}

// --- 16-bit loads ---

fn ld_rp_nn(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.regs.set16(Reg16::rp(op >> 4), nn);
}

fn ld_nn_hl(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.fetch_u16(bus);
    bus.write_u16_le(addr, cpu.regs.hl());
}

fn ld_hl_nn(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.fetch_u16(bus);
    let v = bus.read_u16_le(addr);
    cpu.regs.set_hl(v);
}

fn ld_sp_hl(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.sp = cpu.regs.hl();
}

fn push_rp(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let v = cpu.regs.get16(Reg16::rp2(op >> 4));
    cpu.push(bus, v);
}

fn pop_rp(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let v = cpu.pop(bus);
    cpu.regs.set16(Reg16::rp2(op >> 4), v);
}

// --- Exchanges ---

fn ex_af(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.ex_af();
}

fn exx(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.exx();
}

fn ex_de_hl(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    let de = cpu.regs.de();
    let hl = cpu.regs.hl();
    cpu.regs.set_de(hl);
    cpu.regs.set_hl(de);
}

fn ex_sp_hl(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let sp = cpu.regs.sp;
    let v = bus.read_u16_le(sp);
    bus.write_u16_le(sp, cpu.regs.hl());
    cpu.regs.set_hl(v);
}

// --- 8-bit arithmetic ---

fn alu_r(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let src = cpu.loc(op);
    let v = cpu.read_loc(bus, src);
    cpu.apply_byte(bus, Loc8::Reg(Reg8::A), v, AluOp::accumulator(op >> 3));
}

fn alu_n(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let n = cpu.fetch(bus);
    cpu.apply_byte(bus, Loc8::Reg(Reg8::A), n, AluOp::accumulator(op >> 3));
}

fn inc_r(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let dst = cpu.loc(op >> 3);
    cpu.apply_byte(bus, dst, 0, AluOp::Inc);
}

fn dec_r(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let dst = cpu.loc(op >> 3);
    cpu.apply_byte(bus, dst, 0, AluOp::Dec);
}

fn daa(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    let (a, f) = alu::daa(cpu.regs.a, cpu.regs.f);
    cpu.regs.a = a;
    cpu.regs.f = f;
}

fn cpl(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.a = !cpu.regs.a;
    cpu.regs.raise(H | N);
}

fn scf(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.f = (cpu.regs.f & (S | Z | P)) | C;
}

fn ccf(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    // H recibe el carry anterior
    let old_c = cpu.regs.flag(C);
    let mut f = cpu.regs.f & (S | Z | P);
    if old_c { f |= H; } else { f |= C; }
    cpu.regs.f = f;
}

/// RLCA, RRCA, RLA, RRA: like the CB forms but S, Z and P/V survive.
fn rotate_a(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    let alu = match (op >> 3) & 3 {
        0 => AluOp::Rlc,
        1 => AluOp::Rrc,
        2 => AluOp::Rl,
        _ => AluOp::Rr,
    };
    let (r, f) = alu::byte(alu, cpu.regs.a, 0, cpu.regs.f);
    if let Some(r) = r {
        cpu.regs.a = r;
    }
    cpu.regs.f = (cpu.regs.f & (S | Z | P)) | (f & C);
}

// --- 16-bit arithmetic ---

fn add_hl_rp(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    let v = cpu.regs.get16(Reg16::rp(op >> 4));
    cpu.apply_word(Reg16::HL, v, WordOp::Add);
}

fn inc_rp(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    cpu.apply_word(Reg16::rp(op >> 4), 0, WordOp::Inc);
}

fn dec_rp(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    cpu.apply_word(Reg16::rp(op >> 4), 0, WordOp::Dec);
}

// --- Jumps, calls, returns ---

fn jp(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.pc = cpu.fetch_u16(bus);
}

fn jp_cc(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let nn = cpu.fetch_u16(bus);
    if cpu.condition(op >> 3) {
        cpu.regs.pc = nn;
    }
}

fn jp_hl(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.pc = cpu.regs.hl();
}

fn relative(cpu: &mut Z80, d: u8) {
    cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i8 as i16 as u16);
}

fn jr(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let d = cpu.fetch(bus);
    relative(cpu, d);
}

fn jr_cc(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let d = cpu.fetch(bus);
    // Solo NZ, Z, NC, C
    if cpu.condition((op >> 3) & 3) {
        relative(cpu, d);
    }
}

fn djnz(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let d = cpu.fetch(bus);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    if cpu.regs.b != 0 {
        relative(cpu, d);
    }
}

fn call(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.call(bus, nn);
}

fn call_cc(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let nn = cpu.fetch_u16(bus);
    if cpu.condition(op >> 3) {
        cpu.call(bus, nn);
    }
}

fn ret(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    cpu.ret(bus);
}

fn ret_cc(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    if cpu.condition(op >> 3) {
        cpu.ret(bus);
    }
}

fn rst(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    cpu.call(bus, (op & 0x38) as u16);
}

// --- I/O ---

fn out_n_a(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let n = cpu.fetch(bus);
    let port = ((cpu.regs.a as u16) << 8) | n as u16;
    bus.port_out(port, cpu.regs.a);
}

fn in_a_n(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let n = cpu.fetch(bus);
    let port = ((cpu.regs.a as u16) << 8) | n as u16;
    cpu.regs.a = bus.port_in(port);
}

// --- Control ---

fn halt(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.halted = true;
    tracing::debug!(pc = format_args!("{:04X}", cpu.regs.pc.wrapping_sub(1)), "HALT");
}

fn di(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.iff1 = false;
    cpu.iff2 = false;
    cpu.ei_pending = false;
}

fn ei(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.ei_pending = true;
}
