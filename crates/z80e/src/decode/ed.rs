// ED xx: extended loads, 16-bit carry arithmetic, interrupt control,
// block transfer/search/I/O.

use z80e_core::MemoryBus;

use super::{unknown, Handler};
use crate::alu::{self, szp, WordOp};
use crate::flags::{C, H, N, P, S, Z};
use crate::{InterruptMode, Reg16, Z80};

pub(super) const fn table() -> [Handler; 256] {
    build_table!(entry)
}

const fn entry(op: u8) -> Handler {
    match op {
        // IN F,(C) / OUT (C),0 no documentados
        0x70 | 0x71 => unknown,
        0x40..=0x7F => match op & 7 {
            0 => in_r_c,
            1 => out_c_r,
            2 => if op & 0x08 == 0 { sbc_hl_rp } else { adc_hl_rp },
            3 => if op & 0x08 == 0 { ld_nn_rp } else { ld_rp_nn },
            4 => if op == 0x44 { neg } else { unknown },
            5 => match op {
                0x45 => retn,
                0x4D => reti,
                _ => unknown,
            },
            6 => match op {
                0x46 | 0x56 | 0x5E => im,
                _ => unknown,
            },
            _ => match op {
                0x47 => ld_i_a,
                0x4F => ld_r_a,
                0x57 => ld_a_i,
                0x5F => ld_a_r,
                0x67 => rrd,
                0x6F => rld,
                _ => unknown,
            },
        },
        0xA0..=0xBF if op & 0x04 == 0 => match op & 3 {
            0 => block_ld,
            1 => block_cp,
            2 => block_in,
            _ => block_out,
        },
        _ => unknown,
    }
}

// --- Port I/O on (C) ---

fn in_r_c(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let v = bus.port_in(cpu.regs.bc());
    cpu.regs.f = (cpu.regs.f & C) | szp(v);
    let dst = cpu.loc(op >> 3);
    cpu.write_loc(bus, dst, v);
}

fn out_c_r(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let src = cpu.loc(op >> 3);
    let v = cpu.read_loc(bus, src);
    bus.port_out(cpu.regs.bc(), v);
}

// --- 16-bit ---

fn sbc_hl_rp(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    let v = cpu.regs.get16(Reg16::rp(op >> 4));
    cpu.apply_word(Reg16::HL, v, WordOp::Sbc);
}

fn adc_hl_rp(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    let v = cpu.regs.get16(Reg16::rp(op >> 4));
    cpu.apply_word(Reg16::HL, v, WordOp::Adc);
}

/// LD (nn),rr. The address is fetched once for both bytes.
fn ld_nn_rp(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = cpu.fetch_u16(bus);
    bus.write_u16_le(addr, cpu.regs.get16(Reg16::rp(op >> 4)));
}

fn ld_rp_nn(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let addr = cpu.fetch_u16(bus);
    let v = bus.read_u16_le(addr);
    cpu.regs.set16(Reg16::rp(op >> 4), v);
}

// --- Misc ---

fn neg(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    let (a, f) = alu::neg(cpu.regs.a);
    cpu.regs.a = a;
    cpu.regs.f = f;
}

fn retn(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    cpu.ret_from_interrupt(bus);
}

fn reti(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    cpu.ret_from_interrupt(bus);
}

fn im(cpu: &mut Z80, _bus: &mut dyn MemoryBus, op: u8) {
    cpu.im = match op {
        0x56 => InterruptMode::Mode1,
        0x5E => InterruptMode::Mode2,
        _ => InterruptMode::Mode0,
    };
}

fn ld_i_a(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.i = cpu.regs.a;
}

fn ld_r_a(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    cpu.regs.r = cpu.regs.a;
}

fn ld_a_ir(cpu: &mut Z80, v: u8) {
    cpu.regs.a = v;
    let mut f = (cpu.regs.f & C) | (v & S);
    if v == 0 { f |= Z; }
    if cpu.iff2 { f |= P; }
    cpu.regs.f = f;
}

fn ld_a_i(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    let i = cpu.regs.i;
    ld_a_ir(cpu, i);
}

fn ld_a_r(cpu: &mut Z80, _bus: &mut dyn MemoryBus, _op: u8) {
    let r = cpu.regs.r;
    ld_a_ir(cpu, r);
}

fn rrd(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.regs.hl();
    let m = bus.read(addr);
    let a = cpu.regs.a;
    bus.write(addr, (a << 4) | (m >> 4));
    cpu.regs.a = (a & 0xF0) | (m & 0x0F);
    cpu.regs.f = (cpu.regs.f & C) | szp(cpu.regs.a);
}

fn rld(cpu: &mut Z80, bus: &mut dyn MemoryBus, _op: u8) {
    let addr = cpu.regs.hl();
    let m = bus.read(addr);
    let a = cpu.regs.a;
    bus.write(addr, (m << 4) | (a & 0x0F));
    cpu.regs.a = (a & 0xF0) | (m >> 4);
    cpu.regs.f = (cpu.regs.f & C) | szp(cpu.regs.a);
}

// --- Block instructions ---
// Bit 3: decrement. Bit 4: repeat, done by rewinding PC onto the prefix
// so the next step runs the instruction again.

struct Block {
    step: u16,
    repeat: bool,
}

fn block(op: u8) -> Block {
    Block {
        step: if op & 0x08 == 0 { 1 } else { 0xFFFF },
        repeat: op & 0x10 != 0,
    }
}

fn again(cpu: &mut Z80) {
    cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
}

fn block_ld(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let b = block(op);
    let v = bus.read(cpu.regs.hl());
    bus.write(cpu.regs.de(), v);
    cpu.regs.set_hl(cpu.regs.hl().wrapping_add(b.step));
    cpu.regs.set_de(cpu.regs.de().wrapping_add(b.step));
    let bc = cpu.regs.bc().wrapping_sub(1);
    cpu.regs.set_bc(bc);

    let mut f = cpu.regs.f & (S | Z | C);
    if bc != 0 { f |= P; }
    cpu.regs.f = f;

    if b.repeat && bc != 0 {
        again(cpu);
    }
}

fn block_cp(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let b = block(op);
    let v = bus.read(cpu.regs.hl());
    let a = cpu.regs.a;
    let r = a.wrapping_sub(v);
    cpu.regs.set_hl(cpu.regs.hl().wrapping_add(b.step));
    let bc = cpu.regs.bc().wrapping_sub(1);
    cpu.regs.set_bc(bc);

    let mut f = (cpu.regs.f & C) | (r & S) | N;
    if r == 0 { f |= Z; }
    if (a & 0x0F) < (v & 0x0F) { f |= H; }
    if bc != 0 { f |= P; }
    cpu.regs.f = f;

    if b.repeat && bc != 0 && r != 0 {
        again(cpu);
    }
}

fn block_io_flags(cpu: &mut Z80) {
    let b = cpu.regs.b;
    let mut f = (cpu.regs.f & C) | (b & S) | N;
    if b == 0 { f |= Z; }
    cpu.regs.f = f;
}

fn block_in(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let b = block(op);
    let v = bus.port_in(cpu.regs.bc());
    bus.write(cpu.regs.hl(), v);
    cpu.regs.set_hl(cpu.regs.hl().wrapping_add(b.step));
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    block_io_flags(cpu);

    if b.repeat && cpu.regs.b != 0 {
        again(cpu);
    }
}

fn block_out(cpu: &mut Z80, bus: &mut dyn MemoryBus, op: u8) {
    let b = block(op);
    let v = bus.read(cpu.regs.hl());
    // B se decrementa antes de poner el puerto en el bus
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    bus.port_out(cpu.regs.bc(), v);
    cpu.regs.set_hl(cpu.regs.hl().wrapping_add(b.step));
    block_io_flags(cpu);

    if b.repeat && cpu.regs.b != 0 {
        again(cpu);
    }
}
