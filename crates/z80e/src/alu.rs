//! Pure arithmetic/logic. Every function takes the incoming flag byte and
//! returns the new one; nothing here touches the CPU.

use crate::flags::{C, H, N, P, S, Z};

/// 8-bit operation applied to a destination byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
    Inc,
    Dec,
    Rlc,
    Rl,
    Rrc,
    Rr,
    Sla,
    Sra,
    Srl,
    Bit(u8),
    Set(u8),
    Res(u8),
}

impl AluOp {
    /// The `alu[y]` group of `ADD A,r` .. `CP r` (bits 3-5 of the opcode).
    pub const fn accumulator(code: u8) -> AluOp {
        match code & 7 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

/// 16-bit operation applied to a register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOp {
    Add,
    Adc,
    Sub,
    Sbc,
    Inc,
    Dec,
}

#[inline]
pub fn parity(v: u8) -> bool {
    v.count_ones() % 2 == 0
}

/// S, Z and parity from a result byte.
#[inline]
pub fn szp(v: u8) -> u8 {
    let mut f = v & S;
    if v == 0 { f |= Z; }
    if parity(v) { f |= P; }
    f
}

#[inline]
fn sz(v: u8) -> u8 {
    (v & S) | if v == 0 { Z } else { 0 }
}

/// Applies `op`. Returns the value to write back (`None` for CP and BIT)
/// and the new flags.
pub fn byte(op: AluOp, dst: u8, operand: u8, flags: u8) -> (Option<u8>, u8) {
    let carry = flags & C;
    match op {
        AluOp::Add => wrap(add8(dst, operand, 0)),
        AluOp::Adc => wrap(add8(dst, operand, carry)),
        AluOp::Sub => wrap(sub8(dst, operand, 0)),
        AluOp::Sbc => wrap(sub8(dst, operand, carry)),
        AluOp::Cp => (None, sub8(dst, operand, 0).1),
        AluOp::And => {
            let r = dst & operand;
            (Some(r), szp(r) | H)
        }
        AluOp::Or => {
            let r = dst | operand;
            (Some(r), szp(r))
        }
        AluOp::Xor => {
            let r = dst ^ operand;
            (Some(r), szp(r))
        }
        AluOp::Inc => {
            let r = dst.wrapping_add(1);
            let mut f = carry | sz(r);
            if dst & 0x0F == 0x0F { f |= H; }
            if dst == 0x7F { f |= P; }
            (Some(r), f)
        }
        AluOp::Dec => {
            let r = dst.wrapping_sub(1);
            let mut f = carry | sz(r) | N;
            if dst & 0x0F == 0x00 { f |= H; }
            if dst == 0x80 { f |= P; }
            (Some(r), f)
        }
        AluOp::Rlc => shifted(dst.rotate_left(1), dst >> 7),
        AluOp::Rl => shifted((dst << 1) | carry, dst >> 7),
        AluOp::Rrc => shifted(dst.rotate_right(1), dst & 1),
        AluOp::Rr => shifted((dst >> 1) | (carry << 7), dst & 1),
        AluOp::Sla => shifted(dst << 1, dst >> 7),
        AluOp::Sra => shifted((dst >> 1) | (dst & 0x80), dst & 1),
        AluOp::Srl => shifted(dst >> 1, dst & 1),
        AluOp::Bit(n) => {
            let set = dst & (1 << (n & 7)) != 0;
            let mut f = carry | H;
            if !set { f |= Z | P; }
            if set && n == 7 { f |= S; }
            (None, f)
        }
        AluOp::Set(n) => (Some(dst | (1 << (n & 7))), flags),
        AluOp::Res(n) => (Some(dst & !(1 << (n & 7))), flags),
    }
}

#[inline]
fn wrap((r, f): (u8, u8)) -> (Option<u8>, u8) {
    (Some(r), f)
}

#[inline]
fn shifted(r: u8, out: u8) -> (Option<u8>, u8) {
    (Some(r), szp(r) | (out & C))
}

fn add8(a: u8, b: u8, c: u8) -> (u8, u8) {
    let wide = a as u16 + b as u16 + c as u16;
    let r = wide as u8;
    let mut f = sz(r);
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F { f |= H; }
    if (!(a ^ b) & (a ^ r) & 0x80) != 0 { f |= P; }
    if wide > 0xFF { f |= C; }
    (r, f)
}

fn sub8(a: u8, b: u8, c: u8) -> (u8, u8) {
    let wide = a as i16 - b as i16 - c as i16;
    let r = wide as u8;
    let mut f = sz(r) | N;
    if (a & 0x0F) as i16 - (b & 0x0F) as i16 - (c as i16) < 0 { f |= H; }
    if ((a ^ b) & (a ^ r) & 0x80) != 0 { f |= P; }
    if wide < 0 { f |= C; }
    (r, f)
}

/// Applies a 16-bit `op`. INC/DEC leave the flags alone.
pub fn word(op: WordOp, dst: u16, operand: u16, flags: u8) -> (u16, u8) {
    let carry = (flags & C) as u32;
    match op {
        WordOp::Add => {
            let wide = dst as u32 + operand as u32;
            let mut f = flags & (S | Z | P);
            if (dst & 0x0FFF) as u32 + (operand & 0x0FFF) as u32 > 0x0FFF { f |= H; }
            if wide > 0xFFFF { f |= C; }
            (wide as u16, f)
        }
        WordOp::Adc => {
            let wide = dst as u32 + operand as u32 + carry;
            let r = wide as u16;
            let mut f = word_sz(r);
            if (dst & 0x0FFF) as u32 + (operand & 0x0FFF) as u32 + carry > 0x0FFF { f |= H; }
            if (!(dst ^ operand) & (dst ^ r) & 0x8000) != 0 { f |= P; }
            if wide > 0xFFFF { f |= C; }
            (r, f)
        }
        WordOp::Sub | WordOp::Sbc => {
            let c = if op == WordOp::Sbc { carry as i32 } else { 0 };
            let wide = dst as i32 - operand as i32 - c;
            let r = wide as u16;
            let mut f = word_sz(r) | N;
            if (dst & 0x0FFF) as i32 - (operand & 0x0FFF) as i32 - c < 0 { f |= H; }
            if ((dst ^ operand) & (dst ^ r) & 0x8000) != 0 { f |= P; }
            if wide < 0 { f |= C; }
            (r, f)
        }
        WordOp::Inc => (dst.wrapping_add(1), flags),
        WordOp::Dec => (dst.wrapping_sub(1), flags),
    }
}

#[inline]
fn word_sz(v: u16) -> u8 {
    (if v & 0x8000 != 0 { S } else { 0 }) | if v == 0 { Z } else { 0 }
}

/// DAA: corrects A after a BCD add or subtract.
pub fn daa(a: u8, flags: u8) -> (u8, u8) {
    let mut diff = 0u8;
    let mut carry = flags & C != 0;
    let half = flags & H != 0;
    let sub = flags & N != 0;

    if half || (a & 0x0F) > 9 {
        diff |= 0x06;
    }
    if carry || a > 0x99 {
        diff |= 0x60;
        carry = true;
    }

    let r = if sub { a.wrapping_sub(diff) } else { a.wrapping_add(diff) };

    let h = if sub {
        half && (a & 0x0F) < 6
    } else {
        (a & 0x0F) > 9
    };

    let mut f = szp(r) | (flags & N);
    if h { f |= H; }
    if carry { f |= C; }
    (r, f)
}

/// NEG is `0 - A`.
pub fn neg(a: u8) -> (u8, u8) {
    sub8(0, a, 0)
}
