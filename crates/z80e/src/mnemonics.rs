//! Static opcode names for trace output. Operand placeholders: `n` byte,
//! `nn` word, `d` displacement.

use std::borrow::Cow;

use crate::Context;

static BASE: [&str; 256] = [
    "NOP", "LD BC,nn", "LD (BC),A", "INC BC", // 00
    "INC B", "DEC B", "LD B,n", "RLCA", // 04
    "EX AF,AF'", "ADD HL,BC", "LD A,(BC)", "DEC BC", // 08
    "INC C", "DEC C", "LD C,n", "RRCA", // 0C
    "DJNZ d", "LD DE,nn", "LD (DE),A", "INC DE", // 10
    "INC D", "DEC D", "LD D,n", "RLA", // 14
    "JR d", "ADD HL,DE", "LD A,(DE)", "DEC DE", // 18
    "INC E", "DEC E", "LD E,n", "RRA", // 1C
    "JR NZ,d", "LD HL,nn", "LD (nn),HL", "INC HL", // 20
    "INC H", "DEC H", "LD H,n", "DAA", // 24
    "JR Z,d", "ADD HL,HL", "LD HL,(nn)", "DEC HL", // 28
    "INC L", "DEC L", "LD L,n", "CPL", // 2C
    "JR NC,d", "LD SP,nn", "LD (nn),A", "INC SP", // 30
    "INC (HL)", "DEC (HL)", "LD (HL),n", "SCF", // 34
    "JR C,d", "ADD HL,SP", "LD A,(nn)", "DEC SP", // 38
    "INC A", "DEC A", "LD A,n", "CCF", // 3C
    "LD B,B", "LD B,C", "LD B,D", "LD B,E", // 40
    "LD B,H", "LD B,L", "LD B,(HL)", "LD B,A", // 44
    "LD C,B", "LD C,C", "LD C,D", "LD C,E", // 48
    "LD C,H", "LD C,L", "LD C,(HL)", "LD C,A", // 4C
    "LD D,B", "LD D,C", "LD D,D", "LD D,E", // 50
    "LD D,H", "LD D,L", "LD D,(HL)", "LD D,A", // 54
    "LD E,B", "LD E,C", "LD E,D", "LD E,E", // 58
    "LD E,H", "LD E,L", "LD E,(HL)", "LD E,A", // 5C
    "LD H,B", "LD H,C", "LD H,D", "LD H,E", // 60
    "LD H,H", "LD H,L", "LD H,(HL)", "LD H,A", // 64
    "LD L,B", "LD L,C", "LD L,D", "LD L,E", // 68
    "LD L,H", "LD L,L", "LD L,(HL)", "LD L,A", // 6C
    "LD (HL),B", "LD (HL),C", "LD (HL),D", "LD (HL),E", // 70
    "LD (HL),H", "LD (HL),L", "HALT", "LD (HL),A", // 74
    "LD A,B", "LD A,C", "LD A,D", "LD A,E", // 78
    "LD A,H", "LD A,L", "LD A,(HL)", "LD A,A", // 7C
    "ADD A,B", "ADD A,C", "ADD A,D", "ADD A,E", // 80
    "ADD A,H", "ADD A,L", "ADD A,(HL)", "ADD A,A", // 84
    "ADC A,B", "ADC A,C", "ADC A,D", "ADC A,E", // 88
    "ADC A,H", "ADC A,L", "ADC A,(HL)", "ADC A,A", // 8C
    "SUB B", "SUB C", "SUB D", "SUB E", // 90
    "SUB H", "SUB L", "SUB (HL)", "SUB A", // 94
    "SBC A,B", "SBC A,C", "SBC A,D", "SBC A,E", // 98
    "SBC A,H", "SBC A,L", "SBC A,(HL)", "SBC A,A", // 9C
    "AND B", "AND C", "AND D", "AND E", // A0
    "AND H", "AND L", "AND (HL)", "AND A", // A4
    "XOR B", "XOR C", "XOR D", "XOR E", // A8
    "XOR H", "XOR L", "XOR (HL)", "XOR A", // AC
    "OR B", "OR C", "OR D", "OR E", // B0
    "OR H", "OR L", "OR (HL)", "OR A", // B4
    "CP B", "CP C", "CP D", "CP E", // B8
    "CP H", "CP L", "CP (HL)", "CP A", // BC
    "RET NZ", "POP BC", "JP NZ,nn", "JP nn", // C0
    "CALL NZ,nn", "PUSH BC", "ADD A,n", "RST 00H", // C4
    "RET Z", "RET", "JP Z,nn", "prefix CB", // C8
    "CALL Z,nn", "CALL nn", "ADC A,n", "RST 08H", // CC
    "RET NC", "POP DE", "JP NC,nn", "OUT (n),A", // D0
    "CALL NC,nn", "PUSH DE", "SUB n", "RST 10H", // D4
    "RET C", "EXX", "JP C,nn", "IN A,(n)", // D8
    "CALL C,nn", "prefix DD", "SBC A,n", "RST 18H", // DC
    "RET PO", "POP HL", "JP PO,nn", "EX (SP),HL", // E0
    "CALL PO,nn", "PUSH HL", "AND n", "RST 20H", // E4
    "RET PE", "JP (HL)", "JP PE,nn", "EX DE,HL", // E8
    "CALL PE,nn", "prefix ED", "XOR n", "RST 28H", // EC
    "RET P", "POP AF", "JP P,nn", "DI", // F0
    "CALL P,nn", "PUSH AF", "OR n", "RST 30H", // F4
    "RET M", "LD SP,HL", "JP M,nn", "EI", // F8
    "CALL M,nn", "prefix FD", "CP n", "RST 38H", // FC
];

const REG: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const SHIFT: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SLL", "SRL"];

fn ed(op: u8) -> &'static str {
    match op {
        0x40 => "IN B,(C)", 0x41 => "OUT (C),B", 0x42 => "SBC HL,BC", 0x43 => "LD (nn),BC",
        0x44 => "NEG", 0x45 => "RETN", 0x46 => "IM 0", 0x47 => "LD I,A",
        0x48 => "IN C,(C)", 0x49 => "OUT (C),C", 0x4A => "ADC HL,BC", 0x4B => "LD BC,(nn)",
        0x4D => "RETI", 0x4F => "LD R,A",
        0x50 => "IN D,(C)", 0x51 => "OUT (C),D", 0x52 => "SBC HL,DE", 0x53 => "LD (nn),DE",
        0x56 => "IM 1", 0x57 => "LD A,I",
        0x58 => "IN E,(C)", 0x59 => "OUT (C),E", 0x5A => "ADC HL,DE", 0x5B => "LD DE,(nn)",
        0x5E => "IM 2", 0x5F => "LD A,R",
        0x60 => "IN H,(C)", 0x61 => "OUT (C),H", 0x62 => "SBC HL,HL", 0x63 => "LD (nn),HL",
        0x67 => "RRD",
        0x68 => "IN L,(C)", 0x69 => "OUT (C),L", 0x6A => "ADC HL,HL", 0x6B => "LD HL,(nn)",
        0x6F => "RLD",
        0x72 => "SBC HL,SP", 0x73 => "LD (nn),SP",
        0x78 => "IN A,(C)", 0x79 => "OUT (C),A", 0x7A => "ADC HL,SP", 0x7B => "LD SP,(nn)",
        0xA0 => "LDI", 0xA1 => "CPI", 0xA2 => "INI", 0xA3 => "OUTI",
        0xA8 => "LDD", 0xA9 => "CPD", 0xAA => "IND", 0xAB => "OUTD",
        0xB0 => "LDIR", 0xB1 => "CPIR", 0xB2 => "INIR", 0xB3 => "OTIR",
        0xB8 => "LDDR", 0xB9 => "CPDR", 0xBA => "INDR", 0xBB => "OTDR",
        _ => "???",
    }
}

fn bit_group(op: u8, target: &str) -> String {
    let y = ((op >> 3) & 7) as usize;
    match op >> 6 {
        0 => format!("{} {}", SHIFT[y], target),
        1 => format!("BIT {},{}", y, target),
        2 => format!("RES {},{}", y, target),
        _ => format!("SET {},{}", y, target),
    }
}

/// Rewrites a base-table name for an index prefix: `(HL)` becomes `(IX+d)`,
/// `HL` becomes `IX` (or the IY forms).
fn indexed(op: u8, reg: &str) -> String {
    let name = BASE[op as usize];
    if name.contains("(HL)") {
        name.replace("(HL)", &format!("({reg}+d)"))
    } else {
        name.replace("HL", reg)
    }
}

/// Name of `op` decoded in `context`.
pub fn mnemonic(context: Context, op: u8) -> Cow<'static, str> {
    match context {
        Context::Unprefixed => Cow::Borrowed(BASE[op as usize]),
        Context::Ed => Cow::Borrowed(ed(op)),
        Context::Cb => Cow::Owned(bit_group(op, REG[(op & 7) as usize])),
        Context::Dd => Cow::Owned(indexed(op, "IX")),
        Context::Fd => Cow::Owned(indexed(op, "IY")),
        Context::DdCb => Cow::Owned(bit_group(op, "(IX+d)")),
        Context::FdCb => Cow::Owned(bit_group(op, "(IY+d)")),
    }
}
