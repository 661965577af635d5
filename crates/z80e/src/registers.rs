use crate::flags;

/// 8-bit register operand, numbered the way opcodes encode them
/// (code 6 is the memory operand and has no register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

impl Reg8 {
    pub const fn decode(code: u8) -> Option<Reg8> {
        match code & 7 {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            7 => Some(Reg8::A),
            _ => None,
        }
    }
}

/// 16-bit register or register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    BC,
    DE,
    HL,
    SP,
    AF,
    IX,
    IY,
}

impl Reg16 {
    /// `rp` field (bits 4-5): BC, DE, HL, SP.
    pub const fn rp(code: u8) -> Reg16 {
        match code & 3 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::SP,
        }
    }

    /// `rp2` field used by PUSH/POP: BC, DE, HL, AF.
    pub const fn rp2(code: u8) -> Reg16 {
        match code & 3 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::AF,
        }
    }
}

/// Read-modify-write target of an 8-bit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc8 {
    Reg(Reg8),
    Mem(u16),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    // Registros principales
    pub a: u8, pub f: u8,
    pub b: u8, pub c: u8,
    pub d: u8, pub e: u8,
    pub h: u8, pub l: u8,

    // Shadow Registers
    pub a_p: u8, pub f_p: u8,
    pub b_p: u8, pub c_p: u8,
    pub d_p: u8, pub e_p: u8,
    pub h_p: u8, pub l_p: u8,

    // Index & Control
    pub ix: u16, pub iy: u16,
    pub sp: u16, pub pc: u16,

    // Interrupts & Refresh
    pub i: u8, pub r: u8,
}

impl Registers {
    #[inline] pub fn bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    #[inline] pub fn de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    #[inline] pub fn hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    #[inline] pub fn af(&self) -> u16 { ((self.a as u16) << 8) | self.f as u16 }
    #[inline] pub fn set_bc(&mut self, v: u16) { self.b = (v >> 8) as u8; self.c = v as u8; }
    #[inline] pub fn set_de(&mut self, v: u16) { self.d = (v >> 8) as u8; self.e = v as u8; }
    #[inline] pub fn set_hl(&mut self, v: u16) { self.h = (v >> 8) as u8; self.l = v as u8; }
    #[inline] pub fn set_af(&mut self, v: u16) { self.a = (v >> 8) as u8; self.f = v as u8; }

    // Shadow pairs, same byte order as the main set
    pub fn af_p(&self) -> u16 { ((self.a_p as u16) << 8) | self.f_p as u16 }
    pub fn bc_p(&self) -> u16 { ((self.b_p as u16) << 8) | self.c_p as u16 }
    pub fn de_p(&self) -> u16 { ((self.d_p as u16) << 8) | self.e_p as u16 }
    pub fn hl_p(&self) -> u16 { ((self.h_p as u16) << 8) | self.l_p as u16 }

    pub fn set_shadow(&mut self, af_p: u16, bc_p: u16, de_p: u16, hl_p: u16) {
        self.a_p = (af_p >> 8) as u8;
        self.f_p = af_p as u8;
        self.b_p = (bc_p >> 8) as u8;
        self.c_p = bc_p as u8;
        self.d_p = (de_p >> 8) as u8;
        self.e_p = de_p as u8;
        self.h_p = (hl_p >> 8) as u8;
        self.l_p = hl_p as u8;
    }

    pub fn get8(&self, r: Reg8) -> u8 {
        match r {
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
            Reg8::A => self.a,
        }
    }

    pub fn set8(&mut self, r: Reg8, v: u8) {
        match r {
            Reg8::B => self.b = v,
            Reg8::C => self.c = v,
            Reg8::D => self.d = v,
            Reg8::E => self.e = v,
            Reg8::H => self.h = v,
            Reg8::L => self.l = v,
            Reg8::A => self.a = v,
        }
    }

    pub fn get16(&self, r: Reg16) -> u16 {
        match r {
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
            Reg16::AF => self.af(),
            Reg16::IX => self.ix,
            Reg16::IY => self.iy,
        }
    }

    pub fn set16(&mut self, r: Reg16, v: u16) {
        match r {
            Reg16::BC => self.set_bc(v),
            Reg16::DE => self.set_de(v),
            Reg16::HL => self.set_hl(v),
            Reg16::SP => self.sp = v,
            Reg16::AF => self.set_af(v),
            Reg16::IX => self.ix = v,
            Reg16::IY => self.iy = v,
        }
    }

    // --- Flags ---
    #[inline] pub fn flag(&self, f: u8) -> bool { (self.f & f) != 0 }
    #[inline] pub fn raise(&mut self, f: u8) { self.f |= f; }
    #[inline] pub fn clear(&mut self, f: u8) { self.f &= !f; }

    #[inline]
    pub fn set_flag(&mut self, f: u8, on: bool) {
        if on { self.raise(f) } else { self.clear(f) }
    }

    /// Carry as an arithmetic operand (0 or 1).
    #[inline]
    pub fn carry(&self) -> u8 {
        self.f & flags::C
    }

    /// EX AF,AF'
    pub fn ex_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_p);
        std::mem::swap(&mut self.f, &mut self.f_p);
    }

    /// EXX
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_p);
        std::mem::swap(&mut self.c, &mut self.c_p);
        std::mem::swap(&mut self.d, &mut self.d_p);
        std::mem::swap(&mut self.e, &mut self.e_p);
        std::mem::swap(&mut self.h, &mut self.h_p);
        std::mem::swap(&mut self.l, &mut self.l_p);
    }
}
