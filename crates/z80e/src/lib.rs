use std::fmt;

use z80e_core::{Cpu, MemoryBus, Step};

pub mod alu;
mod config;
mod decode;
mod error;
mod interrupt;
mod machine;
pub mod mnemonics;
mod registers;
mod stack;
mod trace;
mod watchdog;
mod tests;

pub use alu::{AluOp, WordOp};
pub use config::{CpuConfig, TraceConfig, WatchdogConfig};
pub use error::RunError;
pub use interrupt::InterruptMode;
pub use machine::{Machine, RunSummary};
pub use registers::{Loc8, Reg16, Reg8, Registers};
pub use trace::{TraceEntry, Tracer};
pub use watchdog::Watchdog;

// ============================================================================
//  FLAGS & CONSTANTS
// ============================================================================
pub mod flags {
    pub const S: u8 = 0x80; // Sign
    pub const Z: u8 = 0x40; // Zero
    pub const H: u8 = 0x10; // Half Carry
    pub const P: u8 = 0x04; // Parity/Overflow
    pub const N: u8 = 0x02; // Subtract
    pub const C: u8 = 0x01; // Carry
}

/// Opcode table an instruction was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Unprefixed,
    Cb,
    Ed,
    Dd,
    Fd,
    DdCb,
    FdCb,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Context::Unprefixed => "base",
            Context::Cb => "CB",
            Context::Ed => "ED",
            Context::Dd => "DD",
            Context::Fd => "FD",
            Context::DdCb => "DD CB",
            Context::FdCb => "FD CB",
        };
        f.pad(s)
    }
}

/// Index register selected by the active DD/FD prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Index {
    IX,
    IY,
}

impl Index {
    pub(crate) fn reg(self) -> Reg16 {
        match self {
            Index::IX => Reg16::IX,
            Index::IY => Reg16::IY,
        }
    }
}

// ============================================================================
//  Z80 CORE STRUCTURE
// ============================================================================

pub struct Z80 {
    pub regs: Registers,

    // Interrupts
    pub iff1: bool,
    pub iff2: bool,
    pub im: InterruptMode,
    pub(crate) ei_pending: bool,

    // State
    pub halted: bool,

    // Internal use for prefixes
    pub(crate) index: Index,
    pub(crate) index_addr: u16,
    pub(crate) context: Context,
    pub(crate) opcode: u8,

    watchdog: Watchdog,
    tracer: Tracer,
}

impl Z80 {
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            iff1: false,
            iff2: false,
            im: InterruptMode::Mode0,
            ei_pending: false,
            halted: false,
            index: Index::IX,
            index_addr: 0,
            context: Context::Unprefixed,
            opcode: 0,
            watchdog: Watchdog::new(config.watchdog),
            tracer: Tracer::new(config.trace),
        };
        cpu.reset();
        cpu
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn watchdog_mut(&mut self) -> &mut Watchdog {
        &mut self.watchdog
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    /// Executed-instruction history, oldest first.
    pub fn trace(&self) -> impl Iterator<Item = &TraceEntry> {
        self.tracer.entries()
    }

    // --- Helpers de Lectura ---

    /// M1 fetch: advances PC and refreshes R.
    #[inline(always)]
    pub(crate) fn fetch_opcode(&mut self, bus: &mut dyn MemoryBus) -> u8 {
        self.refresh_r();
        self.fetch(bus)
    }

    /// Operand fetch.
    #[inline(always)]
    pub(crate) fn fetch(&mut self, bus: &mut dyn MemoryBus) -> u8 {
        let val = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    #[inline(always)]
    pub(crate) fn fetch_u16(&mut self, bus: &mut dyn MemoryBus) -> u16 {
        let lo = self.fetch(bus) as u16;
        let hi = self.fetch(bus) as u16;
        (hi << 8) | lo
    }

    #[inline(always)]
    fn refresh_r(&mut self) {
        // El bit 7 de R solo cambia con LD R,A
        self.regs.r = (self.regs.r & 0x80) | (self.regs.r.wrapping_add(1) & 0x7F);
    }

    // --- Addressing resolver ---

    /// Resolves an `r` field (0..7); code 6 is `(HL)`.
    #[inline]
    pub(crate) fn loc(&self, code: u8) -> Loc8 {
        match Reg8::decode(code) {
            Some(r) => Loc8::Reg(r),
            None => Loc8::Mem(self.regs.hl()),
        }
    }

    #[inline]
    pub(crate) fn read_loc(&self, bus: &mut dyn MemoryBus, loc: Loc8) -> u8 {
        match loc {
            Loc8::Reg(r) => self.regs.get8(r),
            Loc8::Mem(addr) => bus.read(addr),
        }
    }

    #[inline]
    pub(crate) fn write_loc(&mut self, bus: &mut dyn MemoryBus, loc: Loc8, val: u8) {
        match loc {
            Loc8::Reg(r) => self.regs.set8(r, val),
            Loc8::Mem(addr) => bus.write(addr, val),
        }
    }

    /// Read-modify-write of `dst` through the ALU.
    pub fn apply_byte(&mut self, bus: &mut dyn MemoryBus, dst: Loc8, operand: u8, op: AluOp) {
        let value = self.read_loc(bus, dst);
        let (result, f) = alu::byte(op, value, operand, self.regs.f);
        self.regs.f = f;
        if let Some(r) = result {
            self.write_loc(bus, dst, r);
        }
    }

    pub fn apply_word(&mut self, dst: Reg16, operand: u16, op: WordOp) {
        let (result, f) = alu::word(op, self.regs.get16(dst), operand, self.regs.f);
        self.regs.f = f;
        self.regs.set16(dst, result);
    }

    /// `cc` field: NZ, Z, NC, C, PO, PE, P, M.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        use flags::*;
        match cc & 7 {
            0 => !self.regs.flag(Z),
            1 => self.regs.flag(Z),
            2 => !self.regs.flag(C),
            3 => self.regs.flag(C),
            4 => !self.regs.flag(P),
            5 => self.regs.flag(P),
            6 => !self.regs.flag(S),
            _ => self.regs.flag(S),
        }
    }

    /// Unknown opcodes run as a NOP.
    pub(crate) fn unknown(&mut self, op: u8) {
        tracing::warn!(
            context = %self.context,
            opcode = format_args!("{:02X}", op),
            pc = format_args!("{:04X}", self.regs.pc),
            "unknown opcode, treated as NOP"
        );
    }

    fn execute(&mut self, bus: &mut dyn MemoryBus) -> Result<(), RunError> {
        let pc = self.regs.pc;
        let op = self.fetch_opcode(bus);
        self.context = Context::Unprefixed;
        self.opcode = op;
        decode::BASE[op as usize](self, bus, op);

        tracing::trace!(
            pc = format_args!("{:04X}", pc),
            "{}",
            mnemonics::mnemonic(self.context, self.opcode)
        );
        self.tracer.record(TraceEntry {
            pc,
            context: self.context,
            opcode: self.opcode,
        });

        if self.context == Context::Unprefixed && op == 0x00 {
            self.watchdog.nop(pc)
        } else {
            self.watchdog.clear();
            Ok(())
        }
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
//  CPU TRAIT
// ============================================================================

impl Cpu for Z80 {
    type Error = RunError;

    fn reset(&mut self) {
        self.regs = Registers::default();
        self.regs.sp = 0xFFFF;
        self.iff1 = false;
        self.iff2 = false;
        self.im = InterruptMode::Mode0;
        self.ei_pending = false;
        self.halted = false;
        self.context = Context::Unprefixed;
        self.opcode = 0;
        self.watchdog.clear();
        self.tracer.clear();
    }

    fn step(&mut self, bus: &mut dyn MemoryBus) -> Result<Step, RunError> {
        if self.halted {
            return Ok(Step::Halted);
        }

        bus.tick();

        if self.iff1 && bus.irq_pending() {
            self.accept_irq(bus);
            self.watchdog.clear();
            return Ok(Step::Interrupt);
        }

        // EI surte efecto tras la instrucción siguiente
        if self.ei_pending {
            self.ei_pending = false;
            self.iff1 = true;
            self.iff2 = true;
        }

        self.execute(bus)?;
        Ok(Step::Executed)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn halted(&self) -> bool {
        self.halted
    }
}

// ============================================================================
//  REGISTER DUMP
// ============================================================================

impl fmt::Display for Z80 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use flags::*;
        let r = &self.regs;
        writeln!(f, "PC={:04X} SP={:04X} IX={:04X} IY={:04X} I={:02X} R={:02X}", r.pc, r.sp, r.ix, r.iy, r.i, r.r)?;
        writeln!(f, "AF={:04X} BC={:04X} DE={:04X} HL={:04X}", r.af(), r.bc(), r.de(), r.hl())?;
        writeln!(f, "AF'={:04X} BC'={:04X} DE'={:04X} HL'={:04X}", r.af_p(), r.bc_p(), r.de_p(), r.hl_p())?;
        let bit = |mask: u8, c: char| if r.flag(mask) { c } else { '-' };
        writeln!(
            f,
            "F={}{}{}{}{}{} IFF1={} IFF2={} IM={} HALT={}",
            bit(S, 'S'),
            bit(Z, 'Z'),
            bit(H, 'H'),
            bit(P, 'P'),
            bit(N, 'N'),
            bit(C, 'C'),
            self.iff1 as u8,
            self.iff2 as u8,
            self.im,
            self.halted as u8
        )
    }
}
