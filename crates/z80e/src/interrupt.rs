use std::fmt;

use z80e_core::MemoryBus;

use crate::{decode, Z80};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptMode {
    /// Executes the instruction placed on the data bus.
    #[default]
    Mode0,
    /// RST 38h.
    Mode1,
    /// Vectored through the table at `I`.
    Mode2,
}

impl fmt::Display for InterruptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            InterruptMode::Mode0 => 0,
            InterruptMode::Mode1 => 1,
            InterruptMode::Mode2 => 2,
        };
        write!(f, "{n}")
    }
}

impl Z80 {
    /// Acknowledges the maskable interrupt. The caller has checked IFF1.
    pub(crate) fn accept_irq(&mut self, bus: &mut dyn MemoryBus) {
        self.iff1 = false;
        self.iff2 = false;
        self.ei_pending = false;

        match self.im {
            InterruptMode::Mode0 => {
                let op = bus.interrupt_data();
                tracing::debug!(opcode = format_args!("{:02X}", op), "IM 0 interrupt");
                self.context = crate::Context::Unprefixed;
                self.opcode = op;
                decode::BASE[op as usize](self, bus, op);
            }
            InterruptMode::Mode1 => {
                tracing::debug!(pc = format_args!("{:04X}", self.regs.pc), "IM 1 interrupt");
                self.call(bus, 0x0038);
            }
            InterruptMode::Mode2 => {
                let vector = bus.interrupt_data();
                let table = ((self.regs.i as u16) << 8) | vector as u16;
                let target = bus.read_u16_le(table);
                tracing::debug!(
                    vector = format_args!("{:04X}", table),
                    target = format_args!("{:04X}", target),
                    "IM 2 interrupt"
                );
                self.call(bus, target);
            }
        }
    }

    /// Non-maskable interrupt. Returns false if the CPU is halted.
    pub fn nmi(&mut self, bus: &mut dyn MemoryBus) -> bool {
        if self.halted {
            return false;
        }
        self.iff2 = self.iff1;
        self.iff1 = false;
        self.ei_pending = false;
        tracing::debug!(pc = format_args!("{:04X}", self.regs.pc), "NMI");
        self.call(bus, 0x0066);
        true
    }

    /// RETN / RETI
    pub(crate) fn ret_from_interrupt(&mut self, bus: &mut dyn MemoryBus) {
        self.iff1 = self.iff2;
        self.ret(bus);
    }
}
