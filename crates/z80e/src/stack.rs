use z80e_core::MemoryBus;

use crate::Z80;

// --- Helpers de Stack ---
impl Z80 {
    pub fn push(&mut self, bus: &mut dyn MemoryBus, val: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, (val >> 8) as u8); // Hi
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, val as u8); // Lo
    }

    pub fn pop(&mut self, bus: &mut dyn MemoryBus) -> u16 {
        let lo = bus.read(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    /// CALL/RST: pushes the return address and jumps.
    pub(crate) fn call(&mut self, bus: &mut dyn MemoryBus, target: u16) {
        let pc = self.regs.pc;
        self.push(bus, pc);
        self.regs.pc = target;
    }

    pub(crate) fn ret(&mut self, bus: &mut dyn MemoryBus) {
        self.regs.pc = self.pop(bus);
    }
}
