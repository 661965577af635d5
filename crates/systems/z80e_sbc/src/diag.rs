// Volcados posteriores a la ejecución: memoria y traza de instrucciones.
// El volcado de registros es el Display del propio Z80.

use std::fmt;

use z80e::Z80;
use z80e_core::{MemoryBus, ADDRESS_SPACE};

const ROW: usize = 16;

/// Hex dump of the first `len` bytes of memory, rounded up to whole rows.
pub struct MemoryDump<'a> {
    bus: &'a dyn MemoryBus,
    len: usize,
}

impl<'a> MemoryDump<'a> {
    /// The region a program of `len` bytes occupies.
    pub fn program(bus: &'a dyn MemoryBus, len: usize) -> Self {
        Self {
            bus,
            len: len.min(ADDRESS_SPACE),
        }
    }

    /// All 64K.
    pub fn full(bus: &'a dyn MemoryBus) -> Self {
        Self {
            bus,
            len: ADDRESS_SPACE,
        }
    }
}

impl fmt::Display for MemoryDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for start in (0..self.len).step_by(ROW) {
            let row: Vec<u8> = (start..start + ROW).map(|a| self.bus.read(a as u16)).collect();
            write!(f, "{:04X} ", start)?;
            for b in &row {
                write!(f, " {:02X}", b)?;
            }
            let text: String = row
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            writeln!(f, "  |{}|", text)?;
        }
        Ok(())
    }
}

/// Executed instructions kept by the tracer, oldest first.
pub struct TraceDump<'a>(pub &'a Z80);

impl fmt::Display for TraceDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracer = self.0.tracer();
        writeln!(f, "trace: {} executed, last {} kept", tracer.recorded(), tracer.len())?;
        for entry in self.0.trace() {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z80e::{CpuConfig, Machine, TraceConfig};
    use z80e_core::Memory;

    #[test]
    fn program_dump_covers_whole_rows() {
        let mut ram = Memory::new();
        ram.load(0, b"Hi\x00\x7F");
        let text = MemoryDump::program(&ram, 4).to_string();
        assert_eq!(
            text,
            "0000  48 69 00 7F 00 00 00 00 00 00 00 00 00 00 00 00  |Hi..............|\n"
        );
        assert_eq!(MemoryDump::program(&ram, 17).to_string().lines().count(), 2);
    }

    #[test]
    fn full_dump_has_4096_rows() {
        let ram = Memory::new();
        let text = MemoryDump::full(&ram).to_string();
        assert_eq!(text.lines().count(), 4096);
        assert!(text.lines().last().unwrap().starts_with("FFF0 "));
    }

    #[test]
    fn trace_lists_executed_instructions() {
        let config = CpuConfig {
            trace: TraceConfig { enabled: true, capacity: 2 },
            ..CpuConfig::default()
        };
        // LD A,1; INC A; HALT
        let mut m = Machine::with_config(Memory::new(), config);
        m.load_program(&[0x3E, 0x01, 0x3C, 0x76]).unwrap();
        m.run().unwrap();
        let text = TraceDump(&m.cpu).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "trace: 3 executed, last 2 kept");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0002  base  3C"));
        assert!(lines[2].starts_with("0003  base  76"));
    }
}
