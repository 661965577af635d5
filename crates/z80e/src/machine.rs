use z80e_core::{Cpu, MemoryBus, Step, ADDRESS_SPACE};

use crate::{CpuConfig, RunError, Z80};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps taken, interrupt acknowledges included.
    pub steps: u64,
    /// False when the stop predicate ended the run first.
    pub halted: bool,
}

/// A CPU wired to its bus.
pub struct Machine<B: MemoryBus> {
    pub cpu: Z80,
    pub bus: B,
    program: Vec<u8>,
}

impl<B: MemoryBus> Machine<B> {
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, CpuConfig::default())
    }

    pub fn with_config(bus: B, config: CpuConfig) -> Self {
        Self {
            cpu: Z80::with_config(config),
            bus,
            program: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Copies `bytes` into memory from address 0.
    pub fn load_program(&mut self, bytes: &[u8]) -> Result<(), RunError> {
        if bytes.len() > ADDRESS_SPACE {
            return Err(RunError::ImageTooLarge { len: bytes.len() });
        }
        for (addr, &b) in bytes.iter().enumerate() {
            self.bus.write(addr as u16, b);
        }
        self.program = bytes.to_vec();
        tracing::info!(bytes = bytes.len(), "program loaded");
        Ok(())
    }

    /// The last image passed to [`Machine::load_program`].
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    /// Splits the machine back into CPU and bus.
    pub fn into_parts(self) -> (Z80, B) {
        (self.cpu, self.bus)
    }

    pub fn step(&mut self) -> Result<Step, RunError> {
        self.cpu.step(&mut self.bus)
    }

    /// Resets and runs until HALT.
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        self.run_with(|_| false)
    }

    /// Resets and runs until HALT or until `stop` returns true. `stop` is
    /// checked before every step.
    pub fn run_with<F>(&mut self, mut stop: F) -> Result<RunSummary, RunError>
    where
        F: FnMut(&Self) -> bool,
    {
        self.reset();
        let mut steps = 0u64;
        loop {
            if self.cpu.halted {
                tracing::info!(steps, pc = format_args!("{:04X}", self.cpu.regs.pc), "halted");
                return Ok(RunSummary { steps, halted: true });
            }
            if stop(self) {
                tracing::info!(steps, "run stopped");
                return Ok(RunSummary { steps, halted: false });
            }
            self.step()?;
            steps += 1;
        }
    }
}
