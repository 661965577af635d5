use std::collections::VecDeque;
use std::fmt;

use crate::{mnemonics, Context, TraceConfig};

/// One executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub pc: u16,
    pub context: Context,
    pub opcode: u8,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}  {:<5} {:02X}  {}",
            self.pc,
            self.context,
            self.opcode,
            mnemonics::mnemonic(self.context, self.opcode)
        )
    }
}

/// Bounded instruction history.
#[derive(Debug, Clone)]
pub struct Tracer {
    enabled: bool,
    capacity: usize,
    entries: VecDeque<TraceEntry>,
    recorded: u64,
}

impl Tracer {
    pub fn new(config: TraceConfig) -> Self {
        Self {
            enabled: config.enabled,
            capacity: config.capacity,
            entries: VecDeque::new(),
            recorded: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn record(&mut self, entry: TraceEntry) {
        if !self.enabled || self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.recorded += 1;
    }

    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instructions recorded since the last clear, dropped ones included.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recorded = 0;
    }
}
