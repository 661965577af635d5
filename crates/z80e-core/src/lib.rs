use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod hex;

pub use hex::HexError;

/// Size of the flat Z80 address space.
pub const ADDRESS_SPACE: usize = 0x1_0000;

// ============================================================================
//  CONTRACTS (TRAITS)
// ============================================================================

/// Result of a single `Cpu::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One instruction was fetched and executed.
    Executed,
    /// The step was consumed accepting an interrupt.
    Interrupt,
    /// The CPU is halted; nothing was fetched.
    Halted,
}

/// Representa cualquier dispositivo capaz de ejecutar instrucciones (CPU)
pub trait Cpu {
    type Error;

    /// Reinicio en frío (Power On)
    fn reset(&mut self);

    /// Ejecuta una instrucción o paso atómico.
    fn step(&mut self, bus: &mut dyn MemoryBus) -> Result<Step, Self::Error>;

    /// Debugging: Obtener el Program Counter actual
    fn pc(&self) -> u16;

    fn halted(&self) -> bool;
}

/// Contrato UNIFICADO para el Bus (Memoria + I/O).
pub trait MemoryBus {
    // --- Métodos Obligatorios (Memoria) ---
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, val: u8);

    // --- Métodos de I/O (Puertos) ---
    // Implementación por defecto para buses sin periféricos.
    fn port_in(&mut self, _port: u16) -> u8 {
        0xFF
    } // Bus flotante devuelve FF
    fn port_out(&mut self, _port: u16, _val: u8) {} // Escritura al vacío

    // --- Líneas de control ---

    /// Called once per instruction boundary, before the CPU samples the
    /// interrupt line. Must never block.
    fn tick(&mut self) {}

    /// Level of the maskable interrupt line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Byte placed on the data bus during interrupt acknowledge
    /// (the instruction for IM 0, the vector low byte for IM 2).
    fn interrupt_data(&mut self) -> u8 {
        0xFF // RST 38h
    }

    // --- Helpers Automáticos (Default Impls) ---

    // Lectura 16-bit Little Endian (Zilog Z80)
    fn read_u16_le(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    // Escritura 16-bit Little Endian
    fn write_u16_le(&mut self, addr: u16, val: u16) {
        self.write(addr, (val & 0xFF) as u8);
        self.write(addr.wrapping_add(1), (val >> 8) as u8);
    }
}

// ============================================================================
//  FLAT MEMORY
// ============================================================================

/// The full 64K address space as one flat RAM array.
///
/// Addresses are `u16`, so every access is in range by construction.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8; ADDRESS_SPACE]>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; ADDRESS_SPACE]),
        }
    }

    /// Copies `data` into memory starting at `origin`, wrapping at the top.
    pub fn load(&mut self, origin: u16, data: &[u8]) {
        let mut addr = origin;
        for &b in data {
            self.bytes[addr as usize] = b;
            addr = addr.wrapping_add(1);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for Memory {
    fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.bytes[addr as usize] = val;
    }
}

// ============================================================================
//  IMAGE LOADER (UTILIDAD)
// ============================================================================

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Intel HEX error: {0}")]
    Hex(#[from] HexError),
    #[error("image is empty")]
    Empty,
}

/// A program image ready to be copied into memory at address 0.
pub struct Image {
    pub data: Vec<u8>,
}

impl Image {
    /// Reads and validates an Intel HEX file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let text = fs::read_to_string(path)?;
        let data = hex::parse(&text)?;
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        tracing::info!(bytes = data.len(), "Intel HEX image parsed");
        Ok(Self { data })
    }
}
