//! Serial peripheral for z80e: a 6850-style ACIA and the host console it
//! talks to.

mod acia;
mod console;

pub use acia::{Acia, Control, Status, CONTROL_STATUS_PORT, DATA_PORT};
pub use console::{key_to_byte, BufferConsole, HostConsole, TerminalConsole};
