use std::collections::VecDeque;
use std::io::{self, IsTerminal, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Host side of the serial line.
pub trait HostConsole {
    /// Returns a pending input byte without waiting for one.
    fn poll_byte(&mut self) -> Option<u8>;

    fn write_byte(&mut self, byte: u8);

    /// True once the user asked the host to stop the emulation.
    fn interrupted(&self) -> bool {
        false
    }
}

// ============================================================================
//  TERMINAL (stdin/stdout)
// ============================================================================

enum Input {
    /// Interactive terminal in raw mode, read through crossterm events.
    Raw,
    /// Redirected stdin, drained by a reader thread.
    Piped(Receiver<u8>),
}

/// Console on the process' stdin/stdout.
///
/// An interactive stdin is switched to raw mode for the lifetime of the
/// value; Ctrl-C is reported through [`HostConsole::interrupted`] instead of
/// killing the process.
pub struct TerminalConsole {
    input: Input,
    interrupted: bool,
}

impl TerminalConsole {
    pub fn new() -> io::Result<Self> {
        let input = if io::stdin().is_terminal() {
            terminal::enable_raw_mode()?;
            Input::Raw
        } else {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let stdin = io::stdin();
                for byte in stdin.lock().bytes() {
                    match byte {
                        Ok(b) if tx.send(b).is_ok() => {}
                        _ => break,
                    }
                }
            });
            Input::Piped(rx)
        };
        Ok(Self {
            input,
            interrupted: false,
        })
    }

    fn poll_raw(&mut self) -> Option<u8> {
        while event::poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if is_ctrl_c(&key) {
                self.interrupted = true;
                return None;
            }
            if let Some(b) = key_to_byte(&key) {
                return Some(b);
            }
        }
        None
    }
}

impl HostConsole for TerminalConsole {
    fn poll_byte(&mut self) -> Option<u8> {
        if let Input::Piped(rx) = &self.input {
            return match rx.try_recv() {
                Ok(b) => Some(b),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
            };
        }
        self.poll_raw()
    }

    fn write_byte(&mut self, byte: u8) {
        let mut out = io::stdout().lock();
        // En modo raw el terminal no añade el retorno de carro
        let res = if byte == b'\n' && matches!(self.input, Input::Raw) {
            out.write_all(b"\r\n")
        } else {
            out.write_all(&[byte])
        };
        if let Err(e) = res.and_then(|_| out.flush()) {
            tracing::warn!("console write failed: {e}");
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupted
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        if matches!(self.input, Input::Raw) {
            let _ = terminal::disable_raw_mode();
        }
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C'))
}

/// Translates a key press into the byte a serial terminal would send.
pub fn key_to_byte(key: &KeyEvent) -> Option<u8> {
    match key.code {
        KeyCode::Char(c) if c.is_ascii() => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() {
                Some((c.to_ascii_uppercase() as u8) & 0x1F)
            } else {
                Some(c as u8)
            }
        }
        KeyCode::Enter => Some(b'\r'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Esc => Some(0x1B),
        _ => None,
    }
}

// ============================================================================
//  BUFFER (tests, scripted sessions)
// ============================================================================

/// In-memory console: scripted input, captured output.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
    interrupted: bool,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }
}

impl HostConsole for BufferConsole {
    fn poll_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn interrupted(&self) -> bool {
        self.interrupted
    }
}
