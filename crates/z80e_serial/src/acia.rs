// 6850-style ACIA reached through two I/O ports.

use bitflags::bitflags;

use crate::HostConsole;

/// Control (write) / status (read) port.
pub const CONTROL_STATUS_PORT: u8 = 0x80;
/// Transmit (write) / receive (read) data port.
pub const DATA_PORT: u8 = 0x81;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const RDRF = 1 << 0; // Receive data register full
        const TDRE = 1 << 1; // Transmit data register empty
        const DCD  = 1 << 2; // Data carrier detect (1 = lost)
        const CTS  = 1 << 3; // Clear to send (1 = inhibited)
        const FE   = 1 << 4; // Framing error
        const OVRN = 1 << 5; // Receiver overrun
        const PE   = 1 << 6; // Parity error
        const IRQ  = 1 << 7; // Interrupt request
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Control: u8 {
        const DIV0 = 1 << 0;
        const DIV1 = 1 << 1;
        const WS0  = 1 << 2;
        const WS1  = 1 << 3;
        const WS2  = 1 << 4;
        const TC0  = 1 << 5;
        const TC1  = 1 << 6;
        const RIE  = 1 << 7; // Receive interrupt enable

        const DIVIDER     = Self::DIV0.bits() | Self::DIV1.bits();
        const WORD_SELECT = Self::WS0.bits() | Self::WS1.bits() | Self::WS2.bits();
        const TX_CONTROL  = Self::TC0.bits() | Self::TC1.bits();
    }
}

impl Control {
    /// Counter divide select. `None` means the master-reset code (`11`).
    pub fn clock_divider(self) -> Option<u8> {
        match (self & Control::DIVIDER).bits() {
            0 => Some(1),
            1 => Some(16),
            2 => Some(64),
            _ => None,
        }
    }

    /// Raw word-select field (bits 2-4): data bits, parity and stop bits.
    pub fn word_select(self) -> u8 {
        (self & Control::WORD_SELECT).bits() >> 2
    }

    /// Transmit control `01`: RTS low, transmit interrupt enabled.
    pub fn tx_interrupt_enabled(self) -> bool {
        (self & Control::TX_CONTROL) == Control::TC0
    }
}

/// Serial adapter state: status, control and the receive data register.
#[derive(Debug, Clone)]
pub struct Acia {
    status: Status,
    control: Control,
    rx_data: u8,
}

impl Acia {
    pub fn new() -> Self {
        Self {
            status: Status::TDRE,
            control: Control::empty(),
            rx_data: 0,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn control(&self) -> Control {
        self.control
    }

    /// Level of the IRQ output.
    pub fn irq(&self) -> bool {
        self.status.contains(Status::IRQ)
    }

    pub fn read_status(&self) -> u8 {
        self.status.bits()
    }

    pub fn write_control(&mut self, value: u8) {
        let control = Control::from_bits_retain(value);
        if control.clock_divider().is_none() {
            tracing::debug!("ACIA master reset");
            self.status = Status::TDRE;
            self.rx_data = 0;
        }
        self.control = control;
        self.update_irq();
    }

    /// Reads the receive register and releases it for the next byte.
    pub fn read_data(&mut self) -> u8 {
        self.status.remove(Status::RDRF | Status::OVRN);
        self.update_irq();
        self.rx_data
    }

    /// Hands `value` to the host; the transmit register is busy only for the
    /// duration of the hand-over.
    pub fn write_data(&mut self, value: u8, console: &mut dyn HostConsole) {
        self.status.remove(Status::TDRE);
        console.write_byte(value);
        self.status.insert(Status::TDRE);
        self.update_irq();
    }

    /// Non-blocking receive check. A pending byte stays in the host buffer
    /// until the receive register has been read.
    pub fn poll(&mut self, console: &mut dyn HostConsole) {
        if self.status.contains(Status::RDRF) {
            return;
        }
        if let Some(byte) = console.poll_byte() {
            self.receive(byte);
        }
    }

    /// Latches a received byte.
    pub fn receive(&mut self, byte: u8) {
        if self.status.contains(Status::RDRF) {
            self.status.insert(Status::OVRN);
        }
        self.rx_data = byte;
        self.status.insert(Status::RDRF);
        self.update_irq();
    }

    fn update_irq(&mut self) {
        let rx = self.control.contains(Control::RIE) && self.status.contains(Status::RDRF);
        let tx = self.control.tx_interrupt_enabled() && self.status.contains(Status::TDRE);
        self.status.set(Status::IRQ, rx || tx);
    }
}

impl Default for Acia {
    fn default() -> Self {
        Self::new()
    }
}
