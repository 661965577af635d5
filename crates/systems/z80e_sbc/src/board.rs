// crates/systems/z80e_sbc/src/board.rs
use z80e_core::{Memory, MemoryBus};
use z80e_serial::{Acia, HostConsole, CONTROL_STATUS_PORT, DATA_PORT};

/// Consola directa: lectura sin bloqueo, escritura al host.
pub const CONSOLE_PORT: u8 = 0x00;
/// Puerto de depuración: cada escritura queda en el log.
pub const DEBUG_PORT: u8 = 0x01;

/// Bus de la placa: 64K de RAM plana y E/S decodificada por el byte bajo
/// del puerto.
pub struct Board<C: HostConsole> {
    /// RAM del sistema (64KB, sin ROM ni espejos).
    pub memory: Memory,
    /// ACIA serie en los puertos $80-$81.
    pub acia: Acia,
    console: C,
    /// El receptor del ACIA solo toma bytes del host una vez programado
    /// (divisor distinto de master reset). Hasta entonces el puerto $00 los
    /// recibe directamente.
    serial_armed: bool,
}

impl<C: HostConsole> Board<C> {
    pub fn new(console: C) -> Self {
        Self {
            memory: Memory::new(),
            acia: Acia::new(),
            console,
            serial_armed: false,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn serial_armed(&self) -> bool {
        self.serial_armed
    }

    /// Suelta la consola (y con ella el modo raw) y devuelve la RAM.
    pub fn into_memory(self) -> Memory {
        self.memory
    }
}

impl<C: HostConsole> MemoryBus for Board<C> {
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.memory.write(addr, val);
    }

    fn port_in(&mut self, port: u16) -> u8 {
        match port as u8 {
            CONSOLE_PORT => self.console.poll_byte().unwrap_or(0x00),
            CONTROL_STATUS_PORT => self.acia.read_status(),
            DATA_PORT => self.acia.read_data(),
            _ => {
                tracing::trace!(port = format_args!("{:04X}", port), "read from unmapped port");
                0xFF // Bus flotante
            }
        }
    }

    fn port_out(&mut self, port: u16, val: u8) {
        match port as u8 {
            CONSOLE_PORT => self.console.write_byte(val),
            DEBUG_PORT => {
                tracing::debug!(value = format_args!("{:02X}", val), "debug port write");
            }
            CONTROL_STATUS_PORT => {
                self.acia.write_control(val);
                self.serial_armed = self.acia.control().clock_divider().is_some();
            }
            DATA_PORT => self.acia.write_data(val, &mut self.console),
            _ => {
                tracing::trace!(
                    port = format_args!("{:04X}", port),
                    value = format_args!("{:02X}", val),
                    "write to unmapped port"
                );
            }
        }
    }

    fn tick(&mut self) {
        if self.serial_armed {
            self.acia.poll(&mut self.console);
        }
    }

    fn irq_pending(&self) -> bool {
        self.acia.irq()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z80e::Machine;
    use z80e_serial::{BufferConsole, Status};

    fn board(input: &[u8]) -> Board<BufferConsole> {
        Board::new(BufferConsole::with_input(input))
    }

    #[test]
    fn console_port_reaches_host() {
        let mut b = board(b"k");
        b.port_out(0x0000, b'A');
        // El byte alto del puerto (A en OUT (n),A) no cuenta
        b.port_out(0x4100, b'B');
        assert_eq!(b.console().output(), b"AB");
        assert_eq!(b.port_in(0x0000), b'k');
        assert_eq!(b.port_in(0x0000), 0x00);
    }

    #[test]
    fn unmapped_ports_float() {
        let mut b = board(&[]);
        assert_eq!(b.port_in(0x0042), 0xFF);
        b.port_out(0x0042, 0x12);
        b.port_out(DEBUG_PORT as u16, 0x34);
        assert!(b.console().output().is_empty());
    }

    #[test]
    fn acia_waits_until_programmed() {
        let mut b = board(b"xy");
        b.tick();
        assert!(!b.acia.status().contains(Status::RDRF));
        assert_eq!(b.console().pending_input(), 2);

        b.port_out(CONTROL_STATUS_PORT as u16, 0x03); // master reset
        b.tick();
        assert!(!b.serial_armed());
        assert_eq!(b.console().pending_input(), 2);

        b.port_out(CONTROL_STATUS_PORT as u16, 0x15); // /16, 8N1
        assert!(b.serial_armed());
        b.tick();
        assert_eq!(b.port_in(CONTROL_STATUS_PORT as u16) & Status::RDRF.bits(), Status::RDRF.bits());
        assert_eq!(b.port_in(DATA_PORT as u16), b'x');
        // 'y' espera en el host hasta que se vacía el registro
        assert_eq!(b.console().pending_input(), 1);
    }

    #[test]
    fn data_port_transmits() {
        let mut b = board(&[]);
        b.port_out(DATA_PORT as u16, b'!');
        assert_eq!(b.console().output(), b"!");
        assert!(b.acia.status().contains(Status::TDRE));
    }

    #[test]
    fn receive_interrupt_drives_irq_line() {
        let mut b = board(b"z");
        b.port_out(CONTROL_STATUS_PORT as u16, 0x95); // RIE | /16, 8N1
        assert!(!b.irq_pending());
        b.tick();
        assert!(b.irq_pending());
        b.port_in(DATA_PORT as u16);
        assert!(!b.irq_pending());
    }

    #[test]
    fn polled_echo_program() {
        // 0000: LD A,03h; OUT (80h),A; LD A,15h; OUT (80h),A
        // 0008: IN A,(80h); RRCA; JR NC,0008h
        // 000D: IN A,(81h); CP 0Dh; JR Z,0017h; OUT (81h),A; JR 0008h
        // 0017: HALT
        let program = [
            0x3E, 0x03, 0xD3, 0x80, 0x3E, 0x15, 0xD3, 0x80, //
            0xDB, 0x80, 0x0F, 0x30, 0xFB, //
            0xDB, 0x81, 0xFE, 0x0D, 0x28, 0x04, 0xD3, 0x81, 0x18, 0xF1, //
            0x76,
        ];
        let mut m = Machine::new(board(b"hi\r"));
        m.load_program(&program).unwrap();
        let summary = m.run().unwrap();
        assert!(summary.halted);
        assert_eq!(m.cpu.regs.pc, 0x0018);
        assert_eq!(m.bus.console().output(), b"hi");
    }

    #[test]
    fn interrupt_driven_receive() {
        // 0000: IM 1; LD SP,9000h; LD A,95h; OUT (80h),A; EI; JR $
        // 0038: IN A,(81h); OUT (00h),A; HALT
        let mut program = vec![
            0xED, 0x56, 0x31, 0x00, 0x90, 0x3E, 0x95, 0xD3, 0x80, 0xFB, 0x18, 0xFE,
        ];
        program.resize(0x38, 0x00);
        program.extend_from_slice(&[0xDB, 0x81, 0xD3, 0x00, 0x76]);
        let mut m = Machine::new(board(b"k"));
        m.load_program(&program).unwrap();
        m.run().unwrap();
        assert_eq!(m.bus.console().output(), b"k");
        assert_eq!(m.cpu.regs.pc, 0x003D);
        // Dirección de retorno: el JR $ en 000A
        assert_eq!(m.bus.read_u16_le(0x8FFE), 0x000A);
        assert!(!m.cpu.iff1);
    }

    #[test]
    fn console_interrupt_stops_run() {
        // JR $ para siempre
        let mut m = Machine::new(board(&[]));
        m.load_program(&[0x18, 0xFE]).unwrap();
        m.bus.console_mut().interrupt();
        let summary = m.run_with(|m| m.bus.console().interrupted()).unwrap();
        assert!(!summary.halted);
        assert_eq!(summary.steps, 0);
    }
}
