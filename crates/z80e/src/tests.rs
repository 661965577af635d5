// crates/z80e/src/tests.rs
#[cfg(test)]
mod tests {
    use crate::*;
    use z80e_core::{Cpu, Memory, MemoryBus, Step};

    struct TestBus {
        ram: Memory,
        irq: bool,
        data: u8,
        input: u8,
        out: Vec<(u16, u8)>,
    }

    impl TestBus {
        fn with(program: &[u8]) -> Self {
            let mut ram = Memory::new();
            ram.load(0, program);
            Self { ram, irq: false, data: 0xFF, input: 0, out: Vec::new() }
        }
    }

    impl MemoryBus for TestBus {
        fn read(&self, addr: u16) -> u8 { self.ram.read(addr) }
        fn write(&mut self, addr: u16, val: u8) { self.ram.write(addr, val); }
        fn port_in(&mut self, _port: u16) -> u8 { self.input }
        fn port_out(&mut self, port: u16, val: u8) { self.out.push((port, val)); }
        fn irq_pending(&self) -> bool { self.irq }
        fn interrupt_data(&mut self) -> u8 { self.data }
    }

    fn steps(cpu: &mut Z80, bus: &mut TestBus, n: usize) {
        for _ in 0..n {
            cpu.step(bus).unwrap();
        }
    }

    #[test]
    fn test_reset_state() {
        let mut cpu = Z80::new();
        cpu.regs.a = 0x12;
        cpu.regs.ix = 0x3456;
        cpu.halted = true;
        cpu.im = InterruptMode::Mode2;
        cpu.reset();
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(cpu.regs.ix, 0);
        assert_eq!(cpu.regs.sp, 0xFFFF);
        assert_eq!(cpu.regs.pc, 0);
        assert_eq!(cpu.im, InterruptMode::Mode0);
        assert!(!cpu.halted && !cpu.iff1 && !cpu.iff2);
    }

    #[test]
    fn test_r_refresh() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x3E, 0x01, 0xCB, 0x00, 0x00]);
        steps(&mut cpu, &mut bus, 1); // LD A,n: un solo M1
        assert_eq!(cpu.regs.r, 1);
        steps(&mut cpu, &mut bus, 1); // CB 00: dos M1
        assert_eq!(cpu.regs.r, 3);

        cpu.regs.r = 0xFF;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.r, 0x80);
    }

    #[test]
    fn test_ei_takes_effect_after_next_instruction() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xFB, 0x00, 0x00]);
        cpu.im = InterruptMode::Mode1;
        bus.irq = true;

        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Executed); // EI
        assert!(!cpu.iff1);
        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Executed); // NOP
        assert!(cpu.iff1);
        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Interrupt);
        assert_eq!(cpu.regs.pc, 0x0038);
        assert_eq!(cpu.regs.sp, 0xFFFD);
        assert_eq!(bus.read_u16_le(0xFFFD), 0x0002);
        assert!(!cpu.iff1 && !cpu.iff2);
    }

    #[test]
    fn test_di_masks_interrupts() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xF3, 0x00]);
        cpu.iff1 = true;
        cpu.iff2 = true;
        cpu.im = InterruptMode::Mode1;
        steps(&mut cpu, &mut bus, 1); // DI
        assert!(!cpu.iff1 && !cpu.iff2);
        bus.irq = true;
        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Executed);
        assert_eq!(cpu.regs.pc, 2);
    }

    #[test]
    fn test_im2_vectors_through_table() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x00]);
        bus.ram.load(0x8010, &[0x00, 0x30]);
        bus.irq = true;
        bus.data = 0x10;
        cpu.regs.i = 0x80;
        cpu.im = InterruptMode::Mode2;
        cpu.iff1 = true;
        cpu.regs.pc = 0x1234;

        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Interrupt);
        assert_eq!(cpu.regs.pc, 0x3000);
        assert_eq!(bus.read_u16_le(cpu.regs.sp), 0x1234);
    }

    #[test]
    fn test_im0_executes_bus_byte() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[]);
        bus.irq = true;
        bus.data = 0xCF; // RST 08h
        cpu.iff1 = true;
        cpu.regs.pc = 0x0200;

        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Interrupt);
        assert_eq!(cpu.regs.pc, 0x0008);
        assert_eq!(bus.read_u16_le(cpu.regs.sp), 0x0200);
    }

    #[test]
    fn test_nmi_and_retn() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[]);
        bus.ram.load(0x0066, &[0xED, 0x45]); // RETN
        cpu.iff1 = true;
        cpu.iff2 = true;
        cpu.regs.pc = 0x0100;

        assert!(cpu.nmi(&mut bus));
        assert_eq!(cpu.regs.pc, 0x0066);
        assert!(!cpu.iff1);
        assert!(cpu.iff2);

        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.pc, 0x0100);
        assert!(cpu.iff1);
    }

    #[test]
    fn test_halt_is_terminal() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x76, 0x3C]);
        cpu.iff1 = true;
        cpu.im = InterruptMode::Mode1;
        steps(&mut cpu, &mut bus, 1);
        assert!(cpu.halted);
        bus.irq = true;
        assert_eq!(cpu.step(&mut bus).unwrap(), Step::Halted);
        assert_eq!(cpu.regs.pc, 1);
        assert_eq!(cpu.regs.a, 0);
        assert!(!cpu.nmi(&mut bus));
    }

    #[test]
    fn test_push_is_high_byte_first() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xC5, 0xD1]); // PUSH BC; POP DE
        cpu.regs.set_bc(0x1234);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.sp, 0xFFFD);
        assert_eq!(bus.read(0xFFFE), 0x12);
        assert_eq!(bus.read(0xFFFD), 0x34);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.de(), 0x1234);
        assert_eq!(cpu.regs.sp, 0xFFFF);
    }

    #[test]
    fn test_call_and_ret() {
        // CALL 0005; HALT; ...; LD A,7; RET
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xCD, 0x05, 0x00, 0x76, 0x00, 0x3E, 0x07, 0xC9]);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.pc, 0x0005);
        assert_eq!(bus.read_u16_le(cpu.regs.sp), 0x0003);
        steps(&mut cpu, &mut bus, 3);
        assert!(cpu.halted);
        assert_eq!(cpu.regs.a, 7);
    }

    #[test]
    fn test_djnz_loop() {
        // LD B,3; INC A; DJNZ -3; HALT
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x06, 0x03, 0x3C, 0x10, 0xFD, 0x76]);
        while !cpu.halted {
            cpu.step(&mut bus).unwrap();
        }
        assert_eq!(cpu.regs.a, 3);
        assert_eq!(cpu.regs.b, 0);
    }

    #[test]
    fn test_add_hl_preserves_szp() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x09]);
        cpu.regs.set_hl(0x0FFF);
        cpu.regs.set_bc(0x0001);
        cpu.regs.f = flags::S | flags::Z | flags::P | flags::N;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.hl(), 0x1000);
        assert_eq!(cpu.regs.f, flags::S | flags::Z | flags::P | flags::H);
    }

    #[test]
    fn test_rla_keeps_sign_zero_parity() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x17]);
        cpu.regs.a = 0x80;
        cpu.regs.f = flags::Z | flags::P | flags::H | flags::N;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.a, 0x00);
        assert_eq!(cpu.regs.f, flags::Z | flags::P | flags::C);
    }

    #[test]
    fn test_daa_program() {
        // LD A,15h; ADD A,27h; DAA
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x3E, 0x15, 0xC6, 0x27, 0x27]);
        steps(&mut cpu, &mut bus, 3);
        assert_eq!(cpu.regs.a, 0x42);
    }

    #[test]
    fn test_ccf_scf() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0x37, 0x3F, 0x3F]);
        steps(&mut cpu, &mut bus, 1); // SCF
        assert!(cpu.regs.flag(flags::C));
        steps(&mut cpu, &mut bus, 1); // CCF
        assert!(!cpu.regs.flag(flags::C));
        assert!(cpu.regs.flag(flags::H)); // H = C anterior
        steps(&mut cpu, &mut bus, 1);
        assert!(cpu.regs.flag(flags::C));
        assert!(!cpu.regs.flag(flags::H));
    }

    #[test]
    fn test_bit_flags() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xCB, 0x5F, 0xCB, 0x76]);
        cpu.regs.a = 0x08;
        steps(&mut cpu, &mut bus, 1); // BIT 3,A
        assert!(!cpu.regs.flag(flags::Z));
        cpu.regs.set_hl(0x2000);
        steps(&mut cpu, &mut bus, 1); // BIT 6,(HL)
        assert!(cpu.regs.flag(flags::Z));
        assert!(cpu.regs.flag(flags::P));
        assert_eq!(bus.read(0x2000), 0);
    }

    #[test]
    fn test_cb_on_memory_writes_back() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xCB, 0x06, 0xCB, 0xFE]); // RLC (HL); SET 7,(HL)
        cpu.regs.set_hl(0x3000);
        bus.write(0x3000, 0x81);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(bus.read(0x3000), 0x03);
        assert!(cpu.regs.flag(flags::C));
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(bus.read(0x3000), 0x83);
    }

    #[test]
    fn test_index_load_with_negative_displacement() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xDD, 0x7E, 0xFF]); // LD A,(IX-1)
        cpu.regs.ix = 0x1001;
        bus.write(0x1000, 0x42);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 3);
    }

    #[test]
    fn test_index_store_immediate() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xFD, 0x36, 0x05, 0x99]); // LD (IY+5),99h
        cpu.regs.iy = 0x4000;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(bus.read(0x4005), 0x99);
        assert_eq!(cpu.regs.pc, 4);
    }

    #[test]
    fn test_index_cb_bit_ops() {
        let mut cpu = Z80::new();
        // SET 0,(IX+2); BIT 0,(IX+2)
        let mut bus = TestBus::with(&[0xDD, 0xCB, 0x02, 0xC6, 0xDD, 0xCB, 0x02, 0x46]);
        cpu.regs.ix = 0x2000;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(bus.read(0x2002), 0x01);
        assert_eq!(cpu.context, Context::DdCb);
        steps(&mut cpu, &mut bus, 1);
        assert!(!cpu.regs.flag(flags::Z));
        assert_eq!(cpu.regs.pc, 8);
    }

    #[test]
    fn test_add_ix_ix() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xDD, 0x29]);
        cpu.regs.ix = 0x1234;
        cpu.regs.set_hl(0x1111);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.ix, 0x2468);
        assert_eq!(cpu.regs.hl(), 0x1111);
    }

    #[test]
    fn test_chained_prefix_is_nop() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xDD, 0xFD, 0x21, 0x34, 0x12]);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.pc, 1);
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.iy, 0x1234);
        assert_eq!(cpu.regs.ix, 0);
    }

    #[test]
    fn test_index_prefix_on_plain_opcode() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xDD, 0x3C]); // INC A
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.a, 1);
        assert_eq!(cpu.regs.pc, 2);
    }

    #[test]
    fn test_undocumented_opcodes_are_nops() {
        let mut cpu = Z80::new();
        // ED 00; DD 24 (INC IXH); CB 30 (SLL B)
        let mut bus = TestBus::with(&[0xED, 0x00, 0xDD, 0x24, 0xCB, 0x30]);
        cpu.regs.b = 0x41;
        steps(&mut cpu, &mut bus, 3);
        assert_eq!(cpu.regs.pc, 6);
        assert_eq!(cpu.regs.ix, 0);
        assert_eq!(cpu.regs.h, 0);
        assert_eq!(cpu.regs.b, 0x41);
    }

    #[test]
    fn test_ld_nn_rp_fetches_address_once() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0x43, 0x00, 0x40, 0xED, 0x5B, 0x00, 0x40]);
        cpu.regs.set_bc(0xBEEF);
        steps(&mut cpu, &mut bus, 1); // LD (4000h),BC
        assert_eq!(bus.read(0x4000), 0xEF);
        assert_eq!(bus.read(0x4001), 0xBE);
        assert_eq!(cpu.regs.pc, 4);
        steps(&mut cpu, &mut bus, 1); // LD DE,(4000h)
        assert_eq!(cpu.regs.de(), 0xBEEF);
    }

    #[test]
    fn test_sbc_hl() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0x52]); // SBC HL,DE
        cpu.regs.set_hl(0x1000);
        cpu.regs.set_de(0x0001);
        cpu.regs.f = flags::C;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.hl(), 0x0FFE);
        assert!(cpu.regs.flag(flags::N));
        assert!(cpu.regs.flag(flags::H));
        assert!(!cpu.regs.flag(flags::C));
    }

    #[test]
    fn test_ldir_one_iteration_per_step() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0xB0, 0x76]);
        bus.ram.load(0x0100, &[1, 2, 3]);
        cpu.regs.set_hl(0x0100);
        cpu.regs.set_de(0x0200);
        cpu.regs.set_bc(3);

        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.pc, 0);
        assert_eq!(cpu.regs.bc(), 2);
        assert!(cpu.regs.flag(flags::P));
        steps(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.regs.pc, 2);
        assert_eq!(cpu.regs.bc(), 0);
        assert!(!cpu.regs.flag(flags::P));
        assert_eq!(&bus.ram.as_slice()[0x200..0x203], &[1, 2, 3]);
        assert_eq!(cpu.regs.hl(), 0x0103);
    }

    #[test]
    fn test_lddr_walks_down() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0xB8]);
        bus.ram.load(0x0100, &[7, 8]);
        cpu.regs.set_hl(0x0101);
        cpu.regs.set_de(0x0301);
        cpu.regs.set_bc(2);
        steps(&mut cpu, &mut bus, 2);
        assert_eq!(bus.read(0x0300), 7);
        assert_eq!(bus.read(0x0301), 8);
        assert_eq!(cpu.regs.hl(), 0x00FF);
    }

    #[test]
    fn test_cpir_stops_on_match() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0xB1]);
        bus.ram.load(0x0100, b"abcd");
        cpu.regs.a = b'c';
        cpu.regs.set_hl(0x0100);
        cpu.regs.set_bc(4);
        steps(&mut cpu, &mut bus, 3);
        assert_eq!(cpu.regs.pc, 2);
        assert!(cpu.regs.flag(flags::Z));
        assert_eq!(cpu.regs.hl(), 0x0103);
        assert_eq!(cpu.regs.bc(), 1);
        assert!(cpu.regs.flag(flags::P));
    }

    #[test]
    fn test_otir_sends_block() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0xB3]);
        bus.ram.load(0x0100, b"hi");
        cpu.regs.set_hl(0x0100);
        cpu.regs.b = 2;
        cpu.regs.c = 0x81;
        steps(&mut cpu, &mut bus, 2);
        assert_eq!(bus.out, vec![(0x0181, b'h'), (0x0081, b'i')]);
        assert!(cpu.regs.flag(flags::Z));
        assert_eq!(cpu.regs.pc, 2);
    }

    #[test]
    fn test_port_io() {
        let mut cpu = Z80::new();
        // LD A,41h; OUT (00h),A; IN A,(80h); IN B,(C)
        let mut bus = TestBus::with(&[0x3E, 0x41, 0xD3, 0x00, 0xDB, 0x80, 0xED, 0x40]);
        bus.input = 0x00;
        steps(&mut cpu, &mut bus, 2);
        assert_eq!(bus.out, vec![(0x4100, 0x41)]);
        bus.input = 0x7E;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.a, 0x7E);
        bus.input = 0x00;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.b, 0);
        assert!(cpu.regs.flag(flags::Z));
    }

    #[test]
    fn test_rld_rrd() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0x6F, 0xED, 0x67]);
        cpu.regs.set_hl(0x5000);
        cpu.regs.a = 0x7A;
        bus.write(0x5000, 0x31);
        steps(&mut cpu, &mut bus, 1); // RLD
        assert_eq!(cpu.regs.a, 0x73);
        assert_eq!(bus.read(0x5000), 0x1A);
        steps(&mut cpu, &mut bus, 1); // RRD
        assert_eq!(cpu.regs.a, 0x7A);
        assert_eq!(bus.read(0x5000), 0x31);
    }

    #[test]
    fn test_ld_a_i_copies_iff2() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xED, 0x57]);
        cpu.regs.i = 0x80;
        cpu.iff2 = true;
        steps(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.flag(flags::P));
        assert!(cpu.regs.flag(flags::S));
    }

    #[test]
    fn test_exchanges() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[0xEB, 0xE3]); // EX DE,HL; EX (SP),HL
        cpu.regs.set_de(0x1111);
        cpu.regs.set_hl(0x2222);
        cpu.regs.sp = 0x8000;
        bus.write_u16_le(0x8000, 0x3333);
        steps(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.regs.de(), 0x2222);
        assert_eq!(cpu.regs.hl(), 0x3333);
        assert_eq!(bus.read_u16_le(0x8000), 0x1111);
    }

    #[test]
    fn test_watchdog_trips_in_step() {
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&[]);
        steps(&mut cpu, &mut bus, 10);
        assert_eq!(
            cpu.step(&mut bus),
            Err(RunError::Watchdog { addr: 10, count: 11 })
        );
    }

    #[test]
    fn test_prefixed_nop_breaks_streak() {
        // 9 NOP, DD 00, 10 NOP, HALT: 19 NOP seguidos sin el prefijo
        let mut program = vec![0x00; 9];
        program.extend([0xDD, 0x00]);
        program.extend([0x00; 10]);
        program.push(0x76);
        let mut cpu = Z80::new();
        let mut bus = TestBus::with(&program);
        while !cpu.halted {
            cpu.step(&mut bus).unwrap();
        }
        assert_eq!(cpu.regs.pc, 22);
        assert_eq!(cpu.watchdog().streak(), 0);
    }

    #[test]
    fn test_trace_records_context() {
        let config = CpuConfig {
            trace: TraceConfig { enabled: true, capacity: 8 },
            ..CpuConfig::default()
        };
        let mut cpu = Z80::with_config(config);
        let mut bus = TestBus::with(&[0x3E, 0x01, 0xCB, 0x07, 0x76]);
        steps(&mut cpu, &mut bus, 3);
        let trace: Vec<_> = cpu.trace().copied().collect();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[0], TraceEntry { pc: 0, context: Context::Unprefixed, opcode: 0x3E });
        assert_eq!(trace[1], TraceEntry { pc: 2, context: Context::Cb, opcode: 0x07 });
        assert_eq!(trace[2].opcode, 0x76);
    }

    #[test]
    fn test_register_dump() {
        let mut cpu = Z80::new();
        cpu.regs.set_af(0x0841);
        let dump = cpu.to_string();
        assert!(dump.contains("PC=0000 SP=FFFF"));
        assert!(dump.contains("AF=0841"));
        assert!(dump.contains("F=-Z---C"));
    }
}
