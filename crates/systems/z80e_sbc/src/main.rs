// crates/systems/z80e_sbc/src/main.rs
mod board;
mod diag;

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use z80e::{CpuConfig, Machine, TraceConfig, WatchdogConfig};
use z80e_core::Image;
use z80e_serial::{HostConsole, TerminalConsole};

use crate::board::Board;
use crate::diag::{MemoryDump, TraceDump};

/// Z80 single-board computer: 64K RAM, console on port 0x00, ACIA on 0x80/0x81.
#[derive(Parser, Debug)]
#[command(name = "z80e_sbc", version, about)]
struct Args {
    /// Intel HEX program, loaded at address 0000h and run
    #[arg(short, long, value_name = "HEX")]
    source: PathBuf,

    /// Record executed instructions and print them after the run
    #[arg(short, long)]
    debug: bool,

    /// Dump memory after the run
    #[arg(short, long)]
    print_memory: bool,

    /// With --print-memory, dump all 64K instead of the program region
    #[arg(long)]
    full_dump: bool,

    /// Dump registers and flags after the run
    #[arg(short, long)]
    registers: bool,

    /// Disable the NOP watchdog
    #[arg(short = 'w', long)]
    no_watchdog: bool,

    /// Consecutive NOPs allowed before the watchdog trips
    #[arg(long, value_name = "N", default_value_t = 10)]
    watchdog_threshold: u32,

    /// Instructions kept by --debug
    #[arg(long, value_name = "N", default_value_t = 65536)]
    trace_capacity: usize,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG manda sobre -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = CpuConfig {
        watchdog: WatchdogConfig {
            enabled: !args.no_watchdog,
            threshold: args.watchdog_threshold,
        },
        trace: TraceConfig {
            enabled: args.debug,
            capacity: args.trace_capacity,
        },
    };

    // La imagen se valida entera antes de tocar la terminal
    let image = Image::from_file(&args.source)?;
    tracing::info!(path = %args.source.display(), "loading program");

    let board = Board::new(TerminalConsole::new()?);
    let mut machine = Machine::with_config(board, config);
    machine.load_program(&image.data)?;

    let outcome = machine.run_with(|m| m.bus.console().interrupted());
    let program_len = machine.program().len();

    // Soltar la consola devuelve la terminal al modo normal antes de los volcados
    let (cpu, board) = machine.into_parts();
    let memory = board.into_memory();

    match &outcome {
        Ok(summary) if summary.halted => tracing::info!(steps = summary.steps, "program halted"),
        Ok(summary) => println!("\nstopped after {} steps at PC={:04X}", summary.steps, cpu.regs.pc),
        Err(_) => print!("{}", cpu),
    }

    if args.debug {
        print!("{}", TraceDump(&cpu));
    }
    if args.print_memory {
        if args.full_dump {
            print!("{}", MemoryDump::full(&memory));
        } else {
            print!("{}", MemoryDump::program(&memory, program_len));
        }
    }
    if args.registers && outcome.is_ok() {
        print!("{}", cpu);
    }

    outcome?;
    Ok(())
}
