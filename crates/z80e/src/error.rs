use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("watchdog: {count} consecutive NOPs, last at {addr:#06X}")]
    Watchdog { addr: u16, count: u32 },
    #[error("program image of {len} bytes does not fit in 64K")]
    ImageTooLarge { len: usize },
}
