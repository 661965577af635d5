use crate::{RunError, WatchdogConfig};

/// Trips when more than `threshold` unprefixed NOPs run back to back,
/// the usual sign of execution running off into zeroed memory.
#[derive(Debug, Clone)]
pub struct Watchdog {
    config: WatchdogConfig,
    streak: u32,
}

impl Watchdog {
    pub fn new(config: WatchdogConfig) -> Self {
        Self { config, streak: 0 }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        self.config.threshold = threshold;
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Counts a NOP executed at `addr`.
    pub fn nop(&mut self, addr: u16) -> Result<(), RunError> {
        self.streak = self.streak.saturating_add(1);
        if self.config.enabled && self.streak > self.config.threshold {
            return Err(RunError::Watchdog {
                addr,
                count: self.streak,
            });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_one_past_threshold() {
        let mut wd = Watchdog::new(WatchdogConfig { enabled: true, threshold: 3 });
        for addr in 0..3 {
            assert!(wd.nop(addr).is_ok());
        }
        assert_eq!(wd.nop(3), Err(RunError::Watchdog { addr: 3, count: 4 }));
    }

    #[test]
    fn other_instruction_resets_streak() {
        let mut wd = Watchdog::new(WatchdogConfig { enabled: true, threshold: 2 });
        wd.nop(0).unwrap();
        wd.nop(1).unwrap();
        wd.clear();
        assert_eq!(wd.streak(), 0);
        assert!(wd.nop(3).is_ok());
    }

    #[test]
    fn disabled_guard_only_counts() {
        let mut wd = Watchdog::new(WatchdogConfig { enabled: false, threshold: 1 });
        for addr in 0..100 {
            assert!(wd.nop(addr).is_ok());
        }
        assert_eq!(wd.streak(), 100);
    }
}
