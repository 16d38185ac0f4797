//! Host HAL
//!
//! Runs the bootstrap as an ordinary process: the monotonic clock is an
//! `Instant` taken at construction, timed suspend is `thread::sleep`, the
//! console is stdout and the log channel is stderr.

use std::eprintln;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::{HalError, HAL};

/// HAL backed by the host operating system
pub struct HostHal {
    boot: Instant,
}

impl HostHal {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for HostHal {
    fn default() -> Self {
        Self::new()
    }
}

impl HAL for HostHal {
    fn now_nanos(&self) -> u64 {
        // u64 nanoseconds cover ~584 years of uptime
        self.boot.elapsed().as_nanos() as u64
    }

    fn sleep_nanos(&self, nanos: u64) {
        std::thread::sleep(Duration::from_nanos(nanos));
    }

    fn yield_now(&self) {
        std::thread::yield_now();
    }

    fn console_write(&self, text: &str) -> Result<(), HalError> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|_| HalError::IoError)
    }

    fn debug_write(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn halt(&self, reason: &str) -> ! {
        eprintln!("[host-hal] halted: {}", reason);
        std::process::abort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic_across_sleep() {
        let hal = HostHal::new();
        let before = hal.now_nanos();
        hal.sleep_nanos(1_000_000);
        let after = hal.now_nanos();
        assert!(after >= before + 1_000_000);
    }
}
