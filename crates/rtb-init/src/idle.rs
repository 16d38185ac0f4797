//! Idle loop
//!
//! The initial task's permanent loop: wake after a fixed number of ticks,
//! then repeat. The wait is a timed suspend through the kernel, never a busy
//! wait; a zero interval yields instead.

use rtb_config::Ticks;
use rtb_hal::HAL;
use rtb_kernel::{Kernel, KernelError};

/// Fixed-period idle loop
#[derive(Clone, Debug)]
pub struct IdleLoop {
    interval: Ticks,
    iterations: u64,
}

impl IdleLoop {
    pub fn new(interval: Ticks) -> Self {
        Self {
            interval,
            iterations: 0,
        }
    }

    /// One iteration: suspend for the interval.
    pub fn tick<H: HAL>(&mut self, kernel: &Kernel<H>) -> Result<(), KernelError> {
        kernel.wake_after(self.interval)?;
        self.iterations += 1;
        Ok(())
    }

    /// Iterate forever. A failing iteration halts through the kernel.
    pub fn run<H: HAL>(&mut self, kernel: &mut Kernel<H>) -> ! {
        loop {
            if let Err(e) = self.tick(kernel) {
                kernel.fatal(e.into());
            }
        }
    }

    pub fn interval(&self) -> Ticks {
        self.interval
    }

    /// Iterations completed
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
