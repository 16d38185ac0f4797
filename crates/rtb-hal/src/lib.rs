//! Hardware Abstraction Layer trait for rtboot
//!
//! This crate defines the HAL trait that lets the bootstrap and the executive
//! model run unchanged on a board, on the host, or under test, by abstracting
//! the few hardware services a start-up layer touches.
//!
//! # Platform Implementations
//!
//! - **Host** (`std` feature): `Instant` for time, `thread::sleep` for timed
//!   suspend, stdout for the console
//! - **Test**: [`TestHal`] here, and `MockHal` in `rtb-hal-mock`
//! - **Board**: clock driver tick counter, console UART, reset/halt

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
mod host;

#[cfg(feature = "std")]
pub use host::HostHal;

use core::sync::atomic::{AtomicU64, Ordering};

/// Hardware Abstraction Layer trait
///
/// Implementations provide platform-specific functionality for:
/// - Time measurement and timed suspend
/// - Console output (the application-visible channel)
/// - Debug output (the kernel log channel)
/// - Fatal halt
pub trait HAL: Send + Sync + 'static {
    // === Time ===

    /// Get current time in nanoseconds (monotonic, since boot)
    fn now_nanos(&self) -> u64;

    /// Suspend the calling task for at least `nanos` nanoseconds.
    ///
    /// This is a cooperative suspend: the processor is yielded to any other
    /// runnable task for the duration. It is never a busy wait.
    fn sleep_nanos(&self, nanos: u64);

    /// Yield the processor without a timed delay.
    fn yield_now(&self);

    // === Console ===

    /// Write text to the console device
    ///
    /// # Returns
    /// * `Ok(())` - Text written
    /// * `Err(HalError::IoError)` - The device rejected the write
    fn console_write(&self, text: &str) -> Result<(), HalError>;

    // === Debug ===

    /// Write a debug message to the platform's log channel
    fn debug_write(&self, msg: &str);

    // === Fatal ===

    /// Stop the processor after an unrecoverable fault.
    ///
    /// On a board this halts or resets. Test implementations panic so the
    /// fault is observable.
    fn halt(&self, reason: &str) -> !;
}

/// HAL errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalError {
    /// I/O error
    IoError,
}

/// A minimal test HAL for unit testing
///
/// Time only moves when a task sleeps. Console and debug output are dropped,
/// and `halt` panics with the reason.
#[derive(Default)]
pub struct TestHal {
    time: AtomicU64,
}

impl TestHal {
    pub fn new() -> Self {
        Self {
            time: AtomicU64::new(0),
        }
    }
}

impl HAL for TestHal {
    fn now_nanos(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    fn sleep_nanos(&self, nanos: u64) {
        self.time.fetch_add(nanos, Ordering::SeqCst);
    }

    fn yield_now(&self) {}

    fn console_write(&self, _text: &str) -> Result<(), HalError> {
        Ok(())
    }

    fn debug_write(&self, _msg: &str) {
        // No-op for tests
    }

    fn halt(&self, reason: &str) -> ! {
        panic!("halted: {}", reason)
    }
}
