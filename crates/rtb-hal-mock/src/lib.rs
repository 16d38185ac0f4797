//! Mock HAL implementation for testing rtboot
//!
//! This provides a mock implementation of the HAL trait that can be used
//! for unit testing the bootstrap without a board or real time passing.
//! The clock is injected: it only moves when a task sleeps or a test
//! advances it.

#![no_std]
extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::sync::atomic::{AtomicU64, Ordering};
use rtb_hal::{HalError, HAL};

/// Mock HAL for unit testing
///
/// Provides a simulated clock, captured console and debug output, a record
/// of every timed suspend, and console fault injection.
pub struct MockHal {
    /// Simulated time in nanoseconds
    time: AtomicU64,
    /// Extra nanoseconds added to every sleep (scheduler jitter)
    jitter: AtomicU64,
    /// Number of untimed yields
    yields: AtomicU64,
    /// Captured debug messages
    debug_log: RefCell<Vec<String>>,
    /// Captured console output, one entry per write
    console: RefCell<Vec<String>>,
    /// Requested sleep durations, in order
    sleeps: RefCell<Vec<u64>>,
    /// Clock value at each wake-up, in order
    wakeups: RefCell<Vec<u64>>,
    /// When set, console writes fail with this error
    console_fault: RefCell<Option<HalError>>,
}

impl MockHal {
    /// Create a new mock HAL
    pub fn new() -> Self {
        Self::with_time(0)
    }

    /// Create a mock HAL with a specific starting time
    pub fn with_time(nanos: u64) -> Self {
        Self {
            time: AtomicU64::new(nanos),
            jitter: AtomicU64::new(0),
            yields: AtomicU64::new(0),
            debug_log: RefCell::new(Vec::new()),
            console: RefCell::new(Vec::new()),
            sleeps: RefCell::new(Vec::new()),
            wakeups: RefCell::new(Vec::new()),
            console_fault: RefCell::new(None),
        }
    }

    /// Advance the simulated time by the given duration
    pub fn advance_time(&self, nanos: u64) {
        self.time.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Set the simulated time to a specific value
    pub fn set_time(&self, nanos: u64) {
        self.time.store(nanos, Ordering::SeqCst);
    }

    /// Add a fixed overshoot to every subsequent sleep
    pub fn set_jitter(&self, nanos: u64) {
        self.jitter.store(nanos, Ordering::SeqCst);
    }

    /// Make every subsequent console write fail
    pub fn fail_console(&self, error: HalError) {
        *self.console_fault.borrow_mut() = Some(error);
    }

    /// Get all captured debug messages
    pub fn get_debug_log(&self) -> Vec<String> {
        self.debug_log.borrow().clone()
    }

    /// Clear the debug log
    pub fn clear_debug_log(&self) {
        self.debug_log.borrow_mut().clear();
    }

    /// Check if a specific message was logged
    pub fn has_log_containing(&self, substr: &str) -> bool {
        self.debug_log
            .borrow()
            .iter()
            .any(|msg| msg.contains(substr))
    }

    /// Get all console output
    pub fn console_output(&self) -> Vec<String> {
        self.console.borrow().clone()
    }

    /// Requested sleep durations, in order
    pub fn sleep_durations(&self) -> Vec<u64> {
        self.sleeps.borrow().clone()
    }

    /// Clock values observed at each wake-up
    pub fn wakeup_times(&self) -> Vec<u64> {
        self.wakeups.borrow().clone()
    }

    /// Number of timed wake-ups so far
    pub fn wakeup_count(&self) -> usize {
        self.wakeups.borrow().len()
    }

    /// Number of untimed yields so far
    pub fn yield_count(&self) -> u64 {
        self.yields.load(Ordering::SeqCst)
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

// MockHal is Send + Sync because it uses atomic operations and RefCell
// is only accessed in single-threaded test contexts
unsafe impl Send for MockHal {}
unsafe impl Sync for MockHal {}

impl HAL for MockHal {
    fn now_nanos(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    fn sleep_nanos(&self, nanos: u64) {
        let slept = nanos + self.jitter.load(Ordering::SeqCst);
        let woke_at = self.time.fetch_add(slept, Ordering::SeqCst) + slept;
        self.sleeps.borrow_mut().push(nanos);
        self.wakeups.borrow_mut().push(woke_at);
    }

    fn yield_now(&self) {
        self.yields.fetch_add(1, Ordering::SeqCst);
    }

    fn console_write(&self, text: &str) -> Result<(), HalError> {
        if let Some(error) = *self.console_fault.borrow() {
            return Err(error);
        }
        self.console.borrow_mut().push(String::from(text));
        Ok(())
    }

    fn debug_write(&self, msg: &str) {
        self.debug_log.borrow_mut().push(String::from(msg));
    }

    fn halt(&self, reason: &str) -> ! {
        self.debug_log
            .borrow_mut()
            .push(alloc::format!("[mock-hal] halted: {}", reason));
        panic!("[mock-hal] halted: {}", reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_records_wakeups() {
        let hal = MockHal::new();
        hal.sleep_nanos(1_000);
        hal.sleep_nanos(1_000);

        assert_eq!(hal.sleep_durations(), [1_000, 1_000]);
        assert_eq!(hal.wakeup_times(), [1_000, 2_000]);
        assert_eq!(hal.now_nanos(), 2_000);
    }

    #[test]
    fn test_jitter_extends_sleep() {
        let hal = MockHal::with_time(500);
        hal.set_jitter(7);
        hal.sleep_nanos(1_000);

        assert_eq!(hal.sleep_durations(), [1_000]);
        assert_eq!(hal.wakeup_times(), [1_507]);
    }

    #[test]
    fn test_console_capture_and_fault() {
        let hal = MockHal::new();
        hal.console_write("hello\n").unwrap();
        assert_eq!(hal.console_output(), ["hello\n"]);

        hal.fail_console(HalError::IoError);
        assert_eq!(hal.console_write("again"), Err(HalError::IoError));
        assert_eq!(hal.console_output().len(), 1);
    }

    #[test]
    fn test_debug_log_capture() {
        let hal = MockHal::new();
        hal.debug_write("[kernel] start");
        assert!(hal.has_log_containing("start"));

        hal.clear_debug_log();
        assert!(hal.get_debug_log().is_empty());
    }

    #[test]
    #[should_panic(expected = "[mock-hal] halted: boom")]
    fn test_halt_panics() {
        MockHal::new().halt("boom");
    }
}
