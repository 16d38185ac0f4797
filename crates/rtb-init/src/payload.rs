//! One-shot payloads
//!
//! The initial task runs exactly one payload, synchronously, before it
//! idles. Any `FnOnce(&Kernel<H>) -> Result<(), PayloadError>` is a payload.

use alloc::format;

use rtb_hal::HAL;
use rtb_kernel::Kernel;

use crate::error::PayloadError;

/// Work done once by the initial task
pub trait Payload<H: HAL> {
    fn run(self, kernel: &Kernel<H>) -> Result<(), PayloadError>;
}

impl<H, F> Payload<H> for F
where
    H: HAL,
    F: FnOnce(&Kernel<H>) -> Result<(), PayloadError>,
{
    fn run(self, kernel: &Kernel<H>) -> Result<(), PayloadError> {
        self(kernel)
    }
}

/// Payload that does nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

impl<H: HAL> Payload<H> for Noop {
    fn run(self, _kernel: &Kernel<H>) -> Result<(), PayloadError> {
        Ok(())
    }
}

pub fn noop() -> Noop {
    Noop
}

/// Payload that writes a line to the console
#[derive(Clone, Copy, Debug)]
pub struct Greeting {
    text: &'static str,
}

impl<H: HAL> Payload<H> for Greeting {
    fn run(self, kernel: &Kernel<H>) -> Result<(), PayloadError> {
        kernel.console_write(self.text)?;
        kernel
            .hal()
            .debug_write(&format!("[init] greeting written ({} bytes)", self.text.len()));
        Ok(())
    }
}

pub fn greeting(text: &'static str) -> Greeting {
    Greeting { text }
}
