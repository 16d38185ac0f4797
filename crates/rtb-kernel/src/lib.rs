//! rtboot Executive
//!
//! This crate models the kernel side of the bootstrap:
//! - The start-up routine that consumes the resource budget once
//! - Per-class object tables with fixed and growable capacity
//! - Driver, root filesystem and stdio bookkeeping
//! - Tick-based timed suspend over the HAL clock
//! - Boot event log and the fatal halt path
//!
//! "Initializing" a subsystem here means reserving its slots and recording
//! it; the HAL is the only thing that touches hardware.

#![no_std]
extern crate alloc;

pub mod bootlog;
pub mod error;
pub mod kernel;
pub mod objects;
pub mod types;

// Re-export HAL types
pub use rtb_hal::{HalError, HAL as HalTrait};

pub use bootlog::{BootEvent, BootEventType, BootLog, EventId};
pub use error::{FatalError, FatalSource, KernelError};
pub use kernel::{system_reserve, Kernel, MountEntry, STDIO_DESCRIPTORS, SWAPOUT_TASK_NAME};
pub use objects::{ObjectTable, ObjectTables};
pub use types::{
    BootPhase, DriverEntry, InitialTaskState, ObjectClass, ObjectId, Owner, TaskArgument,
};
