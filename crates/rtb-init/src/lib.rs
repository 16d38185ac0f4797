//! Initial Task for rtboot
//!
//! The initial task is the single entry point the kernel dispatches once
//! every declared subsystem is up. Its whole life is:
//!
//! - **Payload**: run one injected callback, synchronously
//! - **Idle**: wake after a fixed tick count, then repeat, forever
//!
//! When the budget carries the POSIX init thread table a second, empty
//! entry point is generated next to it.

#![no_std]
extern crate alloc;

// =============================================================================
// Module Organization
// =============================================================================

mod bootstrap;
pub mod error;
pub mod idle;
pub mod payload;
pub mod posix;
pub mod task;

pub use bootstrap::{boot, Bootstrap};
pub use error::{BootError, PayloadError, TaskError};
pub use idle::IdleLoop;
pub use payload::{greeting, noop, Payload};
pub use posix::PosixEntryPoint;
pub use task::{InitialTask, INIT_TASK_NAME};
