//! POSIX secondary initializer
//!
//! Exists only when the budget carries the POSIX init thread table. It
//! does no work and returns immediately.

use rtb_config::ResourceBudget;
use rtb_kernel::TaskArgument;

/// Name the POSIX init thread is created under
pub const POSIX_INIT_THREAD_NAME: &str = "POSIX_Init";

/// POSIX init thread entry point
pub type PosixEntryPoint = fn(TaskArgument);

fn posix_init(_argument: TaskArgument) {}

/// The POSIX entry point, if `budget` generates one
pub fn entry_point(budget: &ResourceBudget) -> Option<PosixEntryPoint> {
    budget
        .requires_posix_entry_point()
        .then_some(posix_init as PosixEntryPoint)
}
