//! Cross-field budget rules
//!
//! The const builder rejects out-of-range single values at compile time.
//! Rules that relate two declarations to each other are checked here and
//! again by the kernel start-up routine before anything is allocated. A
//! budget read back through serde never passes the builder, so the single
//! value ranges are repeated here as rules 7 to 10.
//!
//! # Rules
//!
//! 1. **Unlimited needs unified work areas**: growable tables draw from the
//!    shared work area
//! 2. **Timed idle needs a clock**: a non-zero idle interval sleeps on ticks
//! 3. **Shell needs a console**
//! 4. **POSIX init thread needs a thread slot**
//! 5. **Initial task needs a task slot**
//! 6. **IMFS block size**: power of two in 16..=512 when IMFS is enabled
//! 7. **Tick length**: at least one microsecond
//! 8. **Limits**: fixed caps and unlimited increments at least 1
//! 9. **Stack sizes**: initial and extra task stacks at the kernel minimum
//! 10. **Priorities**: priority 0 is reserved

use alloc::string::String;
use alloc::vec::Vec;

use crate::budget::ResourceBudget;
use crate::subsystems::Subsystem;
use crate::types::{Limit, ObjectClass, StackSize};

/// A rule violation with details
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigViolation {
    /// Name of the violated rule
    pub rule: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all budget rules.
///
/// Returns a list of violations (empty if all rules hold).
pub fn check_all(budget: &ResourceBudget) -> Vec<ConfigViolation> {
    let mut violations = Vec::new();

    violations.extend(check_unlimited_work_areas(budget));
    violations.extend(check_idle_clock(budget));
    violations.extend(check_shell_console(budget));
    violations.extend(check_posix_init_thread(budget));
    violations.extend(check_init_task_slot(budget));
    violations.extend(check_imfs_block_size(budget));
    violations.extend(check_tick_length(budget));
    violations.extend(check_limits_nonzero(budget));
    violations.extend(check_stack_sizes(budget));
    violations.extend(check_priorities(budget));

    violations
}

/// Rule 1
fn check_unlimited_work_areas(budget: &ResourceBudget) -> Option<ConfigViolation> {
    if budget.has_unified_work_areas() {
        return None;
    }
    let unlimited: Vec<&str> = budget
        .limits()
        .filter(|rl| rl.limit.is_unlimited())
        .map(|rl| rl.class.name())
        .collect();
    if unlimited.is_empty() {
        return None;
    }
    Some(ConfigViolation {
        rule: "unlimited_requires_unified_work_areas",
        description: alloc::format!(
            "Unlimited classes [{}] declared without unified work areas",
            unlimited.join(", ")
        ),
    })
}

/// Rule 2
fn check_idle_clock(budget: &ResourceBudget) -> Option<ConfigViolation> {
    let interval = budget.idle_interval();
    (interval.0 > 0 && !budget.has(Subsystem::ClockDriver)).then(|| ConfigViolation {
        rule: "idle_interval_requires_clock_driver",
        description: alloc::format!(
            "Initial task sleeps {} ticks per iteration but the clock driver is not configured",
            interval.0
        ),
    })
}

/// Rule 3
fn check_shell_console(budget: &ResourceBudget) -> Option<ConfigViolation> {
    (budget.has(Subsystem::ShellCommands) && !budget.has(Subsystem::ConsoleDriver)).then(|| {
        ConfigViolation {
            rule: "shell_requires_console_driver",
            description: String::from("Shell command set linked without a console driver"),
        }
    })
}

/// Rule 4
fn check_posix_init_thread(budget: &ResourceBudget) -> Option<ConfigViolation> {
    let threads = budget.limit_of(ObjectClass::PosixThread);
    (budget.has(Subsystem::PosixInitThread) && threads == Limit::Undeclared).then(|| {
        ConfigViolation {
            rule: "posix_init_thread_requires_thread_slot",
            description: String::from(
                "POSIX init thread table configured but no POSIX threads declared",
            ),
        }
    })
}

/// Rule 5
fn check_init_task_slot(budget: &ResourceBudget) -> Option<ConfigViolation> {
    (budget.limit_of(ObjectClass::Task) == Limit::Undeclared).then(|| ConfigViolation {
        rule: "init_task_requires_task_slot",
        description: String::from("No tasks declared; the initial task cannot be created"),
    })
}

/// Rule 6
fn check_imfs_block_size(budget: &ResourceBudget) -> Option<ConfigViolation> {
    let size = budget.imfs_block_size();
    let valid = size.is_power_of_two() && (16..=512).contains(&size);
    (budget.has(Subsystem::ImfsBaseFilesystem) && !valid).then(|| ConfigViolation {
        rule: "imfs_block_size",
        description: alloc::format!(
            "IMFS bytes per block is {}; expected a power of two in 16..=512",
            size
        ),
    })
}

/// Rule 7
fn check_tick_length(budget: &ResourceBudget) -> Option<ConfigViolation> {
    (budget.time_base().microseconds_per_tick() == 0).then(|| ConfigViolation {
        rule: "tick_length_nonzero",
        description: String::from("Tick length is 0 microseconds"),
    })
}

/// Rule 8
fn check_limits_nonzero(budget: &ResourceBudget) -> Option<ConfigViolation> {
    let zero: Vec<&str> = budget
        .limits()
        .filter(|rl| matches!(rl.limit, Limit::Fixed(0) | Limit::Unlimited { increment: 0 }))
        .map(|rl| rl.class.name())
        .collect();
    if zero.is_empty() {
        return None;
    }
    Some(ConfigViolation {
        rule: "limit_at_least_one",
        description: alloc::format!(
            "Classes [{}] declared with a zero cap or zero allocation increment",
            zero.join(", ")
        ),
    })
}

/// Rule 9
fn check_stack_sizes(budget: &ResourceBudget) -> Option<ConfigViolation> {
    let minimum = StackSize::MINIMUM.bytes();
    let init = budget.init_task_config().stack_size.bytes();
    let extra = budget.extra_task_stack_bytes();
    (init < minimum || (extra != 0 && extra < minimum)).then(|| ConfigViolation {
        rule: "stack_size_minimum",
        description: alloc::format!(
            "Initial task stack {} and extra task stack {} bytes; minimum is {}",
            init,
            extra,
            minimum
        ),
    })
}

/// Rule 10
fn check_priorities(budget: &ResourceBudget) -> Option<ConfigViolation> {
    let init = budget.init_task_config().priority;
    let swapout = budget.swapout_priority();
    (!init.is_valid() || !swapout.is_valid()).then(|| ConfigViolation {
        rule: "priority_reserved",
        description: String::from("Initial or swap-out task priority is the reserved priority 0"),
    })
}
