//! Named configuration constants
//!
//! Renders a budget as the flat list of named constants the kernel's build
//! contract consumes at its single start-up inclusion point. Flags come
//! first, then sizes, then object limits, then the tick length and table
//! switches. `CONFIGURE_INIT` closes the list and marks the inclusion point
//! itself, so every other value is declared before it.

use alloc::vec::Vec;
use core::fmt;

use crate::budget::ResourceBudget;
use crate::subsystems::Subsystem;
use crate::types::{Limit, ObjectClass};

/// Value of one configuration constant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstantValue {
    /// Presence-only switch
    Flag,
    /// Plain number
    Number(u64),
    /// Unlimited class with its allocation increment
    Unlimited(u32),
}

/// One named configuration constant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigurationConstant {
    pub name: &'static str,
    pub value: ConstantValue,
}

impl fmt::Display for ConfigurationConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            ConstantValue::Flag => write!(f, "{}", self.name),
            ConstantValue::Number(n) => write!(f, "{} = {}", self.name, n),
            ConstantValue::Unlimited(inc) => write!(f, "{} = unlimited({})", self.name, inc),
        }
    }
}

/// Constant name for a class limit
pub const fn limit_constant_name(class: ObjectClass) -> &'static str {
    match class {
        ObjectClass::Task => "CONFIGURE_MAXIMUM_TASKS",
        ObjectClass::Semaphore => "CONFIGURE_MAXIMUM_SEMAPHORES",
        ObjectClass::Barrier => "CONFIGURE_MAXIMUM_BARRIERS",
        ObjectClass::MessageQueue => "CONFIGURE_MAXIMUM_MESSAGE_QUEUES",
        ObjectClass::MemoryPartition => "CONFIGURE_MAXIMUM_PARTITIONS",
        ObjectClass::Timer => "CONFIGURE_MAXIMUM_TIMERS",
        ObjectClass::UserExtension => "CONFIGURE_MAXIMUM_USER_EXTENSIONS",
        ObjectClass::PosixKey => "CONFIGURE_MAXIMUM_POSIX_KEYS",
        ObjectClass::PosixKeyValuePair => "CONFIGURE_MAXIMUM_POSIX_KEY_VALUE_PAIRS",
        ObjectClass::PosixMutex => "CONFIGURE_MAXIMUM_POSIX_MUTEXES",
        ObjectClass::PosixConditionVariable => "CONFIGURE_MAXIMUM_POSIX_CONDITION_VARIABLES",
        ObjectClass::PosixThread => "CONFIGURE_MAXIMUM_POSIX_THREADS",
        ObjectClass::FileDescriptor => "CONFIGURE_LIBIO_MAXIMUM_FILE_DESCRIPTORS",
        ObjectClass::Driver => "CONFIGURE_MAXIMUM_DRIVERS",
    }
}

/// Render `budget` as named constants, undeclared classes omitted.
pub fn configuration_constants(budget: &ResourceBudget) -> Vec<ConfigurationConstant> {
    let mut out = Vec::new();
    let mut flag = |name: &'static str| out.push(ConfigurationConstant {
        name,
        value: ConstantValue::Flag,
    });

    if budget.has(Subsystem::ConsoleDriver) {
        flag("CONFIGURE_APPLICATION_NEEDS_CONSOLE_DRIVER");
    }
    if budget.has(Subsystem::ClockDriver) {
        flag("CONFIGURE_APPLICATION_NEEDS_CLOCK_DRIVER");
    }
    if budget.has(Subsystem::ImfsBaseFilesystem) {
        flag("CONFIGURE_USE_IMFS_AS_BASE_FILESYSTEM");
    }
    if budget.has(Subsystem::Libblock) {
        flag("CONFIGURE_APPLICATION_NEEDS_LIBBLOCK");
    }
    flag("CONFIGURE_RTEMS_INIT_TASKS_TABLE");

    let number = |name: &'static str, n: u64| ConfigurationConstant {
        name,
        value: ConstantValue::Number(n),
    };

    if budget.has(Subsystem::ImfsBaseFilesystem) {
        out.push(number(
            "CONFIGURE_IMFS_MEMFILE_BYTES_PER_BLOCK",
            budget.imfs_block_size() as u64,
        ));
    }
    if budget.has(Subsystem::Libblock) {
        out.push(number(
            "CONFIGURE_SWAPOUT_TASK_PRIORITY",
            budget.swapout_priority().0 as u64,
        ));
    }
    let init = budget.init_task_config();
    out.push(number(
        "CONFIGURE_INIT_TASK_STACK_SIZE",
        init.stack_size.bytes() as u64,
    ));
    out.push(number("CONFIGURE_INIT_TASK_PRIORITY", init.priority.0 as u64));
    if budget.extra_task_stack_bytes() > 0 {
        out.push(number(
            "CONFIGURE_EXTRA_TASK_STACKS",
            budget.extra_task_stack_bytes() as u64,
        ));
    }

    for class in ObjectClass::ALL {
        let value = match budget.declared_limit(class) {
            Limit::Undeclared => continue,
            Limit::Fixed(max) => ConstantValue::Number(max as u64),
            Limit::Unlimited { increment } => ConstantValue::Unlimited(increment),
        };
        out.push(ConfigurationConstant {
            name: limit_constant_name(class),
            value,
        });
    }

    if budget.has_unified_work_areas() {
        out.push(ConfigurationConstant {
            name: "CONFIGURE_UNIFIED_WORK_AREAS",
            value: ConstantValue::Flag,
        });
    }
    out.push(number(
        "CONFIGURE_MICROSECONDS_PER_TICK",
        budget.time_base().microseconds_per_tick() as u64,
    ));

    let switches: [(Subsystem, &[&'static str]); 2] = [
        (
            Subsystem::ShellCommands,
            &["CONFIGURE_SHELL_COMMANDS_INIT", "CONFIGURE_SHELL_COMMANDS_ALL"],
        ),
        (Subsystem::PosixInitThread, &["CONFIGURE_POSIX_INIT_THREAD_TABLE"]),
    ];
    for (subsystem, names) in switches {
        if budget.has(subsystem) {
            out.extend(names.iter().map(|&name| ConfigurationConstant {
                name,
                value: ConstantValue::Flag,
            }));
        }
    }
    if budget.has_unlimited_objects() {
        out.push(ConfigurationConstant {
            name: "CONFIGURE_UNLIMITED_OBJECTS",
            value: ConstantValue::Flag,
        });
    }
    out.push(ConfigurationConstant {
        name: "CONFIGURE_INIT",
        value: ConstantValue::Flag,
    });

    out
}
