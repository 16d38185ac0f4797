//! Board presets
//!
//! Two complete budgets for the configurations the bootstrap ships with.
//! Both are resolved at compile time.

use crate::budget::ResourceBudget;
use crate::subsystems::Subsystem;
use crate::types::{InitTaskConfig, Limit, ObjectClass, StackSize, TaskPriority, Ticks};

/// Generic POSIX-capable image.
///
/// Console, clock, IMFS, libblock and the full shell; POSIX init thread table
/// with a generous POSIX budget. The initial task has no payload and wakes
/// every tick.
pub const GENERIC_POSIX: ResourceBudget = ResourceBudget::new()
    .enable(Subsystem::ConsoleDriver)
    .enable(Subsystem::ClockDriver)
    .enable(Subsystem::ImfsBaseFilesystem)
    .enable(Subsystem::Libblock)
    .enable(Subsystem::ShellCommands)
    .enable(Subsystem::PosixInitThread)
    .limit(ObjectClass::FileDescriptor, Limit::fixed(64))
    .imfs_bytes_per_block(512)
    .limit(ObjectClass::Driver, Limit::fixed(20))
    .swapout_task_priority(TaskPriority(2))
    .init_task(InitTaskConfig {
        priority: TaskPriority::LOWEST_APPLICATION,
        stack_size: StackSize::MINIMUM,
        idle_interval: Ticks(1),
    })
    .extra_task_stack(StackSize::MINIMUM.bytes())
    .limit(ObjectClass::Task, Limit::unlimited(20))
    .limit(ObjectClass::Barrier, Limit::unlimited(10))
    .limit(ObjectClass::Semaphore, Limit::unlimited(20))
    .limit(ObjectClass::MessageQueue, Limit::unlimited(4))
    .limit(ObjectClass::MemoryPartition, Limit::unlimited(2))
    .limit(ObjectClass::UserExtension, Limit::fixed(8))
    .limit(ObjectClass::Timer, Limit::fixed(8))
    .limit(ObjectClass::PosixKey, Limit::fixed(16))
    .limit(ObjectClass::PosixKeyValuePair, Limit::fixed(16))
    .limit(ObjectClass::PosixThread, Limit::fixed(10))
    .limit(ObjectClass::PosixConditionVariable, Limit::fixed(20))
    .limit(ObjectClass::PosixMutex, Limit::fixed(40))
    .microseconds_per_tick(1_000)
    .unified_work_areas()
    .unlimited_objects();

/// STM32F4 board image.
///
/// Same subsystems without the POSIX init thread table, a smaller budget,
/// and a one-second heartbeat after the greeting payload.
pub const STM32F4: ResourceBudget = ResourceBudget::new()
    .enable(Subsystem::ConsoleDriver)
    .enable(Subsystem::ClockDriver)
    .enable(Subsystem::ImfsBaseFilesystem)
    .enable(Subsystem::Libblock)
    .enable(Subsystem::ShellCommands)
    .limit(ObjectClass::FileDescriptor, Limit::fixed(32))
    .imfs_bytes_per_block(512)
    .limit(ObjectClass::Driver, Limit::fixed(10))
    .swapout_task_priority(TaskPriority(2))
    .init_task(InitTaskConfig {
        priority: TaskPriority::LOWEST_APPLICATION,
        stack_size: StackSize::MINIMUM,
        idle_interval: Ticks(1_000),
    })
    .extra_task_stack(StackSize::MINIMUM.bytes())
    .limit(ObjectClass::Task, Limit::unlimited(4))
    .limit(ObjectClass::Barrier, Limit::unlimited(4))
    .limit(ObjectClass::Semaphore, Limit::unlimited(10))
    .limit(ObjectClass::MessageQueue, Limit::unlimited(4))
    .limit(ObjectClass::MemoryPartition, Limit::unlimited(2))
    .limit(ObjectClass::UserExtension, Limit::fixed(8))
    .limit(ObjectClass::Timer, Limit::fixed(8))
    .limit(ObjectClass::PosixKey, Limit::fixed(1))
    .limit(ObjectClass::PosixKeyValuePair, Limit::fixed(1))
    .limit(ObjectClass::PosixThread, Limit::fixed(1))
    .limit(ObjectClass::PosixConditionVariable, Limit::fixed(2))
    .limit(ObjectClass::PosixMutex, Limit::fixed(4))
    .microseconds_per_tick(1_000)
    .unified_work_areas()
    .unlimited_objects();

/// Look up a preset by board name
pub fn by_name(name: &str) -> Option<&'static ResourceBudget> {
    match name {
        "generic-posix" | "generic" => Some(&GENERIC_POSIX),
        "stm32f4" => Some(&STM32F4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeBase;

    #[test]
    fn test_presets_validate_cleanly() {
        assert!(GENERIC_POSIX.validate().is_empty());
        assert!(STM32F4.validate().is_empty());
    }

    #[test]
    fn test_posix_entry_point_only_on_generic() {
        assert!(GENERIC_POSIX.requires_posix_entry_point());
        assert!(!STM32F4.requires_posix_entry_point());
    }

    #[test]
    fn test_one_millisecond_ticks() {
        assert_eq!(GENERIC_POSIX.time_base(), TimeBase::from_micros(1_000));
        assert_eq!(STM32F4.time_base(), TimeBase::from_micros(1_000));
    }

    #[test]
    fn test_heartbeat_intervals() {
        assert_eq!(GENERIC_POSIX.idle_interval(), Ticks(1));
        assert_eq!(STM32F4.idle_interval(), Ticks(1_000));
    }

    #[test]
    fn test_every_class_declared() {
        for preset in [&GENERIC_POSIX, &STM32F4] {
            for class in ObjectClass::ALL {
                assert!(preset.declared_limit(class).is_declared(), "{:?}", class);
            }
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(by_name("stm32f4"), Some(&STM32F4));
        assert_eq!(by_name("generic"), Some(&GENERIC_POSIX));
        assert_eq!(by_name("pc386"), None);
    }
}
