//! Core descriptor types
//!
//! This module contains the value types the resource budget is built from.
//! All types here are pure data: `Copy`, `const`-constructible, and
//! serializable so a resolved budget can be dumped by tools.

use serde::{Deserialize, Serialize};

// ============================================================================
// Object classes
// ============================================================================

/// Kernel-managed object classes that need a declared capacity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectClass {
    /// Native task
    Task = 0,
    /// Counting or binary semaphore
    Semaphore = 1,
    /// Task barrier
    Barrier = 2,
    /// Message queue
    MessageQueue = 3,
    /// Fixed-size memory partition
    MemoryPartition = 4,
    /// Tick-based timer
    Timer = 5,
    /// User extension (kernel event hook set)
    UserExtension = 6,
    /// POSIX thread-specific data key
    PosixKey = 7,
    /// POSIX key/value pair storage
    PosixKeyValuePair = 8,
    /// POSIX mutex
    PosixMutex = 9,
    /// POSIX condition variable
    PosixConditionVariable = 10,
    /// POSIX thread
    PosixThread = 11,
    /// Open file descriptor
    FileDescriptor = 12,
    /// Device driver table entry
    Driver = 13,
}

impl ObjectClass {
    /// Number of object classes
    pub const COUNT: usize = 14;

    /// Every class, in declaration order
    pub const ALL: [ObjectClass; ObjectClass::COUNT] = [
        ObjectClass::Task,
        ObjectClass::Semaphore,
        ObjectClass::Barrier,
        ObjectClass::MessageQueue,
        ObjectClass::MemoryPartition,
        ObjectClass::Timer,
        ObjectClass::UserExtension,
        ObjectClass::PosixKey,
        ObjectClass::PosixKeyValuePair,
        ObjectClass::PosixMutex,
        ObjectClass::PosixConditionVariable,
        ObjectClass::PosixThread,
        ObjectClass::FileDescriptor,
        ObjectClass::Driver,
    ];

    /// Table index of this class
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for the POSIX API classes
    pub const fn is_posix(self) -> bool {
        matches!(
            self,
            ObjectClass::PosixKey
                | ObjectClass::PosixKeyValuePair
                | ObjectClass::PosixMutex
                | ObjectClass::PosixConditionVariable
                | ObjectClass::PosixThread
        )
    }

    /// True for classes that live in the kernel object tables and may grow
    /// when unlimited objects are enabled. File descriptors, drivers and user
    /// extensions are always sized exactly.
    pub const fn is_growable(self) -> bool {
        !matches!(
            self,
            ObjectClass::FileDescriptor | ObjectClass::Driver | ObjectClass::UserExtension
        )
    }

    /// Short lowercase name for logs
    pub const fn name(self) -> &'static str {
        match self {
            ObjectClass::Task => "task",
            ObjectClass::Semaphore => "semaphore",
            ObjectClass::Barrier => "barrier",
            ObjectClass::MessageQueue => "message_queue",
            ObjectClass::MemoryPartition => "partition",
            ObjectClass::Timer => "timer",
            ObjectClass::UserExtension => "user_extension",
            ObjectClass::PosixKey => "posix_key",
            ObjectClass::PosixKeyValuePair => "posix_key_value_pair",
            ObjectClass::PosixMutex => "posix_mutex",
            ObjectClass::PosixConditionVariable => "posix_condition_variable",
            ObjectClass::PosixThread => "posix_thread",
            ObjectClass::FileDescriptor => "file_descriptor",
            ObjectClass::Driver => "driver",
        }
    }
}

// ============================================================================
// Limits
// ============================================================================

/// Capacity declared for one object class
///
/// - `Undeclared`: the class was never declared; capacity is zero and any
///   creation fails at runtime.
/// - `Fixed(n)`: at most `n` live objects, `n >= 1`.
/// - `Unlimited { increment }`: no cap; the table grows in blocks of
///   `increment` objects, `increment >= 1`. Requires unified work areas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    Undeclared,
    Fixed(u32),
    Unlimited { increment: u32 },
}

impl Limit {
    /// A fixed cap. Zero is rejected at compile time in const context.
    pub const fn fixed(max: u32) -> Self {
        assert!(max > 0, "fixed object limit must be at least 1");
        Limit::Fixed(max)
    }

    /// An unlimited class growing `increment` objects at a time.
    pub const fn unlimited(increment: u32) -> Self {
        assert!(increment > 0, "unlimited allocation increment must be at least 1");
        Limit::Unlimited { increment }
    }

    pub const fn is_declared(self) -> bool {
        !matches!(self, Limit::Undeclared)
    }

    pub const fn is_unlimited(self) -> bool {
        matches!(self, Limit::Unlimited { .. })
    }

    /// Hard cap on live objects, `None` when unlimited
    pub const fn cap(self) -> Option<u32> {
        match self {
            Limit::Undeclared => Some(0),
            Limit::Fixed(max) => Some(max),
            Limit::Unlimited { .. } => None,
        }
    }

    /// Objects pre-allocated at kernel start
    pub const fn initial_capacity(self) -> u32 {
        match self {
            Limit::Undeclared => 0,
            Limit::Fixed(max) => max,
            Limit::Unlimited { increment } => increment,
        }
    }
}

/// A (class, limit) pair as declared in the budget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimit {
    pub class: ObjectClass,
    pub limit: Limit,
}

// ============================================================================
// Time
// ============================================================================

/// Relative time in kernel ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticks(pub u32);

/// Tick granularity: microseconds per clock tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBase {
    microseconds_per_tick: u32,
}

impl TimeBase {
    /// Kernel default when the budget does not set one (10 ms ticks)
    pub const DEFAULT: TimeBase = TimeBase::from_micros(10_000);

    pub const fn from_micros(microseconds_per_tick: u32) -> Self {
        assert!(microseconds_per_tick > 0, "tick length must be at least 1 microsecond");
        Self {
            microseconds_per_tick,
        }
    }

    pub const fn microseconds_per_tick(self) -> u32 {
        self.microseconds_per_tick
    }

    /// Length of `ticks` in nanoseconds, `None` when it does not fit in u64
    pub const fn ticks_to_nanos(self, ticks: Ticks) -> Option<u64> {
        // u32 * u32 always fits; only the scale to nanoseconds can overflow
        let micros = ticks.0 as u64 * self.microseconds_per_tick as u64;
        micros.checked_mul(1_000)
    }

    /// Whole ticks elapsed in `nanos` (rounded down). A zero-length tick,
    /// which only a deserialized budget can carry, counts no ticks.
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        match nanos.checked_div(self.microseconds_per_tick as u64 * 1_000) {
            Some(ticks) => ticks,
            None => 0,
        }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Task priority. Lower numbers are more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskPriority(pub u8);

impl TaskPriority {
    /// Most urgent application priority (0 is reserved)
    pub const HIGHEST: TaskPriority = TaskPriority(1);
    /// Lowest priority an application task may hold; 255 belongs to the
    /// kernel's own idle thread
    pub const LOWEST_APPLICATION: TaskPriority = TaskPriority(254);

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Task stack size in bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StackSize(u32);

impl StackSize {
    /// Smallest stack the kernel accepts
    pub const MINIMUM: StackSize = StackSize(4 * 1024);

    pub const fn new(bytes: u32) -> Self {
        assert!(bytes >= Self::MINIMUM.0, "stack size below the kernel minimum");
        StackSize(bytes)
    }

    pub const fn bytes(self) -> u32 {
        self.0
    }
}

/// Settings for the single initial task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitTaskConfig {
    /// Scheduling priority for the idle/heartbeat role
    pub priority: TaskPriority,
    /// Stack size of the initial task
    pub stack_size: StackSize,
    /// Ticks slept per idle-loop iteration (0 = plain yield)
    pub idle_interval: Ticks,
}

impl InitTaskConfig {
    pub const DEFAULT: InitTaskConfig = InitTaskConfig {
        priority: TaskPriority::LOWEST_APPLICATION,
        stack_size: StackSize::MINIMUM,
        idle_interval: Ticks(1),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_matches_declaration_order() {
        for (i, class) in ObjectClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
    }

    #[test]
    fn test_posix_and_growable_classes() {
        let posix: usize = ObjectClass::ALL.iter().filter(|c| c.is_posix()).count();
        assert_eq!(posix, 5);
        assert!(ObjectClass::Task.is_growable());
        assert!(!ObjectClass::FileDescriptor.is_growable());
        assert!(!ObjectClass::Driver.is_growable());
    }

    #[test]
    fn test_limit_caps() {
        assert_eq!(Limit::Undeclared.cap(), Some(0));
        assert_eq!(Limit::fixed(8).cap(), Some(8));
        assert_eq!(Limit::unlimited(20).cap(), None);
        assert_eq!(Limit::unlimited(20).initial_capacity(), 20);
        assert!(!Limit::Undeclared.is_declared());
    }

    #[test]
    #[should_panic(expected = "fixed object limit must be at least 1")]
    fn test_zero_fixed_limit_rejected() {
        let _ = Limit::fixed(0);
    }

    #[test]
    fn test_time_base_conversions() {
        let tb = TimeBase::from_micros(1_000);
        assert_eq!(tb.ticks_to_nanos(Ticks(1)), Some(1_000_000));
        assert_eq!(tb.ticks_to_nanos(Ticks(1_000)), Some(1_000_000_000));
        assert_eq!(tb.nanos_to_ticks(2_999_999), 2);
    }

    #[test]
    fn test_long_interval_does_not_overflow() {
        // 10 s ticks: u32::MAX of them is ~1361 years, past u64 nanoseconds
        let tb = TimeBase::from_micros(10_000_000);
        assert_eq!(tb.ticks_to_nanos(Ticks(u32::MAX)), None);
        // Largest that fits at the default 10 ms tick
        assert_eq!(
            TimeBase::DEFAULT.ticks_to_nanos(Ticks(u32::MAX)),
            Some(u32::MAX as u64 * 10_000_000)
        );
    }

    #[test]
    fn test_zero_tick_length_counts_no_ticks() {
        let tb: TimeBase = serde_json::from_str(r#"{"microseconds_per_tick":0}"#).unwrap();
        assert_eq!(tb.nanos_to_ticks(1_000_000), 0);
    }

    #[test]
    fn test_priority_validity() {
        assert!(TaskPriority::LOWEST_APPLICATION.is_valid());
        assert!(!TaskPriority(0).is_valid());
    }
}
