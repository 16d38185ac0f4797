//! Resource budget descriptor
//!
//! The complete static capacity plan the kernel honors. A budget is built
//! with `const fn` calls so it resolves at compile time and lives in a
//! `static`; the kernel start-up routine reads it exactly once.
//!
//! ```
//! use rtb_config::{Limit, ObjectClass, ResourceBudget, Subsystem};
//!
//! static BUDGET: ResourceBudget = ResourceBudget::new()
//!     .enable(Subsystem::ConsoleDriver)
//!     .enable(Subsystem::ClockDriver)
//!     .microseconds_per_tick(1_000)
//!     .limit(ObjectClass::Task, Limit::fixed(4))
//!     .limit(ObjectClass::Semaphore, Limit::unlimited(10))
//!     .unified_work_areas();
//!
//! assert!(BUDGET.validate().is_empty());
//! ```

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::invariants::{self, ConfigViolation};
use crate::subsystems::{Subsystem, Subsystems};
use crate::types::{
    InitTaskConfig, Limit, ObjectClass, ResourceLimit, StackSize, TaskPriority, Ticks, TimeBase,
};

/// Allocation increment applied to undeclared classes when unlimited
/// objects are enabled
pub const UNLIMITED_ALLOCATION_SIZE: u32 = 8;

/// Static resource budget
///
/// Fields are private; every value goes through a const builder method that
/// checks its range, so an out-of-range literal fails the build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBudget {
    /// Per-class limits, indexed by `ObjectClass::index`
    limits: [Limit; ObjectClass::COUNT],
    /// Tick granularity
    time_base: TimeBase,
    /// Enabled optional subsystems
    subsystems: Subsystems,
    /// Initial task settings
    init_task: InitTaskConfig,
    /// Stack bytes reserved for tasks created beyond the initial task
    extra_task_stack: u32,
    /// IMFS memfile block size (power of two, 16..=512)
    imfs_bytes_per_block: u32,
    /// Priority of the libblock swap-out task
    swapout_task_priority: TaskPriority,
    /// Kernel workspace and C heap share one growable area
    unified_work_areas: bool,
    /// Undeclared growable classes become unlimited
    unlimited_objects: bool,
}

impl ResourceBudget {
    /// An empty budget: nothing declared, no subsystems, kernel defaults.
    pub const fn new() -> Self {
        Self {
            limits: [Limit::Undeclared; ObjectClass::COUNT],
            time_base: TimeBase::DEFAULT,
            subsystems: Subsystems::NONE,
            init_task: InitTaskConfig::DEFAULT,
            extra_task_stack: 0,
            imfs_bytes_per_block: 128,
            swapout_task_priority: TaskPriority(15),
            unified_work_areas: false,
            unlimited_objects: false,
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Declare the limit for one class. A later call for the same class
    /// replaces the earlier one.
    pub const fn limit(mut self, class: ObjectClass, limit: Limit) -> Self {
        self.limits[class.index()] = limit;
        self
    }

    pub const fn microseconds_per_tick(mut self, us: u32) -> Self {
        self.time_base = TimeBase::from_micros(us);
        self
    }

    pub const fn enable(mut self, subsystem: Subsystem) -> Self {
        self.subsystems = self.subsystems.with(subsystem);
        self
    }

    pub const fn init_task(mut self, init_task: InitTaskConfig) -> Self {
        assert!(init_task.priority.is_valid(), "priority 0 is reserved");
        self.init_task = init_task;
        self
    }

    /// Stack for tasks beyond the initial one; 0 or at least the minimum.
    pub const fn extra_task_stack(mut self, bytes: u32) -> Self {
        assert!(
            bytes == 0 || bytes >= StackSize::MINIMUM.bytes(),
            "extra task stack below the kernel minimum"
        );
        self.extra_task_stack = bytes;
        self
    }

    /// Range is checked by `validate` since it only matters with IMFS.
    pub const fn imfs_bytes_per_block(mut self, bytes: u32) -> Self {
        self.imfs_bytes_per_block = bytes;
        self
    }

    pub const fn swapout_task_priority(mut self, priority: TaskPriority) -> Self {
        assert!(priority.is_valid(), "priority 0 is reserved");
        self.swapout_task_priority = priority;
        self
    }

    pub const fn unified_work_areas(mut self) -> Self {
        self.unified_work_areas = true;
        self
    }

    pub const fn unlimited_objects(mut self) -> Self {
        self.unlimited_objects = true;
        self
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// The limit exactly as declared
    pub const fn declared_limit(&self, class: ObjectClass) -> Limit {
        self.limits[class.index()]
    }

    /// The limit the kernel enforces: the declared one, or the unlimited
    /// default for an undeclared growable class when unlimited objects are on.
    pub const fn limit_of(&self, class: ObjectClass) -> Limit {
        match self.limits[class.index()] {
            Limit::Undeclared if self.unlimited_objects && class.is_growable() => {
                Limit::Unlimited {
                    increment: UNLIMITED_ALLOCATION_SIZE,
                }
            }
            limit => limit,
        }
    }

    /// Enforced limits for every class, in declaration order
    pub fn limits(&self) -> impl Iterator<Item = ResourceLimit> + '_ {
        ObjectClass::ALL.into_iter().map(move |class| ResourceLimit {
            class,
            limit: self.limit_of(class),
        })
    }

    /// True when any class grows without a cap
    pub fn uses_unlimited(&self) -> bool {
        self.limits().any(|rl| rl.limit.is_unlimited())
    }

    pub const fn time_base(&self) -> TimeBase {
        self.time_base
    }

    pub const fn subsystems(&self) -> Subsystems {
        self.subsystems
    }

    pub const fn has(&self, subsystem: Subsystem) -> bool {
        self.subsystems.contains(subsystem)
    }

    pub const fn init_task_config(&self) -> InitTaskConfig {
        self.init_task
    }

    pub const fn idle_interval(&self) -> Ticks {
        self.init_task.idle_interval
    }

    pub const fn extra_task_stack_bytes(&self) -> u32 {
        self.extra_task_stack
    }

    pub const fn imfs_block_size(&self) -> u32 {
        self.imfs_bytes_per_block
    }

    pub const fn swapout_priority(&self) -> TaskPriority {
        self.swapout_task_priority
    }

    pub const fn has_unified_work_areas(&self) -> bool {
        self.unified_work_areas
    }

    pub const fn has_unlimited_objects(&self) -> bool {
        self.unlimited_objects
    }

    /// Whether the POSIX companion entry point must exist
    pub const fn requires_posix_entry_point(&self) -> bool {
        self.has(Subsystem::PosixInitThread)
    }

    /// Check cross-field rules; empty when the budget is consistent
    pub fn validate(&self) -> Vec<ConfigViolation> {
        invariants::check_all(self)
    }
}

impl Default for ResourceBudget {
    fn default() -> Self {
        Self::new()
    }
}
