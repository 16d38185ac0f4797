//! Kernel start-up routine and executive state
//!
//! `Kernel::start` reads the budget exactly once and walks the boot phases
//! in order:
//!
//! 1. `BudgetResolved` - cross-field rules checked
//! 2. `ObjectTablesSized` - one table per class, plus system reserves
//! 3. `DriversInitialized` - console and clock driver slots
//! 4. `FilesystemMounted` - IMFS root and the console's stdio descriptors
//! 5. `ServicesReady` - libblock swap-out task, POSIX and shell support
//! 6. `Started`
//!
//! Subsystems that are switched off are skipped; the phase is still
//! recorded so the sequence is the same for every budget.

use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;

use rtb_config::{ObjectClass, ResourceBudget, Subsystem, Ticks, TimeBase};
use rtb_hal::HAL;

use crate::bootlog::{BootEventType, BootLog, EventId};
use crate::error::{FatalError, KernelError};
use crate::objects::{ObjectTable, ObjectTables};
use crate::types::{BootPhase, DriverEntry, ObjectId, Owner};

/// Name given to the libblock swap-out task
pub const SWAPOUT_TASK_NAME: &str = "SWAP";

/// Stdio descriptors opened on the console: stdin, stdout, stderr
pub const STDIO_DESCRIPTORS: u32 = 3;

/// Root mount entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountEntry {
    pub mount_point: &'static str,
    pub filesystem: &'static str,
    /// IMFS memfile block size
    pub bytes_per_block: u32,
}

/// Slots the start-up routine takes for itself, on top of the declared
/// limit of `class`.
pub fn system_reserve(budget: &ResourceBudget, class: ObjectClass) -> u32 {
    let console = budget.has(Subsystem::ConsoleDriver);
    match class {
        ObjectClass::Driver => {
            console as u32 + budget.has(Subsystem::ClockDriver) as u32
        }
        ObjectClass::FileDescriptor
            if console && budget.has(Subsystem::ImfsBaseFilesystem) =>
        {
            STDIO_DESCRIPTORS
        }
        ObjectClass::Task => budget.has(Subsystem::Libblock) as u32,
        _ => 0,
    }
}

/// The executive
pub struct Kernel<H: HAL> {
    hal: H,
    budget: &'static ResourceBudget,
    objects: Option<ObjectTables>,
    drivers: Vec<DriverEntry>,
    root: Option<MountEntry>,
    stdio: Vec<ObjectId>,
    boot_log: BootLog,
    /// Timestamp of `Kernel::new` (nanos)
    boot_time: u64,
    phase: Option<BootPhase>,
}

impl<H: HAL> Kernel<H> {
    /// Bind a budget to a HAL. Nothing is allocated until `start`.
    pub fn new(budget: &'static ResourceBudget, hal: H) -> Self {
        let boot_time = hal.now_nanos();
        Self {
            hal,
            budget,
            objects: None,
            drivers: Vec::new(),
            root: None,
            stdio: Vec::new(),
            boot_log: BootLog::new(),
            boot_time,
            phase: None,
        }
    }

    /// Run the start-up routine.
    pub fn start(&mut self) -> Result<(), KernelError> {
        if self.phase.is_some() {
            return Err(KernelError::AlreadyStarted);
        }

        let violations = self.budget.validate();
        if !violations.is_empty() {
            for v in &violations {
                self.log(&format!("budget rule {} broken: {}", v.rule, v.description));
            }
            return Err(KernelError::InvalidConfiguration(violations));
        }
        self.enter(BootPhase::BudgetResolved);

        let budget = self.budget;
        self.objects = Some(ObjectTables::new(
            |class| budget.limit_of(class),
            |class| system_reserve(budget, class),
        )?);
        for class in ObjectClass::ALL {
            let limit = budget.limit_of(class);
            if limit.is_declared() {
                self.log(&format!("{} table: {:?}", class.name(), limit));
            }
        }
        self.enter(BootPhase::ObjectTablesSized);

        if budget.has(Subsystem::ConsoleDriver) {
            self.register_driver("console")?;
            self.ready(Subsystem::ConsoleDriver);
        }
        if budget.has(Subsystem::ClockDriver) {
            self.register_driver("clock")?;
            self.ready(Subsystem::ClockDriver);
        }
        self.enter(BootPhase::DriversInitialized);

        if budget.has(Subsystem::ImfsBaseFilesystem) {
            self.root = Some(MountEntry {
                mount_point: "/",
                filesystem: "imfs",
                bytes_per_block: budget.imfs_block_size(),
            });
            self.ready(Subsystem::ImfsBaseFilesystem);
            if budget.has(Subsystem::ConsoleDriver) {
                for _ in 0..STDIO_DESCRIPTORS {
                    let fd = self.create_owned(ObjectClass::FileDescriptor, Owner::System)?;
                    self.stdio.push(fd);
                }
            }
        }
        self.enter(BootPhase::FilesystemMounted);

        if budget.has(Subsystem::Libblock) {
            let id = self.create_owned(ObjectClass::Task, Owner::System)?;
            self.record(BootEventType::TaskCreated {
                id,
                name: SWAPOUT_TASK_NAME.to_string(),
            });
            self.log(&format!(
                "swap-out task at priority {}",
                budget.swapout_priority().0
            ));
            self.ready(Subsystem::Libblock);
        }
        for subsystem in [Subsystem::PosixInitThread, Subsystem::ShellCommands] {
            if budget.has(subsystem) {
                self.ready(subsystem);
            }
        }
        self.enter(BootPhase::ServicesReady);

        self.enter(BootPhase::Started);
        Ok(())
    }

    fn enter(&mut self, phase: BootPhase) {
        self.phase = Some(phase);
        self.record(BootEventType::Phase(phase));
        self.log(&format!("phase {:?}", phase));
    }

    fn ready(&mut self, subsystem: Subsystem) {
        self.record(BootEventType::SubsystemReady(subsystem));
        self.log(&format!("{} ready", subsystem.name()));
    }

    fn register_driver(&mut self, name: &'static str) -> Result<(), KernelError> {
        let id = self.create_owned(ObjectClass::Driver, Owner::System)?;
        self.drivers.push(DriverEntry { name, id });
        Ok(())
    }

    // ========================================================================
    // Objects
    // ========================================================================

    fn tables_mut(&mut self) -> Result<&mut ObjectTables, KernelError> {
        self.objects.as_mut().ok_or(KernelError::NotStarted)
    }

    fn create_owned(&mut self, class: ObjectClass, owner: Owner) -> Result<ObjectId, KernelError> {
        self.tables_mut()?.get_mut(class).create(owner)
    }

    /// Create an application object of `class`.
    ///
    /// Fails with `TooMany` once the declared limit is reached, or at once
    /// for an undeclared class.
    pub fn create(&mut self, class: ObjectClass) -> Result<ObjectId, KernelError> {
        self.create_owned(class, Owner::Application)
    }

    /// Create an application task and record it in the boot log.
    pub fn create_task(&mut self, name: &str) -> Result<ObjectId, KernelError> {
        let id = self.create(ObjectClass::Task)?;
        self.record(BootEventType::TaskCreated {
            id,
            name: name.to_string(),
        });
        self.log(&format!("created task {} (slot {})", name, id.index));
        Ok(id)
    }

    /// Delete an object, freeing its slot.
    pub fn delete(&mut self, id: ObjectId) -> Result<(), KernelError> {
        self.tables_mut()?.get_mut(id.class).delete(id)
    }

    /// Check whether `id` names a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.table(id.class).is_some_and(|t| t.contains(id))
    }

    /// Table for `class`, once the tables are sized
    pub fn table(&self, class: ObjectClass) -> Option<&ObjectTable> {
        self.objects.as_ref().map(|t| t.get(class))
    }

    /// Live application objects of `class`
    pub fn live_count(&self, class: ObjectClass) -> u32 {
        self.table(class).map_or(0, |t| t.live())
    }

    /// Allocated slots of `class`, system reserve included
    pub fn capacity(&self, class: ObjectClass) -> u32 {
        self.table(class).map_or(0, |t| t.capacity())
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Suspend the calling task for `ticks`. Zero ticks yields instead and
    /// works without a clock driver. Fails without sleeping when the interval
    /// does not fit in u64 nanoseconds.
    pub fn wake_after(&self, ticks: Ticks) -> Result<(), KernelError> {
        if ticks.0 == 0 {
            self.hal.yield_now();
            return Ok(());
        }
        if !self.budget.has(Subsystem::ClockDriver) {
            return Err(KernelError::NotConfigured(Subsystem::ClockDriver));
        }
        let nanos = self
            .time_base()
            .ticks_to_nanos(ticks)
            .ok_or(KernelError::IntervalTooLong(ticks))?;
        self.hal.sleep_nanos(nanos);
        Ok(())
    }

    /// Whole ticks elapsed since `Kernel::new`
    pub fn ticks_since_boot(&self) -> u64 {
        self.time_base().nanos_to_ticks(self.uptime_nanos())
    }

    pub fn uptime_nanos(&self) -> u64 {
        self.hal.now_nanos().saturating_sub(self.boot_time)
    }

    pub fn time_base(&self) -> TimeBase {
        self.budget.time_base()
    }

    // ========================================================================
    // Console, logging, fatal path
    // ========================================================================

    /// Write to the console device.
    pub fn console_write(&self, text: &str) -> Result<(), KernelError> {
        if !self.budget.has(Subsystem::ConsoleDriver) {
            return Err(KernelError::NotConfigured(Subsystem::ConsoleDriver));
        }
        self.hal.console_write(text)?;
        Ok(())
    }

    /// Debug log with the `[kernel]` prefix
    pub fn log(&self, msg: &str) {
        self.hal.debug_write(&format!("[kernel] {}", msg));
    }

    /// Append to the boot log, stamped with the uptime.
    pub fn record(&mut self, event_type: BootEventType) -> EventId {
        let timestamp = self.uptime_nanos();
        self.boot_log.record(event_type, timestamp)
    }

    /// Log, record and halt. Never returns.
    pub fn fatal(&mut self, error: FatalError) -> ! {
        self.log(&format!("FATAL {}", error));
        self.record(BootEventType::Fatal {
            source: error.source.name().to_string(),
            reason: error.reason.clone(),
        });
        self.hal.halt(&error.to_string())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn budget(&self) -> &'static ResourceBudget {
        self.budget
    }

    /// Last phase reached
    pub fn phase(&self) -> Option<BootPhase> {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase == Some(BootPhase::Started)
    }

    pub fn drivers(&self) -> &[DriverEntry] {
        &self.drivers
    }

    pub fn root_filesystem(&self) -> Option<&MountEntry> {
        self.root.as_ref()
    }

    /// Console stdio descriptors (empty without console and IMFS)
    pub fn stdio(&self) -> &[ObjectId] {
        &self.stdio
    }

    pub fn boot_log(&self) -> &BootLog {
        &self.boot_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtb_config::Limit;
    use rtb_hal::TestHal;

    static MINIMAL: ResourceBudget = ResourceBudget::new()
        .enable(Subsystem::ClockDriver)
        .limit(ObjectClass::Task, Limit::fixed(2));

    static NO_CLOCK: ResourceBudget = ResourceBudget::new()
        .limit(ObjectClass::Task, Limit::fixed(1))
        .init_task(rtb_config::InitTaskConfig {
            idle_interval: Ticks(0),
            ..rtb_config::InitTaskConfig::DEFAULT
        });

    static TEN_SECOND_TICKS: ResourceBudget = ResourceBudget::new()
        .enable(Subsystem::ClockDriver)
        .microseconds_per_tick(10_000_000)
        .limit(ObjectClass::Task, Limit::fixed(1));

    #[test]
    fn test_create_before_start_fails() {
        let mut kernel = Kernel::new(&MINIMAL, TestHal::new());
        assert_eq!(kernel.create(ObjectClass::Task), Err(KernelError::NotStarted));
        assert!(!kernel.is_initialized());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut kernel = Kernel::new(&MINIMAL, TestHal::new());
        kernel.start().unwrap();
        assert_eq!(kernel.start(), Err(KernelError::AlreadyStarted));
    }

    #[test]
    fn test_minimal_start() {
        let mut kernel = Kernel::new(&MINIMAL, TestHal::new());
        kernel.start().unwrap();
        assert!(kernel.is_initialized());
        assert_eq!(kernel.drivers().len(), 1);
        assert_eq!(kernel.drivers()[0].name, "clock");
        assert!(kernel.root_filesystem().is_none());
        assert!(kernel.stdio().is_empty());
    }

    #[test]
    fn test_wake_after_advances_by_ticks() {
        let mut kernel = Kernel::new(&MINIMAL, TestHal::new());
        kernel.start().unwrap();
        kernel.wake_after(Ticks(3)).unwrap();
        // Default time base is 10ms per tick
        assert_eq!(kernel.uptime_nanos(), 30_000_000);
        assert_eq!(kernel.ticks_since_boot(), 3);
    }

    #[test]
    fn test_wake_after_overflowing_interval() {
        let mut kernel = Kernel::new(&TEN_SECOND_TICKS, TestHal::new());
        kernel.start().unwrap();
        assert_eq!(
            kernel.wake_after(Ticks(u32::MAX)),
            Err(KernelError::IntervalTooLong(Ticks(u32::MAX)))
        );
        assert_eq!(kernel.uptime_nanos(), 0);

        kernel.wake_after(Ticks(2)).unwrap();
        assert_eq!(kernel.ticks_since_boot(), 2);
    }

    #[test]
    fn test_wake_after_without_clock() {
        let mut kernel = Kernel::new(&NO_CLOCK, TestHal::new());
        kernel.start().unwrap();
        assert_eq!(
            kernel.wake_after(Ticks(1)),
            Err(KernelError::NotConfigured(Subsystem::ClockDriver))
        );
        assert_eq!(kernel.wake_after(Ticks(0)), Ok(()));
    }

    #[test]
    fn test_console_write_without_driver() {
        let mut kernel = Kernel::new(&MINIMAL, TestHal::new());
        kernel.start().unwrap();
        assert_eq!(
            kernel.console_write("hi"),
            Err(KernelError::NotConfigured(Subsystem::ConsoleDriver))
        );
    }

    #[test]
    fn test_system_reserve() {
        let full = ResourceBudget::new()
            .enable(Subsystem::ConsoleDriver)
            .enable(Subsystem::ClockDriver)
            .enable(Subsystem::ImfsBaseFilesystem)
            .enable(Subsystem::Libblock);
        assert_eq!(system_reserve(&full, ObjectClass::Driver), 2);
        assert_eq!(system_reserve(&full, ObjectClass::FileDescriptor), 3);
        assert_eq!(system_reserve(&full, ObjectClass::Task), 1);
        assert_eq!(system_reserve(&full, ObjectClass::Semaphore), 0);

        let no_fs = ResourceBudget::new().enable(Subsystem::ConsoleDriver);
        assert_eq!(system_reserve(&no_fs, ObjectClass::FileDescriptor), 0);
    }

    #[test]
    #[should_panic(expected = "halted")]
    fn test_fatal_halts() {
        let mut kernel = Kernel::new(&MINIMAL, TestHal::new());
        kernel.fatal(FatalError::new(crate::FatalSource::Payload, "boom"));
    }
}
