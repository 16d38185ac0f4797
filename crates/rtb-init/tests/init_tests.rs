//! Initial task integration tests
//!
//! Boot the shipped presets and small custom budgets on `MockHal` and drive
//! the initial task one step at a time.

use rtb_config::presets::{GENERIC_POSIX, STM32F4};
use rtb_config::{InitTaskConfig, Limit, ObjectClass, ResourceBudget, Subsystem, Ticks};
use rtb_hal::{HalError, HAL};
use rtb_hal_mock::MockHal;
use rtb_init::{
    boot, greeting, noop, BootError, Bootstrap, IdleLoop, PayloadError, TaskError,
    INIT_TASK_NAME,
};
use rtb_kernel::{
    BootEventType, InitialTaskState, Kernel, KernelError, ObjectClass as Class, TaskArgument,
};

// ============================================================================
// Helpers
// ============================================================================

fn leak(budget: ResourceBudget) -> &'static ResourceBudget {
    Box::leak(Box::new(budget))
}

fn idling(budget: &'static ResourceBudget) -> Bootstrap<MockHal> {
    let mut b = Bootstrap::new(budget, MockHal::new());
    b.start().expect("start");
    b.dispatch(noop(), TaskArgument(0)).expect("dispatch");
    b
}

fn failing(reason: &'static str) -> impl FnOnce(&Kernel<MockHal>) -> Result<(), PayloadError> {
    move |_kernel: &Kernel<MockHal>| -> Result<(), PayloadError> {
        Err(PayloadError::Failed(reason.to_string()))
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_reaches_idling() {
    let mut b = Bootstrap::new(&GENERIC_POSIX, MockHal::new());
    assert_eq!(b.state(), InitialTaskState::NotStarted);

    b.start().unwrap();
    assert_eq!(b.state(), InitialTaskState::NotStarted);

    b.dispatch(noop(), TaskArgument(0)).unwrap();
    assert_eq!(b.state(), InitialTaskState::Idling);
    // No simulated time passed between start and idling
    assert_eq!(b.hal().now_nanos(), 0);
}

#[test]
fn test_transitions_are_recorded() {
    let b = idling(&GENERIC_POSIX);
    let transitions: Vec<_> = b
        .kernel()
        .boot_log()
        .events()
        .iter()
        .filter_map(|e| match e.event_type {
            BootEventType::InitTaskTransition { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        [
            (InitialTaskState::NotStarted, InitialTaskState::PayloadRunning),
            (InitialTaskState::PayloadRunning, InitialTaskState::Idling),
        ]
    );
}

#[test]
fn test_still_idling_after_1000_iterations() {
    let mut b = idling(&GENERIC_POSIX);
    for _ in 0..1000 {
        b.idle_once().unwrap();
    }
    assert_eq!(b.state(), InitialTaskState::Idling);
    assert_eq!(b.idle_loop().iterations(), 1000);
}

#[test]
fn test_idle_interval_is_constant() {
    let mut b = idling(&STM32F4);
    b.hal().set_jitter(37_000);
    for _ in 0..50 {
        b.idle_once().unwrap();
    }

    let sleeps = b.hal().sleep_durations();
    assert_eq!(sleeps.len(), 50);
    // 1000 ticks of 1000 us
    assert!(sleeps.iter().all(|&ns| ns == 1_000_000_000));
}

#[test]
fn test_ten_thousand_wakes_in_ten_seconds() {
    let budget = leak(
        ResourceBudget::new()
            .enable(Subsystem::ClockDriver)
            .limit(ObjectClass::Task, Limit::fixed(1))
            .microseconds_per_tick(1_000)
            .init_task(InitTaskConfig {
                idle_interval: Ticks(1),
                ..InitTaskConfig::DEFAULT
            }),
    );
    let mut b = idling(budget);

    while b.hal().now_nanos() < 10_000_000_000 {
        b.idle_once().unwrap();
    }
    assert_eq!(b.hal().wakeup_count(), 10_000);
    assert_eq!(b.kernel().ticks_since_boot(), 10_000);
}

#[test]
fn test_zero_interval_yields_without_clock() {
    let budget = leak(
        ResourceBudget::new()
            .limit(ObjectClass::Task, Limit::fixed(1))
            .init_task(InitTaskConfig {
                idle_interval: Ticks(0),
                ..InitTaskConfig::DEFAULT
            }),
    );
    let mut b = idling(budget);
    for _ in 0..5 {
        b.idle_once().unwrap();
    }
    assert_eq!(b.hal().yield_count(), 5);
    assert_eq!(b.hal().wakeup_count(), 0);
}

#[test]
fn test_argument_is_passed_through() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    b.start().unwrap();
    b.dispatch(noop(), TaskArgument(0xdead)).unwrap();
    assert_eq!(b.task().unwrap().argument(), Some(TaskArgument(0xdead)));
}

// ============================================================================
// Rejected sequences
// ============================================================================

#[test]
fn test_dispatch_before_start() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    assert_eq!(
        b.dispatch(noop(), TaskArgument(0)),
        Err(BootError::Kernel(KernelError::NotStarted))
    );
}

#[test]
fn test_idle_before_dispatch() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    b.start().unwrap();
    assert_eq!(
        b.idle_once(),
        Err(BootError::Task(TaskError::InvalidTransition {
            from: InitialTaskState::NotStarted,
            to: InitialTaskState::Idling,
        }))
    );
    assert_eq!(b.hal().wakeup_count(), 0);
}

#[test]
fn test_dispatch_twice() {
    let mut b = idling(&STM32F4);
    assert_eq!(
        b.dispatch(noop(), TaskArgument(0)),
        Err(BootError::Task(TaskError::InvalidTransition {
            from: InitialTaskState::Idling,
            to: InitialTaskState::PayloadRunning,
        }))
    );
    assert_eq!(b.state(), InitialTaskState::Idling);
}

// ============================================================================
// Payloads
// ============================================================================

#[test]
fn test_greeting_payload() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    b.start().unwrap();
    b.dispatch(greeting("Hello World\n"), TaskArgument(0)).unwrap();
    assert_eq!(b.hal().console_output(), ["Hello World\n"]);
    assert!(b.hal().has_log_containing("[init] greeting written (12 bytes)"));
}

#[test]
fn test_closure_payload_sees_kernel() {
    let mut b = Bootstrap::new(&GENERIC_POSIX, MockHal::new());
    b.start().unwrap();
    b.dispatch(
        |kernel: &Kernel<MockHal>| -> Result<(), PayloadError> {
            assert!(kernel.is_initialized());
            kernel.console_write("from closure\n")?;
            Ok(())
        },
        TaskArgument(0),
    )
    .unwrap();
    assert_eq!(b.hal().console_output(), ["from closure\n"]);
}

#[test]
fn test_payload_failure_stops_before_idling() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    b.start().unwrap();
    let result = b.dispatch(failing("sensor missing"), TaskArgument(0));
    assert_eq!(
        result,
        Err(BootError::Payload(PayloadError::Failed("sensor missing".into())))
    );
    assert_eq!(b.state(), InitialTaskState::PayloadRunning);
}

#[test]
fn test_greeting_fails_on_console_fault() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    b.start().unwrap();
    b.hal().fail_console(HalError::IoError);
    assert_eq!(
        b.dispatch(greeting("x"), TaskArgument(0)),
        Err(BootError::Payload(PayloadError::Kernel(KernelError::Hal(
            HalError::IoError
        ))))
    );
}

#[test]
fn test_greeting_without_console_driver() {
    let budget = leak(
        ResourceBudget::new()
            .enable(Subsystem::ClockDriver)
            .limit(ObjectClass::Task, Limit::fixed(1)),
    );
    let mut b = Bootstrap::new(budget, MockHal::new());
    b.start().unwrap();
    assert_eq!(
        b.dispatch(greeting("x"), TaskArgument(0)),
        Err(BootError::Payload(PayloadError::Kernel(
            KernelError::NotConfigured(Subsystem::ConsoleDriver)
        )))
    );
}

#[test]
#[should_panic(expected = "halted: payload: disk not found")]
fn test_payload_failure_halts() {
    boot(&STM32F4, MockHal::new(), failing("disk not found"));
}

#[test]
#[should_panic(expected = "halted: configuration")]
fn test_invalid_budget_halts() {
    let budget = leak(
        ResourceBudget::new()
            .enable(Subsystem::ClockDriver)
            .enable(Subsystem::ShellCommands)
            .limit(ObjectClass::Task, Limit::fixed(1)),
    );
    boot(budget, MockHal::new(), noop());
}

#[test]
#[should_panic(expected = "halted: init-task")]
fn test_run_without_dispatch_halts() {
    let mut b = Bootstrap::new(&STM32F4, MockHal::new());
    b.start().unwrap();
    b.run();
}

#[test]
#[should_panic(expected = "halted: init-task: kernel not started")]
fn test_run_before_start_halts() {
    Bootstrap::new(&STM32F4, MockHal::new()).run();
}

#[test]
#[should_panic(expected = "halted: configuration: interval of 4294967295 ticks")]
fn test_run_with_overflowing_interval_halts() {
    let budget = leak(
        ResourceBudget::new()
            .enable(Subsystem::ClockDriver)
            .microseconds_per_tick(10_000_000)
            .limit(ObjectClass::Task, Limit::fixed(1))
            .init_task(InitTaskConfig {
                idle_interval: Ticks(u32::MAX),
                ..InitTaskConfig::DEFAULT
            }),
    );
    idling(budget).run();
}

#[test]
#[should_panic(expected = "halted: configuration: clock not configured")]
fn test_idle_loop_without_clock_halts() {
    let budget = leak(
        ResourceBudget::new()
            .limit(ObjectClass::Task, Limit::fixed(1))
            .init_task(InitTaskConfig {
                idle_interval: Ticks(0),
                ..InitTaskConfig::DEFAULT
            }),
    );
    let mut kernel = Kernel::new(budget, MockHal::new());
    kernel.start().unwrap();
    IdleLoop::new(Ticks(5)).run(&mut kernel);
}

// ============================================================================
// Accounting and POSIX entry point
// ============================================================================

#[test]
fn test_initial_task_counts_against_task_limit() {
    let budget = leak(
        ResourceBudget::new()
            .enable(Subsystem::ClockDriver)
            .limit(ObjectClass::Task, Limit::fixed(20)),
    );
    let mut b = idling(budget);
    assert_eq!(b.kernel().live_count(Class::Task), 1);

    for _ in 0..19 {
        b.kernel_mut().create(Class::Task).unwrap();
    }
    assert_eq!(
        b.kernel_mut().create(Class::Task),
        Err(KernelError::TooMany { class: Class::Task })
    );
}

#[test]
fn test_posix_entry_only_with_flag() {
    let posix = idling(&GENERIC_POSIX);
    assert!(posix.has_posix_entry());
    assert_eq!(posix.kernel().live_count(Class::PosixThread), 1);
    assert!(posix.hal().has_log_containing("[init] POSIX init thread returned"));

    let native = idling(&STM32F4);
    assert!(!native.has_posix_entry());
    assert_eq!(native.kernel().live_count(Class::PosixThread), 0);
    assert!(!native.hal().has_log_containing("POSIX"));
}

#[test]
fn test_init_logs_with_prefix() {
    let b = idling(&STM32F4);
    let expected = format!("[init] initial task {} created at priority 254", INIT_TASK_NAME);
    assert!(b.hal().has_log_containing(&expected));
    assert!(b.hal().has_log_containing("[init] PayloadRunning -> Idling"));
}
