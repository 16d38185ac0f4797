//! Bootstrap sequence
//!
//! Kernel start, initial task creation and dispatch, then the idle loop.
//! Each step is a separate call so tests can stop anywhere; `boot` chains
//! them and never returns.

use alloc::format;

use rtb_config::{ObjectClass, ResourceBudget};
use rtb_hal::HAL;
use rtb_kernel::{BootEventType, InitialTaskState, Kernel, KernelError, TaskArgument};

use crate::error::BootError;
use crate::idle::IdleLoop;
use crate::payload::Payload;
use crate::posix::{self, PosixEntryPoint, POSIX_INIT_THREAD_NAME};
use crate::task::{InitialTask, INIT_TASK_NAME};

/// Kernel plus the initial task it runs
pub struct Bootstrap<H: HAL> {
    kernel: Kernel<H>,
    task: Option<InitialTask>,
    posix_entry: Option<PosixEntryPoint>,
    idle: IdleLoop,
}

impl<H: HAL> Bootstrap<H> {
    pub fn new(budget: &'static ResourceBudget, hal: H) -> Self {
        Self {
            kernel: Kernel::new(budget, hal),
            task: None,
            posix_entry: None,
            idle: IdleLoop::new(budget.idle_interval()),
        }
    }

    /// Run the kernel start-up routine and create the initial task.
    ///
    /// When the budget generates a POSIX entry point its thread is created
    /// here too, against the POSIX thread limit.
    pub fn start(&mut self) -> Result<(), BootError> {
        self.kernel.start()?;

        let budget = self.kernel.budget();
        let id = self.kernel.create_task(INIT_TASK_NAME)?;
        let task = InitialTask::new(id, budget.init_task_config());
        self.log(&format!(
            "initial task {} created at priority {}",
            INIT_TASK_NAME,
            task.priority().0
        ));
        self.task = Some(task);

        if let Some(entry) = posix::entry_point(budget) {
            let thread = self.kernel.create(ObjectClass::PosixThread)?;
            self.kernel.record(BootEventType::TaskCreated {
                id: thread,
                name: POSIX_INIT_THREAD_NAME.into(),
            });
            self.posix_entry = Some(entry);
            self.log("POSIX init thread created");
        }
        Ok(())
    }

    /// Dispatch the initial task: run `payload` once, then switch to idling.
    ///
    /// `argument` is passed through untouched. On payload failure the task
    /// stays in `PayloadRunning` and the error is returned.
    pub fn dispatch(
        &mut self,
        payload: impl Payload<H>,
        argument: TaskArgument,
    ) -> Result<(), BootError> {
        let task = self
            .task
            .as_mut()
            .ok_or(BootError::Kernel(KernelError::NotStarted))?;
        task.dispatch(argument)?;
        self.transitioned(InitialTaskState::NotStarted, InitialTaskState::PayloadRunning);

        if let Some(entry) = self.posix_entry {
            entry(argument);
            self.log("POSIX init thread returned");
        }

        payload.run(&self.kernel)?;

        if let Some(task) = self.task.as_mut() {
            task.finish_payload()?;
        }
        self.transitioned(InitialTaskState::PayloadRunning, InitialTaskState::Idling);
        Ok(())
    }

    /// One idle iteration
    pub fn idle_once(&mut self) -> Result<(), BootError> {
        self.task
            .as_mut()
            .ok_or(BootError::Kernel(KernelError::NotStarted))?
            .stay_idle()?;
        self.idle.tick(&self.kernel)?;
        Ok(())
    }

    /// Idle forever.
    pub fn run(mut self) -> ! {
        let idling = self
            .task
            .as_mut()
            .ok_or(BootError::Kernel(KernelError::NotStarted))
            .and_then(|task| task.stay_idle().map_err(BootError::from));
        if let Err(e) = idling {
            self.fatal(e);
        }
        self.log(&format!("idling every {} ticks", self.idle.interval().0));
        self.idle.run(&mut self.kernel)
    }

    /// Halt through the kernel's fatal path.
    pub fn fatal(&mut self, error: BootError) -> ! {
        self.log(&format!("boot failed: {:?}", error));
        self.kernel.fatal(error.into())
    }

    fn transitioned(&mut self, from: InitialTaskState, to: InitialTaskState) {
        self.kernel
            .record(BootEventType::InitTaskTransition { from, to });
        self.log(&format!("{:?} -> {:?}", from, to));
    }

    /// Debug log with the `[init]` prefix
    pub fn log(&self, msg: &str) {
        self.kernel.hal().debug_write(&format!("[init] {}", msg));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn kernel(&self) -> &Kernel<H> {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut Kernel<H> {
        &mut self.kernel
    }

    pub fn hal(&self) -> &H {
        self.kernel.hal()
    }

    pub fn task(&self) -> Option<&InitialTask> {
        self.task.as_ref()
    }

    /// Current initial task state; `NotStarted` before `start`
    pub fn state(&self) -> InitialTaskState {
        self.task
            .as_ref()
            .map_or(InitialTaskState::NotStarted, |t| t.state())
    }

    pub fn idle_loop(&self) -> &IdleLoop {
        &self.idle
    }

    pub fn has_posix_entry(&self) -> bool {
        self.posix_entry.is_some()
    }
}

/// Boot `budget` on `hal`: start the kernel, run `payload` in the initial
/// task, then idle forever. Any error halts through the kernel.
pub fn boot<H: HAL>(budget: &'static ResourceBudget, hal: H, payload: impl Payload<H>) -> ! {
    let mut bootstrap = Bootstrap::new(budget, hal);
    if let Err(e) = bootstrap.start() {
        bootstrap.fatal(e);
    }
    if let Err(e) = bootstrap.dispatch(payload, TaskArgument::default()) {
        bootstrap.fatal(e);
    }
    bootstrap.run()
}
