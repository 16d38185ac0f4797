//! Initial task state machine
//!
//! NotStarted → PayloadRunning → Idling → Idling → ...
//!
//! Every other transition is rejected with `TaskError::InvalidTransition`.

use rtb_config::{InitTaskConfig, TaskPriority};
use rtb_kernel::{InitialTaskState, ObjectId, TaskArgument};

use crate::error::TaskError;

/// Name the initial task is created under
pub const INIT_TASK_NAME: &str = "UI1";

/// The initial task
#[derive(Clone, Debug)]
pub struct InitialTask {
    id: ObjectId,
    config: InitTaskConfig,
    state: InitialTaskState,
    argument: Option<TaskArgument>,
}

impl InitialTask {
    pub fn new(id: ObjectId, config: InitTaskConfig) -> Self {
        Self {
            id,
            config,
            state: InitialTaskState::NotStarted,
            argument: None,
        }
    }

    /// Check whether `from → to` is a legal step
    pub const fn allows(from: InitialTaskState, to: InitialTaskState) -> bool {
        matches!(
            (from, to),
            (InitialTaskState::NotStarted, InitialTaskState::PayloadRunning)
                | (InitialTaskState::PayloadRunning, InitialTaskState::Idling)
                | (InitialTaskState::Idling, InitialTaskState::Idling)
        )
    }

    /// Move to `to`, returning the previous state.
    pub fn transition(&mut self, to: InitialTaskState) -> Result<InitialTaskState, TaskError> {
        let from = self.state;
        if !Self::allows(from, to) {
            return Err(TaskError::InvalidTransition { from, to });
        }
        self.state = to;
        Ok(from)
    }

    /// Hand the task its argument and start the payload.
    pub fn dispatch(&mut self, argument: TaskArgument) -> Result<(), TaskError> {
        self.transition(InitialTaskState::PayloadRunning)?;
        self.argument = Some(argument);
        Ok(())
    }

    /// Payload returned; enter the idle loop.
    pub fn finish_payload(&mut self) -> Result<(), TaskError> {
        if self.state != InitialTaskState::PayloadRunning {
            return Err(TaskError::InvalidTransition {
                from: self.state,
                to: InitialTaskState::Idling,
            });
        }
        self.transition(InitialTaskState::Idling).map(|_| ())
    }

    /// One more idle iteration. Only legal once idling.
    pub fn stay_idle(&mut self) -> Result<(), TaskError> {
        if self.state != InitialTaskState::Idling {
            return Err(TaskError::InvalidTransition {
                from: self.state,
                to: InitialTaskState::Idling,
            });
        }
        Ok(())
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn state(&self) -> InitialTaskState {
        self.state
    }

    /// Argument received at dispatch, never interpreted
    pub fn argument(&self) -> Option<TaskArgument> {
        self.argument
    }

    pub fn priority(&self) -> TaskPriority {
        self.config.priority
    }

    pub fn config(&self) -> &InitTaskConfig {
        &self.config
    }
}
