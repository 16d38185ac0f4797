//! Initial task errors
//!
//! None of these are recovered from; `boot` hands every one of them to the
//! kernel's fatal path.

use alloc::string::{String, ToString};
use core::fmt;

use rtb_kernel::{FatalError, FatalSource, InitialTaskState, KernelError};

/// Initial task state machine errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskError {
    InvalidTransition {
        from: InitialTaskState,
        to: InitialTaskState,
    },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::InvalidTransition { from, to } => {
                write!(f, "invalid transition {:?} -> {:?}", from, to)
            }
        }
    }
}

/// Payload failures
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadError {
    /// A kernel call made by the payload failed
    Kernel(KernelError),
    /// The payload reported its own failure
    Failed(String),
}

impl From<KernelError> for PayloadError {
    fn from(e: KernelError) -> Self {
        PayloadError::Kernel(e)
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Kernel(e) => write!(f, "{}", e),
            PayloadError::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// Bootstrap errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootError {
    Kernel(KernelError),
    Payload(PayloadError),
    Task(TaskError),
}

impl From<KernelError> for BootError {
    fn from(e: KernelError) -> Self {
        BootError::Kernel(e)
    }
}

impl From<PayloadError> for BootError {
    fn from(e: PayloadError) -> Self {
        BootError::Payload(e)
    }
}

impl From<TaskError> for BootError {
    fn from(e: TaskError) -> Self {
        BootError::Task(e)
    }
}

impl From<BootError> for FatalError {
    fn from(e: BootError) -> Self {
        match e {
            BootError::Kernel(e) => FatalError::from(e),
            BootError::Payload(e) => FatalError::new(FatalSource::Payload, e.to_string()),
            BootError::Task(e) => FatalError::new(FatalSource::InitTask, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtb_kernel::ObjectClass;

    #[test]
    fn test_payload_error_is_fatal_payload() {
        let fatal = FatalError::from(BootError::from(PayloadError::Failed("no disk".into())));
        assert_eq!(fatal.source, FatalSource::Payload);
        assert_eq!(fatal.reason, "no disk");
    }

    #[test]
    fn test_kernel_error_keeps_its_source() {
        let e = BootError::from(KernelError::TooMany {
            class: ObjectClass::Task,
        });
        assert_eq!(FatalError::from(e).source, FatalSource::ResourceExhausted);
    }

    #[test]
    fn test_task_error_display() {
        let e = TaskError::InvalidTransition {
            from: InitialTaskState::Idling,
            to: InitialTaskState::PayloadRunning,
        };
        assert_eq!(e.to_string(), "invalid transition Idling -> PayloadRunning");
        assert_eq!(FatalError::from(BootError::from(e)).source, FatalSource::InitTask);
    }
}
