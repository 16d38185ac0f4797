//! Kernel errors
//!
//! `KernelError` is what kernel calls return. `FatalError` is what the
//! kernel halts with; nothing above the kernel recovers from one.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use rtb_config::{ConfigViolation, ObjectClass, Subsystem, Ticks};
use rtb_hal::HalError;

/// Kernel errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// Class at its declared limit, or never declared
    TooMany { class: ObjectClass },
    /// Id does not name a live object
    InvalidId,
    /// Called before `Kernel::start` finished
    NotStarted,
    /// `Kernel::start` called a second time
    AlreadyStarted,
    /// Growing an unlimited table failed
    WorkspaceExhausted { class: ObjectClass },
    /// Operation needs a subsystem that is compiled out
    NotConfigured(Subsystem),
    /// Tick count too long to express in nanoseconds at this time base
    IntervalTooLong(Ticks),
    /// Budget broke one or more cross-field rules
    InvalidConfiguration(Vec<ConfigViolation>),
    /// HAL error
    Hal(HalError),
}

impl From<HalError> for KernelError {
    fn from(e: HalError) -> Self {
        KernelError::Hal(e)
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::TooMany { class } => {
                write!(f, "too many {} objects", class.name())
            }
            KernelError::InvalidId => write!(f, "invalid object id"),
            KernelError::NotStarted => write!(f, "kernel not started"),
            KernelError::AlreadyStarted => write!(f, "kernel already started"),
            KernelError::WorkspaceExhausted { class } => {
                write!(f, "workspace exhausted growing {} table", class.name())
            }
            KernelError::NotConfigured(subsystem) => {
                write!(f, "{} not configured", subsystem.name())
            }
            KernelError::IntervalTooLong(ticks) => {
                write!(f, "interval of {} ticks overflows the time base", ticks.0)
            }
            KernelError::InvalidConfiguration(violations) => {
                write!(f, "invalid configuration:")?;
                for v in violations {
                    write!(f, " [{}] {};", v.rule, v.description)?;
                }
                Ok(())
            }
            KernelError::Hal(e) => write!(f, "HAL error: {:?}", e),
        }
    }
}

/// Where a fatal error came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatalSource {
    /// Budget rejected at start-up
    Configuration,
    /// An object class ran out of slots
    ResourceExhausted,
    /// The initial task's payload failed
    Payload,
    /// The initial task broke its state machine
    InitTask,
    /// The HAL failed underneath the kernel
    Hal,
}

impl FatalSource {
    pub const fn name(self) -> &'static str {
        match self {
            FatalSource::Configuration => "configuration",
            FatalSource::ResourceExhausted => "resource-exhausted",
            FatalSource::Payload => "payload",
            FatalSource::InitTask => "init-task",
            FatalSource::Hal => "hal",
        }
    }
}

/// Unrecoverable error passed to `Kernel::fatal`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FatalError {
    pub source: FatalSource,
    pub reason: String,
}

impl FatalError {
    pub fn new(source: FatalSource, reason: impl Into<String>) -> Self {
        Self {
            source,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source.name(), self.reason)
    }
}

impl From<KernelError> for FatalError {
    fn from(e: KernelError) -> Self {
        let source = match e {
            KernelError::InvalidConfiguration(_)
            | KernelError::NotConfigured(_)
            | KernelError::IntervalTooLong(_) => FatalSource::Configuration,
            KernelError::TooMany { .. } | KernelError::WorkspaceExhausted { .. } => {
                FatalSource::ResourceExhausted
            }
            KernelError::InvalidId | KernelError::NotStarted | KernelError::AlreadyStarted => {
                FatalSource::InitTask
            }
            KernelError::Hal(_) => FatalSource::Hal,
        };
        FatalError::new(source, e.to_string())
    }
}
