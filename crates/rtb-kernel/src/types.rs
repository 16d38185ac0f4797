//! Kernel types
//!
//! Identifiers and state enums shared by the executive model and the
//! initial task. All types here are pure data.

use serde::{Deserialize, Serialize};

pub use rtb_config::ObjectClass;

/// Kernel object identifier
///
/// The generation changes every time a slot is freed, so an id kept after
/// `delete` no longer resolves until the slot's u32 generation wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub class: ObjectClass,
    pub index: u32,
    pub generation: u32,
}

/// Who an object belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// Created by the start-up routine for its own use; drawn from the
    /// reserve on top of the declared limit
    System,
    /// Created by the application; counted against the declared limit
    Application,
}

/// Opaque word-sized argument handed to a task entry point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskArgument(pub usize);

/// Lifecycle of the initial task
///
/// NotStarted → PayloadRunning → Idling → Idling → ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialTaskState {
    /// Created, not yet dispatched
    NotStarted,
    /// Running its one-shot payload
    PayloadRunning,
    /// In the permanent idle loop
    Idling,
}

/// Checkpoints of the kernel start-up routine, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BootPhase {
    /// Descriptor read and its rules checked
    BudgetResolved,
    /// Object tables allocated from the declared limits
    ObjectTablesSized,
    /// Console and clock drivers registered
    DriversInitialized,
    /// Base filesystem mounted and stdio opened
    FilesystemMounted,
    /// Block-device, POSIX and shell support ready
    ServicesReady,
    /// Start-up routine finished; the initial task may be dispatched
    Started,
}

/// Entry in the driver table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverEntry {
    /// Driver name
    pub name: &'static str,
    /// Driver table slot
    pub id: ObjectId,
}
