//! Optional kernel subsystems
//!
//! Each switch is presence/absence: a subsystem that is not in the set is
//! compiled out of the image, not merely disabled, so nothing reachable from
//! the initial task may depend on it.

use serde::{Deserialize, Serialize};

/// Subsystems the start-up routine may bring up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Subsystem {
    /// Console device driver (and stdio on `/dev/console` when a base
    /// filesystem is present)
    ConsoleDriver = 0,
    /// Clock tick driver; required for any timed suspend
    ClockDriver = 1,
    /// In-memory filesystem mounted as `/`
    ImfsBaseFilesystem = 2,
    /// Block-device buffering with its swap-out task
    Libblock = 3,
    /// POSIX init thread table with its companion entry point
    PosixInitThread = 4,
    /// Full shell command set linked into the image
    ShellCommands = 5,
}

impl Subsystem {
    /// Every subsystem, in start-up order
    pub const ALL: [Subsystem; 6] = [
        Subsystem::ConsoleDriver,
        Subsystem::ClockDriver,
        Subsystem::ImfsBaseFilesystem,
        Subsystem::Libblock,
        Subsystem::PosixInitThread,
        Subsystem::ShellCommands,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Short name for logs
    pub const fn name(self) -> &'static str {
        match self {
            Subsystem::ConsoleDriver => "console",
            Subsystem::ClockDriver => "clock",
            Subsystem::ImfsBaseFilesystem => "imfs",
            Subsystem::Libblock => "libblock",
            Subsystem::PosixInitThread => "posix_init_thread",
            Subsystem::ShellCommands => "shell_commands",
        }
    }
}

/// Set of enabled subsystems
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subsystems(u8);

impl Subsystems {
    /// Nothing enabled
    pub const NONE: Subsystems = Subsystems(0);

    /// Return a copy with `subsystem` enabled
    pub const fn with(self, subsystem: Subsystem) -> Self {
        Subsystems(self.0 | subsystem.bit())
    }

    pub const fn contains(self, subsystem: Subsystem) -> bool {
        self.0 & subsystem.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled subsystems in start-up order
    pub fn iter(self) -> impl Iterator<Item = Subsystem> {
        Subsystem::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}
