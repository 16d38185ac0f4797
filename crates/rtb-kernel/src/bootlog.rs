//! Boot Event Log
//!
//! Records what the start-up routine did, in order: phases reached,
//! subsystems brought up, tasks created, initial-task transitions and the
//! fatal halt if one happens. Events are append-only with monotonic ids.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use rtb_config::Subsystem;

use crate::types::{BootPhase, InitialTaskState, ObjectId};

/// Boot event identifier
pub type EventId = u64;

/// A boot event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootEvent {
    /// Unique event ID (monotonic)
    pub id: EventId,
    /// Timestamp (nanos since boot)
    pub timestamp: u64,
    /// What happened
    pub event_type: BootEventType,
}

/// Type of boot event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootEventType {
    /// Start-up routine reached a phase
    Phase(BootPhase),
    /// An optional subsystem was brought up
    SubsystemReady(Subsystem),
    /// A task was created
    TaskCreated {
        /// Task slot
        id: ObjectId,
        /// Task name
        name: String,
    },
    /// The initial task changed state
    InitTaskTransition {
        from: InitialTaskState,
        to: InitialTaskState,
    },
    /// The system halted
    Fatal {
        /// Where the error came from
        source: String,
        /// Halt reason
        reason: String,
    },
}

/// Maximum number of events to keep in memory
const MAX_BOOT_EVENTS: usize = 1024;

/// Boot event log
pub struct BootLog {
    /// Event entries (append-only)
    events: Vec<BootEvent>,
    /// Next event ID to assign
    next_id: EventId,
}

impl BootLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 0,
        }
    }

    /// Append an event, returning its id.
    pub fn record(&mut self, event_type: BootEventType, timestamp: u64) -> EventId {
        let id = self.next_id;
        self.next_id += 1;

        self.events.push(BootEvent {
            id,
            timestamp,
            event_type,
        });

        self.trim_if_needed();
        id
    }

    /// Get all retained events.
    pub fn events(&self) -> &[BootEvent] {
        &self.events
    }

    /// Phases reached, in order.
    pub fn phases(&self) -> Vec<BootPhase> {
        self.events
            .iter()
            .filter_map(|e| match e.event_type {
                BootEventType::Phase(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }

    /// Subsystems brought up, in order.
    pub fn subsystems_ready(&self) -> Vec<Subsystem> {
        self.events
            .iter()
            .filter_map(|e| match e.event_type {
                BootEventType::SubsystemReady(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn next_id(&self) -> EventId {
        self.next_id
    }

    fn trim_if_needed(&mut self) {
        if self.events.len() > MAX_BOOT_EVENTS {
            let drain_count = self.events.len() - MAX_BOOT_EVENTS;
            self.events.drain(0..drain_count);
        }
    }
}

impl Default for BootLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootlog_creation() {
        let log = BootLog::new();
        assert!(log.is_empty());
        assert_eq!(log.next_id(), 0);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut log = BootLog::new();
        let a = log.record(BootEventType::Phase(BootPhase::BudgetResolved), 10);
        let b = log.record(
            BootEventType::SubsystemReady(Subsystem::ConsoleDriver),
            20,
        );
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(log.phases(), alloc::vec![BootPhase::BudgetResolved]);
        assert_eq!(log.subsystems_ready(), alloc::vec![Subsystem::ConsoleDriver]);
    }

    #[test]
    fn test_bootlog_trimming() {
        let mut log = BootLog::new();
        for i in 0..(MAX_BOOT_EVENTS + 10) {
            log.record(BootEventType::Phase(BootPhase::Started), i as u64);
        }
        assert_eq!(log.len(), MAX_BOOT_EVENTS);
        assert_eq!(log.events()[0].id, 10);
        assert_eq!(log.next_id(), (MAX_BOOT_EVENTS + 10) as u64);
    }

    #[test]
    fn test_event_serializes() {
        let mut log = BootLog::new();
        log.record(
            BootEventType::InitTaskTransition {
                from: InitialTaskState::NotStarted,
                to: InitialTaskState::PayloadRunning,
            },
            5,
        );
        let json = serde_json::to_string(&log.events()[0]).unwrap();
        let back: BootEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log.events()[0]);
    }
}
