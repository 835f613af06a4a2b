//! Per-device session record
//!
//! The sticky-answer tracker is embedded here rather than kept in a
//! parallel map, so session teardown drops it atomically with the rest of
//! the device state.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use lwns_shared::{AnswerSet, DevEui, StickyCommand};

use crate::mac::tracker::{StickySnapshot, StickyTracker};

/// Network-server state for one end device
#[derive(Debug, Clone)]
pub struct DeviceSession {
    dev_eui: DevEui,
    created_at: Instant,
    last_seen: Instant,
    sticky: StickyTracker,
    /// Config requests blocked by a lingering sticky answer, waiting for a
    /// clean uplink
    deferred: AnswerSet,
}

impl DeviceSession {
    /// Create a fresh session for a device
    pub fn new(dev_eui: DevEui) -> Self {
        let now = Instant::now();
        Self {
            dev_eui,
            created_at: now,
            last_seen: now,
            sticky: StickyTracker::new(),
            deferred: AnswerSet::EMPTY,
        }
    }

    pub fn dev_eui(&self) -> DevEui {
        self.dev_eui
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Record device activity, for idle reaping
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Time since the last recorded activity
    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    pub fn sticky(&self) -> &StickyTracker {
        &self.sticky
    }

    pub fn sticky_mut(&mut self) -> &mut StickyTracker {
        &mut self.sticky
    }

    /// Park a request until an uplink without the sticky answer arrives
    pub fn defer_request(&mut self, command: StickyCommand) {
        self.deferred.insert(command);
    }

    pub fn deferred(&self) -> AnswerSet {
        self.deferred
    }

    pub(crate) fn clear_deferred(&mut self, command: StickyCommand) {
        self.deferred.remove(command);
    }

    /// Capture the persistable part of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            dev_eui: self.dev_eui,
            sticky: self.sticky.snapshot(),
            deferred: self.deferred,
        }
    }

    /// Rebuild a session from its persisted form
    ///
    /// Instants restart from now; only the sticky state must survive a
    /// server restart for the admission decisions to stay correct.
    pub fn restore(snapshot: SessionSnapshot) -> Self {
        let now = Instant::now();
        Self {
            dev_eui: snapshot.dev_eui,
            created_at: now,
            last_seen: now,
            sticky: StickyTracker::restore(snapshot.sticky),
            deferred: snapshot.deferred,
        }
    }
}

/// Persisted form of [`DeviceSession`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub dev_eui: DevEui,
    pub sticky: StickySnapshot,
    pub deferred: AnswerSet,
}
