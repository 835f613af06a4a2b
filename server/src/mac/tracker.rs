//! Per-device sticky-answer state tracking
//!
//! Four configuration answers are sticky: the device repeats them on every
//! uplink until a class-A downlink reaches it. The tracker records what the
//! last two uplinks carried and which requests are outstanding, and derives
//! the two admission decisions from that:
//!
//! - an inbound answer is legitimate iff a request is pending for it or the
//!   previous uplink also carried it (sticky continuation);
//! - a fresh request may only be scheduled once an uplink without the
//!   sticky answer has been seen, otherwise the next answer would be
//!   indistinguishable from the lingering sticky one.
//!
//! All methods are synchronous and I/O free; per-device ordering is the
//! enclosing session lock's responsibility.

use serde::{Deserialize, Serialize};

use lwns_shared::{AnswerSet, DevEui, StickyCommand, StickyError};

/// Why an inbound sticky answer was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOrigin {
    /// A request for this command was outstanding
    PendingRequest,
    /// The previous uplink also carried the answer
    StickyContinuation,
}

/// Sticky-answer state for one device, embedded in its session record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickyTracker {
    /// Sticky answers seen in the uplink before the most recent one
    prev_uplink: AnswerSet,
    /// Sticky answers seen in the most recent uplink
    last_uplink: AnswerSet,
    /// Frame counter of the most recent recorded uplink
    last_fcnt: Option<u32>,
    /// Requests sent but not yet confirmed by a class-A downlink
    pending: AnswerSet,
}

impl StickyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sticky answers observed in a processed uplink
    ///
    /// Must be called once per uplink, after MAC-command parsing and before
    /// the admission queries for that uplink. Re-recording the same frame
    /// counter is a no-op, so a redelivered uplink cannot shift the
    /// observation history.
    pub fn record_uplink(&mut self, fcnt: u32, answers: AnswerSet) {
        if self.last_fcnt == Some(fcnt) {
            return;
        }
        self.prev_uplink = self.last_uplink;
        self.last_uplink = answers;
        self.last_fcnt = Some(fcnt);
    }

    /// Decide whether an answer in the most recent uplink is legitimate
    pub fn admit_answer(
        &self,
        device: DevEui,
        command: StickyCommand,
    ) -> Result<AnswerOrigin, StickyError> {
        if self.pending.contains(command) {
            Ok(AnswerOrigin::PendingRequest)
        } else if self.prev_uplink.contains(command) {
            Ok(AnswerOrigin::StickyContinuation)
        } else {
            Err(StickyError::UnexpectedAnswer { device, command })
        }
    }

    /// Decide whether a fresh request for `command` may be scheduled
    pub fn may_schedule(
        &self,
        device: DevEui,
        command: StickyCommand,
    ) -> Result<(), StickyError> {
        if self.last_uplink.contains(command) {
            Err(StickyError::AmbiguousPending { device, command })
        } else {
            Ok(())
        }
    }

    /// Mark a request as transmitted and awaiting class-A confirmation
    ///
    /// At most one request per command may be outstanding; a duplicate is a
    /// caller ordering bug and fatal for the session.
    pub fn mark_request_scheduled(
        &mut self,
        device: DevEui,
        command: StickyCommand,
    ) -> Result<(), StickyError> {
        if self.pending.contains(command) {
            return Err(StickyError::DuplicatePending { device, command });
        }
        self.pending.insert(command);
        Ok(())
    }

    /// A class-A downlink reached the device: it will stop repeating the
    /// sticky answers, so no request is awaiting confirmation any more
    pub fn mark_class_a_delivered(&mut self) {
        self.pending.clear();
    }

    /// Sticky answers in the most recent recorded uplink
    pub fn last_uplink(&self) -> AnswerSet {
        self.last_uplink
    }

    /// Sticky answers in the uplink before the most recent one
    pub fn previous_uplink(&self) -> AnswerSet {
        self.prev_uplink
    }

    /// Commands with a request awaiting class-A confirmation
    pub fn pending(&self) -> AnswerSet {
        self.pending
    }

    /// Capture the state for persistence
    pub fn snapshot(&self) -> StickySnapshot {
        StickySnapshot {
            prev_uplink: self.prev_uplink,
            last_uplink: self.last_uplink,
            last_fcnt: self.last_fcnt,
            pending: self.pending,
        }
    }

    /// Restore state captured by [`snapshot`](Self::snapshot)
    pub fn restore(snapshot: StickySnapshot) -> Self {
        Self {
            prev_uplink: snapshot.prev_uplink,
            last_uplink: snapshot.last_uplink,
            last_fcnt: snapshot.last_fcnt,
            pending: snapshot.pending,
        }
    }
}

/// Persisted form of [`StickyTracker`]
///
/// Must survive server restarts: losing the last observation or the pending
/// flags would make the admission decisions wrong after recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickySnapshot {
    pub prev_uplink: AnswerSet,
    pub last_uplink: AnswerSet,
    pub last_fcnt: Option<u32>,
    pub pending: AnswerSet,
}
