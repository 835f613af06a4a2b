//! Downlink configuration-request planning
//!
//! The scheduler asks here before emitting one of the four sticky
//! configuration requests. A request blocked by a lingering sticky answer
//! is parked on the session and retried once an uplink without the answer
//! has been seen; issuing it earlier would make the next answer
//! indistinguishable from the lingering one.

use tracing::{debug, info};

use lwns_shared::{StickyCommand, StickyError};

use crate::session::record::DeviceSession;

/// What happened to a configuration-request attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Request admitted; the pending flag is set and the scheduler may emit it
    Scheduled,
    /// Request blocked by a lingering sticky answer; parked for a later
    /// downlink opportunity
    Deferred,
}

/// Try to schedule a sticky configuration request for a device
///
/// `DuplicatePending` propagates: it means the caller asked again while a
/// request was already outstanding, which is fatal for the session.
pub fn request_config(
    session: &mut DeviceSession,
    command: StickyCommand,
) -> Result<ScheduleOutcome, StickyError> {
    let device = session.dev_eui();

    // A second request while one is outstanding is a contract violation
    // whether or not it would be deferred.
    if session.sticky().pending().contains(command) {
        return Err(StickyError::DuplicatePending { device, command });
    }

    match session.sticky().may_schedule(device, command) {
        Ok(()) => {
            session.sticky_mut().mark_request_scheduled(device, command)?;
            debug!("Scheduled {} request for {}", command, device);
            Ok(ScheduleOutcome::Scheduled)
        }
        Err(err @ StickyError::AmbiguousPending { .. }) => {
            info!("Deferred {} request for {}: {}", command, device, err);
            session.defer_request(command);
            Ok(ScheduleOutcome::Deferred)
        }
        Err(err) => Err(err),
    }
}

/// Move every deferred request that became schedulable into pending
///
/// Called after each uplink review; returns the requests the scheduler
/// should now emit.
pub fn drain_deferred(session: &mut DeviceSession) -> Result<Vec<StickyCommand>, StickyError> {
    let device = session.dev_eui();
    let mut ready = Vec::new();

    for command in session.deferred().iter() {
        if session.sticky().may_schedule(device, command).is_err() {
            continue;
        }
        session.sticky_mut().mark_request_scheduled(device, command)?;
        session.clear_deferred(command);
        info!("Deferred {} request for {} is now schedulable", command, device);
        ready.push(command);
    }

    Ok(ready)
}

/// A class-A downlink was confirmed delivered to the device
///
/// The device will stop repeating sticky answers, so every pending request
/// for it is confirmed or moot.
pub fn confirm_class_a_delivery(session: &mut DeviceSession) {
    debug!("Class-A downlink delivered to {}", session.dev_eui());
    session.sticky_mut().mark_class_a_delivered();
}
