//! Uplink answer admission
//!
//! Entry point for the uplink pipeline once MAC-command parsing has
//! succeeded: record the observation, then run answer admission for every
//! sticky answer the uplink carries. Rejected answers are surfaced so the
//! pipeline can discard them; the uplink itself keeps processing.

use anyhow::Context;
use tracing::{debug, warn};

use lwns_shared::{scan_fopts, AnswerSet, StickyCommand, StickyError, UplinkCid};

use crate::mac::planner;
use crate::mac::tracker::AnswerOrigin;
use crate::session::record::DeviceSession;

/// Outcome of sticky-answer admission for one uplink
#[derive(Debug, Default)]
pub struct UplinkReview {
    /// Answers accepted, with what admitted them
    pub admitted: Vec<(StickyCommand, AnswerOrigin)>,
    /// Answers rejected as `UnexpectedAnswer`; already discarded
    pub rejected: Vec<StickyError>,
    /// Deferred requests that became schedulable with this uplink
    pub unblocked: Vec<StickyCommand>,
}

/// Run sticky-answer admission for a parsed uplink
///
/// Must be called exactly once per processed uplink. `cids` is the full
/// identifier list from the MAC parser; non-sticky commands are ignored
/// here.
pub fn review_uplink(
    session: &mut DeviceSession,
    fcnt: u32,
    cids: &[UplinkCid],
) -> Result<UplinkReview, StickyError> {
    let device = session.dev_eui();
    let answers = AnswerSet::from_cids(cids);

    session.touch();
    session.sticky_mut().record_uplink(fcnt, answers);
    debug!("Uplink fcnt={} from {}: sticky answers {:?}", fcnt, device, answers);

    let mut review = UplinkReview::default();

    for command in answers.iter() {
        match session.sticky().admit_answer(device, command) {
            Ok(origin) => {
                if origin == AnswerOrigin::StickyContinuation {
                    // Possibly a device repeating past the class-A downlink
                    // that should have stopped it. Tolerated, but traced.
                    debug!(
                        "Sticky {} answer from {} admitted as continuation",
                        command, device
                    );
                }
                review.admitted.push((command, origin));
            }
            Err(err) => {
                warn!("Rejected sticky answer from {}: {}", device, err);
                review.rejected.push(err);
            }
        }
    }

    // A clean uplink may unblock requests deferred by the lingering answer.
    review.unblocked = planner::drain_deferred(session)?;

    Ok(review)
}

/// Convenience wrapper scanning raw FOpts octets before admission
pub fn review_fopts(
    session: &mut DeviceSession,
    fcnt: u32,
    fopts: &[u8],
) -> anyhow::Result<UplinkReview> {
    let device = session.dev_eui();
    let cids = scan_fopts(fopts)
        .with_context(|| format!("malformed FOpts in uplink fcnt={} from {}", fcnt, device))?;
    review_uplink(session, fcnt, &cids).map_err(Into::into)
}
