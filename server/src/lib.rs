//! LPWAN network-server core: device sessions and sticky MAC-command rules
//!
//! Four downlink-configuration MAC commands (`RxParamSetup`,
//! `RxTimingSetup`, `TxParamSetup`, `DlChannel`) have sticky answers: the
//! device repeats the answer on every uplink until a class-A downlink
//! reaches it. This crate tracks that state per device and answers the two
//! questions the rest of the server asks:
//!
//! - uplink pipeline: "is this inbound answer legitimate?"
//!   ([`mac::review_uplink`])
//! - downlink scheduler: "may I send a fresh request?"
//!   ([`mac::request_config`])

pub mod mac;
pub mod session;

pub use mac::{ScheduleOutcome, StickyTracker, UplinkReview};
pub use session::{DeviceSession, SessionManager};
