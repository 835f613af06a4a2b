//! Sticky MAC-command handling
//!
//! This module handles:
//! - Per-device tracking of sticky answers and outstanding requests
//! - Answer admission for the uplink pipeline
//! - Request admission and deferral for the downlink scheduler

pub mod planner;
pub mod tracker;
pub mod uplink;

pub use planner::{confirm_class_a_delivery, drain_deferred, request_config, ScheduleOutcome};
pub use tracker::{AnswerOrigin, StickySnapshot, StickyTracker};
pub use uplink::{review_fopts, review_uplink, UplinkReview};
