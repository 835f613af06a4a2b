//! Per-device session state
//!
//! This module handles:
//! - The session record each end device gets on first observation
//! - Creation, lookup, teardown and idle reaping of sessions
//! - Snapshot/restore of the state that must survive a server restart

pub mod manager;
pub mod record;

pub use manager::{SessionHandle, SessionManager};
pub use record::{DeviceSession, SessionSnapshot};
