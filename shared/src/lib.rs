//! Shared MAC-command vocabulary for the LPWAN network server
//!
//! This crate provides the protocol-level types shared between the network
//! server and supporting tooling: uplink MAC command identifiers, the
//! sticky-command registry, and the per-device answer-set representation.

pub mod mac;
pub mod sticky;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mac::{scan_fopts, MacParseError, UplinkCid};
pub use sticky::{AnswerSet, StickyCommand, StickyError};

/// Protocol timing and size limits
pub mod limits {
    /// Maximum FOpts field length in octets (LoRaWAN 1.0.x FHDR)
    pub const MAX_FOPTS_LEN: usize = 15;

    /// Default idle timeout before a device session is reaped
    pub const SESSION_IDLE_TIMEOUT_MS: u64 = 12 * 60 * 60 * 1000;
}

/// Globally unique end-device identifier (IEEE EUI-64)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DevEui([u8; 8]);

impl DevEui {
    /// Create a DevEUI from its big-endian byte representation
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Get the big-endian byte representation
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevEui({})", self)
    }
}

impl From<[u8; 8]> for DevEui {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl From<u64> for DevEui {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}
