//! Uplink MAC command identifiers and FOpts scanning
//!
//! The network server only needs to know *which* MAC commands an uplink
//! carries; the command payloads themselves are handled elsewhere. The
//! scanner walks the FOpts octets, yielding identifiers and skipping each
//! command's fixed-length payload:
//!
//! ```text
//! [ CID ][ payload (0..=2 bytes) ][ CID ][ payload ] ...
//! ```

use bytes::Buf;
use thiserror::Error;

use crate::limits::MAX_FOPTS_LEN;
use crate::sticky::StickyCommand;

/// Uplink MAC commands defined by LoRaWAN 1.0.x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UplinkCid {
    LinkCheckReq,
    LinkAdrAns,
    DutyCycleAns,
    RxParamSetupAns,
    DevStatusAns,
    NewChannelAns,
    RxTimingSetupAns,
    TxParamSetupAns,
    DlChannelAns,
    DeviceTimeReq,
}

impl UplinkCid {
    /// Parse a CID octet, if it names a known uplink MAC command
    pub fn from_byte(cid: u8) -> Option<Self> {
        match cid {
            0x02 => Some(Self::LinkCheckReq),
            0x03 => Some(Self::LinkAdrAns),
            0x04 => Some(Self::DutyCycleAns),
            0x05 => Some(Self::RxParamSetupAns),
            0x06 => Some(Self::DevStatusAns),
            0x07 => Some(Self::NewChannelAns),
            0x08 => Some(Self::RxTimingSetupAns),
            0x09 => Some(Self::TxParamSetupAns),
            0x0A => Some(Self::DlChannelAns),
            0x0D => Some(Self::DeviceTimeReq),
            _ => None,
        }
    }

    /// The CID octet of this command
    pub fn to_byte(self) -> u8 {
        match self {
            Self::LinkCheckReq => 0x02,
            Self::LinkAdrAns => 0x03,
            Self::DutyCycleAns => 0x04,
            Self::RxParamSetupAns => 0x05,
            Self::DevStatusAns => 0x06,
            Self::NewChannelAns => 0x07,
            Self::RxTimingSetupAns => 0x08,
            Self::TxParamSetupAns => 0x09,
            Self::DlChannelAns => 0x0A,
            Self::DeviceTimeReq => 0x0D,
        }
    }

    /// Fixed payload length in octets of the uplink form of this command
    pub fn payload_len(self) -> usize {
        match self {
            Self::LinkCheckReq => 0,
            Self::LinkAdrAns => 1,
            Self::DutyCycleAns => 0,
            Self::RxParamSetupAns => 1,
            Self::DevStatusAns => 2,
            Self::NewChannelAns => 1,
            Self::RxTimingSetupAns => 0,
            Self::TxParamSetupAns => 0,
            Self::DlChannelAns => 1,
            Self::DeviceTimeReq => 0,
        }
    }

    /// The sticky command this identifier answers, if it is one of the
    /// four sticky configuration answers
    pub fn sticky(self) -> Option<StickyCommand> {
        match self {
            Self::RxParamSetupAns => Some(StickyCommand::RxParamSetup),
            Self::RxTimingSetupAns => Some(StickyCommand::RxTimingSetup),
            Self::TxParamSetupAns => Some(StickyCommand::TxParamSetup),
            Self::DlChannelAns => Some(StickyCommand::DlChannel),
            _ => None,
        }
    }
}

/// Errors that can occur while scanning an FOpts field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacParseError {
    #[error("FOpts too long: {0} bytes (max: {MAX_FOPTS_LEN})")]
    FOptsTooLong(usize),

    #[error("Unknown uplink MAC command CID: {0:#04x}")]
    UnknownCid(u8),

    #[error("Truncated {cid:?} payload: need {needed} bytes, have {available}")]
    TruncatedPayload {
        cid: UplinkCid,
        needed: usize,
        available: usize,
    },
}

/// Scan an uplink FOpts field into the MAC command identifiers it carries
///
/// Payload bytes are skipped, not interpreted. Scanning stops at the first
/// unknown CID since the length of its payload cannot be known.
pub fn scan_fopts(fopts: &[u8]) -> Result<Vec<UplinkCid>, MacParseError> {
    if fopts.len() > MAX_FOPTS_LEN {
        return Err(MacParseError::FOptsTooLong(fopts.len()));
    }

    let mut buf = fopts;
    let mut cids = Vec::new();

    while buf.has_remaining() {
        let byte = buf.get_u8();
        let cid = UplinkCid::from_byte(byte).ok_or(MacParseError::UnknownCid(byte))?;

        let needed = cid.payload_len();
        if buf.remaining() < needed {
            return Err(MacParseError::TruncatedPayload {
                cid,
                needed,
                available: buf.remaining(),
            });
        }
        buf.advance(needed);

        cids.push(cid);
    }

    Ok(cids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_byte_roundtrip() {
        for byte in 0x02..=0x0D {
            if let Some(cid) = UplinkCid::from_byte(byte) {
                assert_eq!(cid.to_byte(), byte);
            }
        }
    }

    #[test]
    fn test_scan_empty_fopts() {
        assert_eq!(scan_fopts(&[]).expect("scan failed"), vec![]);
    }

    #[test]
    fn test_scan_mixed_commands() {
        // RXParamSetupAns (status byte) + DutyCycleAns + DlChannelAns (status byte)
        let fopts = [0x05, 0x07, 0x04, 0x0A, 0x03];
        let cids = scan_fopts(&fopts).expect("scan failed");
        assert_eq!(
            cids,
            vec![
                UplinkCid::RxParamSetupAns,
                UplinkCid::DutyCycleAns,
                UplinkCid::DlChannelAns,
            ]
        );
    }

    #[test]
    fn test_scan_unknown_cid() {
        let result = scan_fopts(&[0x08, 0x71]);
        assert_eq!(result, Err(MacParseError::UnknownCid(0x71)));
    }

    #[test]
    fn test_scan_truncated_payload() {
        // DevStatusAns needs 2 payload bytes, only 1 present
        let result = scan_fopts(&[0x06, 0x00]);
        assert!(matches!(
            result,
            Err(MacParseError::TruncatedPayload {
                cid: UplinkCid::DevStatusAns,
                needed: 2,
                available: 1,
            })
        ));
    }

    #[test]
    fn test_scan_fopts_too_long() {
        let fopts = [0x02u8; 16];
        assert_eq!(scan_fopts(&fopts), Err(MacParseError::FOptsTooLong(16)));
    }

    #[test]
    fn test_sticky_classification() {
        assert_eq!(
            UplinkCid::RxParamSetupAns.sticky(),
            Some(StickyCommand::RxParamSetup)
        );
        assert_eq!(
            UplinkCid::RxTimingSetupAns.sticky(),
            Some(StickyCommand::RxTimingSetup)
        );
        assert_eq!(
            UplinkCid::TxParamSetupAns.sticky(),
            Some(StickyCommand::TxParamSetup)
        );
        assert_eq!(UplinkCid::DlChannelAns.sticky(), Some(StickyCommand::DlChannel));
        assert_eq!(UplinkCid::LinkAdrAns.sticky(), None);
        assert_eq!(UplinkCid::DevStatusAns.sticky(), None);
    }
}
