//! Sticky MAC-command registry and answer sets
//!
//! Four downlink-configuration requests have "sticky" answers: a conformant
//! device repeats the answer on every uplink until it receives a class-A
//! downlink. The server must account for that when deciding whether an
//! inbound answer is legitimate and whether a fresh request may be sent.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mac::UplinkCid;
use crate::DevEui;

/// The four MAC commands whose answers are sticky
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StickyCommand {
    RxParamSetup,
    RxTimingSetup,
    TxParamSetup,
    DlChannel,
}

impl StickyCommand {
    /// All sticky commands, for exhaustive iteration
    pub const ALL: [StickyCommand; 4] = [
        StickyCommand::RxParamSetup,
        StickyCommand::RxTimingSetup,
        StickyCommand::TxParamSetup,
        StickyCommand::DlChannel,
    ];

    /// The uplink identifier carrying this command's answer
    pub fn answer_cid(self) -> UplinkCid {
        match self {
            Self::RxParamSetup => UplinkCid::RxParamSetupAns,
            Self::RxTimingSetup => UplinkCid::RxTimingSetupAns,
            Self::TxParamSetup => UplinkCid::TxParamSetupAns,
            Self::DlChannel => UplinkCid::DlChannelAns,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::RxParamSetup => 1 << 0,
            Self::RxTimingSetup => 1 << 1,
            Self::TxParamSetup => 1 << 2,
            Self::DlChannel => 1 << 3,
        }
    }
}

impl fmt::Display for StickyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RxParamSetup => "RxParamSetup",
            Self::RxTimingSetup => "RxTimingSetup",
            Self::TxParamSetup => "TxParamSetup",
            Self::DlChannel => "DlChannel",
        };
        f.write_str(name)
    }
}

/// Set of sticky commands, e.g. the answers observed in one uplink
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(u8);

impl AnswerSet {
    /// The empty set
    pub const EMPTY: AnswerSet = AnswerSet(0);

    pub fn insert(&mut self, command: StickyCommand) {
        self.0 |= command.bit();
    }

    pub fn remove(&mut self, command: StickyCommand) {
        self.0 &= !command.bit();
    }

    pub fn contains(&self, command: StickyCommand) -> bool {
        self.0 & command.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate the commands in the set
    pub fn iter(&self) -> impl Iterator<Item = StickyCommand> + '_ {
        StickyCommand::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// Project the sticky answers out of a scanned identifier list
    pub fn from_cids(cids: &[UplinkCid]) -> AnswerSet {
        cids.iter().filter_map(|cid| cid.sticky()).collect()
    }
}

impl FromIterator<StickyCommand> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = StickyCommand>>(iter: I) -> Self {
        let mut set = AnswerSet::EMPTY;
        for command in iter {
            set.insert(command);
        }
        set
    }
}

impl fmt::Debug for AnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Failures of the sticky-answer admission rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StickyError {
    /// The answer matches no pending request and the previous uplink did
    /// not carry it either. Non-fatal: the answer is discarded.
    #[error("unexpected {command} answer from {device}: no pending request and not a sticky continuation")]
    UnexpectedAnswer {
        device: DevEui,
        command: StickyCommand,
    },

    /// The last uplink still carried the sticky answer, so a fresh request
    /// would be unconfirmable. Non-fatal: the request is deferred.
    #[error("cannot schedule {command} request for {device}: last uplink still carried the sticky answer")]
    AmbiguousPending {
        device: DevEui,
        command: StickyCommand,
    },

    /// A request for this command is already outstanding. Caller ordering
    /// bug; fatal for the session.
    #[error("{command} request already pending for {device}")]
    DuplicatePending {
        device: DevEui,
        command: StickyCommand,
    },
}
