//! Participant roster.
//!
//! The roster is the single source of the fixed-then-mobile ordering that
//! port and offset derivation rely on. Both kinds must be present: the
//! adjacency rule gives every fixed participant mobile neighbors and every
//! mobile participant a fixed neighbor, so a zero count of either kind is a
//! configuration error, not an empty edge set.

use crate::config::ConfigError;
use crate::topology::types::{NodeKind, Participant};

/// The complete, ordered participant set of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    num_fixed: u32,
    num_mobile: u32,
}

impl Roster {
    /// Build a roster from participant counts.
    pub fn new(num_fixed: u32, num_mobile: u32) -> Result<Self, ConfigError> {
        if num_fixed == 0 {
            return Err(ConfigError::MissingKind("fixed"));
        }
        if num_mobile == 0 {
            return Err(ConfigError::MissingKind("mobile"));
        }
        Ok(Self {
            num_fixed,
            num_mobile,
        })
    }

    pub fn num_fixed(&self) -> u32 {
        self.num_fixed
    }

    pub fn num_mobile(&self) -> u32 {
        self.num_mobile
    }

    /// Total participant count.
    pub fn len(&self) -> usize {
        self.num_fixed as usize + self.num_mobile as usize
    }

    pub fn is_empty(&self) -> bool {
        false // both counts are at least 1 by construction
    }

    /// All participants in roster order: fixed ascending, then mobile
    /// ascending. This ordering is load-bearing for port and offset
    /// derivation and must match `global_index`.
    pub fn all_participants(&self) -> Vec<Participant> {
        let mut participants = Vec::with_capacity(self.len());
        for i in 0..self.num_fixed {
            participants.push(Participant::fixed(i));
        }
        for i in 0..self.num_mobile {
            participants.push(Participant::mobile(i));
        }
        participants
    }

    /// 0-based rank of a participant in roster order, or `None` if its index
    /// is out of range for this roster.
    pub fn global_index(&self, participant: Participant) -> Option<usize> {
        match participant.kind {
            NodeKind::Fixed if participant.index < self.num_fixed => {
                Some(participant.index as usize)
            }
            NodeKind::Mobile if participant.index < self.num_mobile => {
                Some(self.num_fixed as usize + participant.index as usize)
            }
            _ => None,
        }
    }

    /// Whether the participant belongs to this roster.
    pub fn contains(&self, participant: Participant) -> bool {
        self.global_index(participant).is_some()
    }
}
