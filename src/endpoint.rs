//! Endpoint allocation.
//!
//! Deterministic mapping from (participant, role) to network ports. Discovery
//! shares one well-known port across every receiver; collaboration gives each
//! participant a dedicated port at `base + global_index`. The same inputs
//! always produce the same answer: the plan is consulted once to install
//! receivers and again, independently, to address the senders targeting them,
//! and any divergence between the two would break connectivity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::config::ConfigError;
use crate::topology::{Participant, Roster};

/// A network endpoint: a participant's assigned address plus a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: Ipv4Addr,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Port plan for a run.
///
/// Pure and stateless once constructed; construction checks that the
/// collaboration range fits in a u16 for the given roster size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPlan {
    discovery_port: u16,
    collab_base_port: u16,
}

impl PortPlan {
    pub fn new(
        discovery_port: u16,
        collab_base_port: u16,
        roster_len: usize,
    ) -> Result<Self, ConfigError> {
        let highest = collab_base_port as usize + roster_len.saturating_sub(1);
        if highest > u16::MAX as usize {
            return Err(ConfigError::PortRangeExhausted {
                base: collab_base_port,
                count: roster_len,
            });
        }
        Ok(Self {
            discovery_port,
            collab_base_port,
        })
    }

    /// The well-known port shared by every discovery receiver.
    pub fn discovery_port(&self) -> u16 {
        self.discovery_port
    }

    /// The dedicated collaboration port of a participant, or `None` if the
    /// participant is not in the roster.
    pub fn collaboration_port(&self, roster: &Roster, participant: Participant) -> Option<u16> {
        let index = roster.global_index(participant)?;
        // In range by the constructor check.
        Some(self.collab_base_port + index as u16)
    }
}
