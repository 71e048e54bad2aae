//! External engine seam.
//!
//! The core consumes the simulation engine through two narrow traits: an
//! address book resolving participants to their assigned addresses, and an
//! installer/event-loop interface that takes scheduled events verbatim. The
//! in-memory engine in [`sim`] implements both and is what the driver and
//! the tests run against; a real engine binding would implement the same
//! traits.

pub mod sim;

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::event::ScheduledEvent;
use crate::topology::{Participant, Roster};

pub use sim::{InMemoryEngine, RunStats};

/// Resolves participants to their assigned network addresses.
///
/// Addressing is complete before orchestration starts; a `None` here means
/// the participant is unknown to the engine, which the orchestrators treat
/// as fatal.
pub trait AddressBook {
    fn address_of(&self, participant: Participant) -> Option<Ipv4Addr>;
    /// Subnet broadcast address shared by all participants.
    fn broadcast_address(&self) -> Ipv4Addr;
}

/// Installs scheduled events and drives the event loop.
pub trait Engine {
    /// Install one event verbatim. Called only after the full schedule has
    /// been derived.
    fn install(&mut self, event: &ScheduledEvent) -> color_eyre::Result<()>;

    /// Run the clock forward to `stop`, firing installed events at their
    /// start/stop times, then retire everything.
    fn run(&mut self, stop: Duration) -> color_eyre::Result<RunStats>;
}

/// Deterministic `10.1.1.0/24` addressing in roster order.
///
/// Participant at roster position `i` gets `10.1.1.(i + 1)`; the subnet
/// broadcast is `10.1.1.255`. Reused by the in-memory engine and usable on
/// its own for planning without an engine.
#[derive(Debug, Clone)]
pub struct SubnetAddressBook {
    roster: Roster,
}

impl SubnetAddressBook {
    pub fn new(roster: &Roster) -> Self {
        Self {
            roster: roster.clone(),
        }
    }
}

impl AddressBook for SubnetAddressBook {
    fn address_of(&self, participant: Participant) -> Option<Ipv4Addr> {
        let index = self.roster.global_index(participant)?;
        let host = index + 1;
        // One /24: host addresses above .254 cannot be assigned.
        if host > 254 {
            return None;
        }
        Some(Ipv4Addr::new(10, 1, 1, host as u8))
    }

    fn broadcast_address(&self) -> Ipv4Addr {
        Ipv4Addr::new(10, 1, 1, 255)
    }
}
