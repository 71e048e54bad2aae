//! Scheduled event records.
//!
//! The output unit of the orchestrators: one record per receiver or sender
//! the engine should install, complete with endpoint, start/stop times, and
//! (for senders) the traffic profile. The engine installs these verbatim;
//! nothing in the core performs network I/O.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::schedule::PhaseWindow;
use crate::topology::Participant;

/// The phase an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Discovery,
    Collaboration,
}

/// Whether an event receives or sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Datagram receiver bound to the endpoint
    Server,
    /// Datagram sender addressing the endpoint
    Client,
}

/// Traffic profile of a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traffic {
    /// Time between packets
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Upper bound on packets sent; the stop time may cut this short
    pub max_packets: u32,
    /// Payload size in bytes
    pub packet_size: u32,
}

/// One receiver or sender to install on a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// The participant the application runs on
    pub participant: Participant,
    pub phase: Phase,
    pub role: Role,
    /// Bind endpoint for servers, destination endpoint for clients
    pub endpoint: Endpoint,
    /// Unicast target participant, present only on collaboration clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<Participant>,
    #[serde(with = "humantime_serde")]
    pub start: Duration,
    #[serde(with = "humantime_serde")]
    pub stop: Duration,
    /// Present only on clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Traffic>,
}

impl ScheduledEvent {
    /// Whether the event lies within its phase window with a positive span.
    pub fn is_within(&self, window: &PhaseWindow) -> bool {
        self.start < self.stop && window.contains(self.start) && self.stop <= window.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_event_window_containment() {
        let window = PhaseWindow::new(
            Duration::from_secs(2),
            Duration::from_secs(20),
            "discovery",
        )
        .unwrap();
        let mut event = ScheduledEvent {
            participant: Participant::fixed(0),
            phase: Phase::Discovery,
            role: Role::Server,
            endpoint: Endpoint {
                address: Ipv4Addr::new(10, 1, 1, 1),
                port: 8000,
            },
            peer: None,
            start: Duration::from_secs(2),
            stop: Duration::from_secs(22),
            traffic: None,
        };
        assert!(event.is_within(&window));

        event.stop = Duration::from_secs(23);
        assert!(!event.is_within(&window));

        event.stop = Duration::from_secs(2);
        assert!(!event.is_within(&window), "zero-span event");
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = ScheduledEvent {
            participant: Participant::mobile(1),
            phase: Phase::Collaboration,
            role: Role::Client,
            endpoint: Endpoint {
                address: Ipv4Addr::new(10, 1, 1, 4),
                port: 9003,
            },
            peer: Some(Participant::mobile(2)),
            start: Duration::from_millis(25_900),
            stop: Duration::from_secs(95),
            traffic: Some(Traffic {
                interval: Duration::from_secs(1),
                max_packets: 10_000,
                packet_size: 1024,
            }),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ScheduledEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
