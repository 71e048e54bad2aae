//! Discovery phase orchestration.
//!
//! Every participant runs one broadcast receiver for the whole discovery
//! window and one broadcast sender that advertises its presence to the
//! subnet broadcast address (a single broadcast, not N unicasts). Senders
//! start at the participant's staggered offset and stop at the window end
//! regardless of how many of their scheduled packets remain.

use std::time::Duration;

use log::info;

use crate::endpoint::{Endpoint, PortPlan};
use crate::engine::AddressBook;
use crate::event::{Phase, Role, ScheduledEvent, Traffic};
use crate::orchestrator::PlanError;
use crate::registry::EventRegistry;
use crate::schedule::{self, PhaseWindow};
use crate::topology::Roster;

/// Payload size of a discovery advertisement.
const DISCOVERY_PACKET_SIZE: u32 = 128;

/// Schedule the discovery phase for every participant.
///
/// Records one receiver and one sender per participant in the registry.
/// Performs no I/O; the returned schedule is handed to the engine by the
/// driver.
pub fn plan(
    roster: &Roster,
    window: &PhaseWindow,
    spacing: Duration,
    interval: Duration,
    ports: &PortPlan,
    addresses: &dyn AddressBook,
    registry: &mut EventRegistry,
) -> color_eyre::Result<()> {
    if interval.is_zero() {
        return Err(crate::config::ConfigError::ZeroInterval.into());
    }

    let participants = roster.all_participants();
    let offsets = schedule::stagger(window, participants.len(), spacing, "discovery")?;

    // Bounded packet count; the window boundary cuts the tail off anyway.
    // The quotient can exceed u32 for tiny intervals, so clamp instead of
    // truncating.
    let max_packets =
        u32::try_from(window.length.as_nanos() / interval.as_nanos()).unwrap_or(u32::MAX);

    let broadcast = Endpoint {
        address: addresses.broadcast_address(),
        port: ports.discovery_port(),
    };

    info!("Setting up discovery receivers on all participants:");
    for &participant in &participants {
        let address = addresses
            .address_of(participant)
            .ok_or(PlanError::UnresolvedAddress(participant))?;
        let endpoint = Endpoint {
            address,
            port: ports.discovery_port(),
        };
        registry.record(ScheduledEvent {
            participant,
            phase: Phase::Discovery,
            role: Role::Server,
            endpoint,
            peer: None,
            start: window.start,
            stop: window.end(),
            traffic: None,
        });
        info!("  {}: discovery receiver at {}", participant, endpoint);
    }

    info!("Setting up discovery broadcasters on all participants:");
    for (index, &participant) in participants.iter().enumerate() {
        registry.record(ScheduledEvent {
            participant,
            phase: Phase::Discovery,
            role: Role::Client,
            endpoint: broadcast,
            peer: None,
            start: offsets[index],
            stop: window.end(),
            traffic: Some(Traffic {
                interval,
                max_packets,
                packet_size: DISCOVERY_PACKET_SIZE,
            }),
        });
        info!(
            "  {}: broadcasting to {} from {:.1}s",
            participant,
            broadcast,
            offsets[index].as_secs_f64()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SubnetAddressBook;

    fn discovery_window() -> PhaseWindow {
        PhaseWindow::new(Duration::from_secs(2), Duration::from_secs(20), "discovery").unwrap()
    }

    fn plan_for(roster: &Roster) -> EventRegistry {
        let ports = PortPlan::new(8000, 9000, roster.len()).unwrap();
        let addresses = SubnetAddressBook::new(roster);
        let mut registry = EventRegistry::new();
        plan(
            roster,
            &discovery_window(),
            Duration::from_millis(200),
            Duration::from_secs(2),
            &ports,
            &addresses,
            &mut registry,
        )
        .unwrap();
        registry
    }

    #[test]
    fn test_one_receiver_and_one_sender_per_participant() {
        let roster = Roster::new(2, 4).unwrap();
        let registry = plan_for(&roster);
        assert_eq!(registry.phase_counts(Phase::Discovery), (6, 6));
        for p in roster.all_participants() {
            assert_eq!(registry.events_for(p).count(), 2);
        }
    }

    #[test]
    fn test_senders_address_the_broadcast() {
        let roster = Roster::new(2, 4).unwrap();
        let registry = plan_for(&roster);
        for event in registry.events() {
            if event.role == Role::Client {
                assert_eq!(event.endpoint.address.octets()[3], 255);
                assert_eq!(event.endpoint.port, 8000);
            }
        }
    }

    #[test]
    fn test_sender_offsets_and_bounds() {
        let roster = Roster::new(2, 4).unwrap();
        let registry = plan_for(&roster);
        let window = discovery_window();
        let starts: Vec<Duration> = registry
            .phase_events(Phase::Discovery)
            .filter(|e| e.role == Role::Client)
            .map(|e| e.start)
            .collect();
        let expected: Vec<Duration> = [2.0, 2.2, 2.4, 2.6, 2.8, 3.0]
            .iter()
            .map(|&s| Duration::from_secs_f64(s))
            .collect();
        assert_eq!(starts, expected);
        for event in registry.events() {
            assert!(event.is_within(&window));
        }
    }

    #[test]
    fn test_packet_count_bounded_by_window() {
        let roster = Roster::new(1, 1).unwrap();
        let registry = plan_for(&roster);
        let client = registry
            .events()
            .iter()
            .find(|e| e.role == Role::Client)
            .unwrap();
        let traffic = client.traffic.unwrap();
        // 20s window at a 2s interval.
        assert_eq!(traffic.max_packets, 10);
        assert_eq!(traffic.packet_size, 128);
        // Senders stop at the window boundary, not on packet exhaustion.
        assert_eq!(client.stop, discovery_window().end());
    }

    #[test]
    fn test_tiny_interval_saturates_packet_count() {
        // 20s / 1ns overflows u32; the count saturates instead of wrapping.
        let roster = Roster::new(1, 1).unwrap();
        let ports = PortPlan::new(8000, 9000, roster.len()).unwrap();
        let addresses = SubnetAddressBook::new(&roster);
        let mut registry = EventRegistry::new();
        plan(
            &roster,
            &discovery_window(),
            Duration::from_millis(200),
            Duration::from_nanos(1),
            &ports,
            &addresses,
            &mut registry,
        )
        .unwrap();
        let client = registry
            .events()
            .iter()
            .find(|e| e.role == Role::Client)
            .unwrap();
        assert_eq!(client.traffic.unwrap().max_packets, u32::MAX);
    }

    #[test]
    fn test_unresolved_address_is_fatal() {
        // An address book built for a smaller roster cannot resolve Mobile-3.
        let roster = Roster::new(2, 4).unwrap();
        let small = Roster::new(2, 2).unwrap();
        let ports = PortPlan::new(8000, 9000, roster.len()).unwrap();
        let addresses = SubnetAddressBook::new(&small);
        let mut registry = EventRegistry::new();
        let result = plan(
            &roster,
            &discovery_window(),
            Duration::from_millis(200),
            Duration::from_secs(2),
            &ports,
            &addresses,
            &mut registry,
        );
        assert!(result.is_err());
    }
}
