//! Collaboration phase orchestration.
//!
//! Every participant runs one unicast receiver on its dedicated
//! collaboration port for the whole window. For each directed neighbor edge
//! the edge's source installs one sender targeting the neighbor's endpoint;
//! all of a participant's senders share its single staggered offset, so its
//! outbound links open simultaneously. The receiver side is generic and does
//! not distinguish which neighbor a packet came from.

use std::time::Duration;

use log::info;

use crate::endpoint::{Endpoint, PortPlan};
use crate::engine::AddressBook;
use crate::event::{Phase, Role, ScheduledEvent, Traffic};
use crate::orchestrator::PlanError;
use crate::registry::EventRegistry;
use crate::schedule::{self, PhaseWindow};
use crate::topology::{self, Roster};

/// Time between collaboration packets.
const COLLAB_INTERVAL: Duration = Duration::from_secs(1);
/// Large but bounded packet budget per link.
const COLLAB_MAX_PACKETS: u32 = 10_000;
/// Payload size of a collaboration packet.
const COLLAB_PACKET_SIZE: u32 = 1024;

/// Schedule the collaboration phase: receivers for everyone, then one sender
/// per neighbor edge.
///
/// An edge whose endpoint cannot be resolved is a fatal configuration error;
/// the orchestrator never skips an edge or substitutes a default address.
pub fn plan(
    roster: &Roster,
    window: &PhaseWindow,
    spacing: Duration,
    ports: &PortPlan,
    addresses: &dyn AddressBook,
    registry: &mut EventRegistry,
) -> color_eyre::Result<()> {
    let participants = roster.all_participants();
    let offsets = schedule::stagger(window, participants.len(), spacing, "collaboration")?;

    info!("Setting up collaboration receivers on all participants:");
    for &participant in &participants {
        let address = addresses
            .address_of(participant)
            .ok_or(PlanError::UnresolvedAddress(participant))?;
        let port = ports
            .collaboration_port(roster, participant)
            .ok_or(PlanError::UnresolvedPort(participant))?;
        let endpoint = Endpoint { address, port };
        registry.record(ScheduledEvent {
            participant,
            phase: Phase::Collaboration,
            role: Role::Server,
            endpoint,
            peer: None,
            start: window.start,
            stop: window.end(),
            traffic: None,
        });
        info!("  {}: collaboration receiver at {}", participant, endpoint);
    }

    info!("Setting up collaboration links (discovered neighbors):");
    for edge in topology::all_edges(roster) {
        // The topology model never produces self edges; check anyway before
        // scheduling traffic to nowhere.
        if edge.source == edge.target {
            return Err(PlanError::SelfEdge(edge.source).into());
        }

        let source_index = roster
            .global_index(edge.source)
            .ok_or(PlanError::UnresolvedAddress(edge.source))?;
        let target_address = addresses
            .address_of(edge.target)
            .ok_or(PlanError::UnresolvedAddress(edge.target))?;
        let target_port = ports
            .collaboration_port(roster, edge.target)
            .ok_or(PlanError::UnresolvedPort(edge.target))?;
        let destination = Endpoint {
            address: target_address,
            port: target_port,
        };

        registry.record(ScheduledEvent {
            participant: edge.source,
            phase: Phase::Collaboration,
            role: Role::Client,
            endpoint: destination,
            peer: Some(edge.target),
            start: offsets[source_index],
            stop: window.end(),
            traffic: Some(Traffic {
                interval: COLLAB_INTERVAL,
                max_packets: COLLAB_MAX_PACKETS,
                packet_size: COLLAB_PACKET_SIZE,
            }),
        });
        info!(
            "  {} -> {} at {} from {:.1}s",
            edge.source,
            edge.target,
            destination,
            offsets[source_index].as_secs_f64()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SubnetAddressBook;
    use crate::topology::Participant;
    use std::net::Ipv4Addr;

    fn collab_window() -> PhaseWindow {
        PhaseWindow::new(Duration::from_secs(25), Duration::from_secs(70), "collaboration")
            .unwrap()
    }

    fn plan_for(roster: &Roster) -> EventRegistry {
        let ports = PortPlan::new(8000, 9000, roster.len()).unwrap();
        let addresses = SubnetAddressBook::new(roster);
        let mut registry = EventRegistry::new();
        plan(
            roster,
            &collab_window(),
            Duration::from_millis(300),
            &ports,
            &addresses,
            &mut registry,
        )
        .unwrap();
        registry
    }

    #[test]
    fn test_one_receiver_per_participant_one_sender_per_edge() {
        let roster = Roster::new(2, 4).unwrap();
        let registry = plan_for(&roster);
        let edges = topology::all_edges(&roster);
        assert_eq!(
            registry.phase_counts(Phase::Collaboration),
            (roster.len(), edges.len())
        );
    }

    #[test]
    fn test_senders_target_dedicated_ports() {
        let roster = Roster::new(2, 4).unwrap();
        let registry = plan_for(&roster);
        // Fixed-0 -> Fixed-1 targets 10.1.1.2:9001.
        let event = registry
            .events_for(Participant::fixed(0))
            .find(|e| e.peer == Some(Participant::fixed(1)))
            .unwrap();
        assert_eq!(event.endpoint.address, Ipv4Addr::new(10, 1, 1, 2));
        assert_eq!(event.endpoint.port, 9001);
        // Mobile-3 -> Mobile-0 targets 10.1.1.3:9002.
        let event = registry
            .events_for(Participant::mobile(3))
            .find(|e| e.peer == Some(Participant::mobile(0)))
            .unwrap();
        assert_eq!(event.endpoint.address, Ipv4Addr::new(10, 1, 1, 3));
        assert_eq!(event.endpoint.port, 9002);
    }

    #[test]
    fn test_all_senders_of_a_participant_share_its_offset() {
        let roster = Roster::new(2, 4).unwrap();
        let registry = plan_for(&roster);
        for p in roster.all_participants() {
            let starts: Vec<Duration> = registry
                .events_for(p)
                .filter(|e| e.role == Role::Client)
                .map(|e| e.start)
                .collect();
            assert!(!starts.is_empty());
            assert!(starts.iter().all(|&s| s == starts[0]), "{} staggered per edge", p);
            let index = roster.global_index(p).unwrap() as u32;
            assert_eq!(
                starts[0],
                collab_window().start + Duration::from_millis(300) * index
            );
        }
    }

    #[test]
    fn test_events_stay_within_window() {
        let roster = Roster::new(3, 5).unwrap();
        let registry = plan_for(&roster);
        let window = collab_window();
        for event in registry.events() {
            assert!(event.is_within(&window));
        }
    }

    #[test]
    fn test_unresolvable_neighbor_is_fatal() {
        // Address book truncated to a smaller roster: planning must fail,
        // not silently drop the unreachable edges.
        let roster = Roster::new(2, 4).unwrap();
        let small = Roster::new(2, 1).unwrap();
        let ports = PortPlan::new(8000, 9000, roster.len()).unwrap();
        let addresses = SubnetAddressBook::new(&small);
        let mut registry = EventRegistry::new();
        let result = plan(
            &roster,
            &collab_window(),
            Duration::from_millis(300),
            &ports,
            &addresses,
            &mut registry,
        );
        assert!(result.is_err());
    }
}
