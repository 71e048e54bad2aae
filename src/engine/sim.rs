//! In-memory discrete-event engine.
//!
//! A stand-in for a full network simulator: assigns addresses and positions,
//! accepts scheduled events verbatim, then drives a simulated clock through
//! every send, checking each packet against the receivers active at that
//! instant. Useful for exercising the schedule end to end and for the packet
//! trace, not for propagation accuracy.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::WrapErr;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::endpoint::Endpoint;
use crate::engine::{AddressBook, Engine, SubnetAddressBook};
use crate::event::{Role, ScheduledEvent};
use crate::topology::{NodeKind, Participant, Roster};

/// Bounds of the mobile placement rectangle, in meters.
const MOBILE_AREA_X: f64 = 60.0;
const MOBILE_AREA_Y: f64 = 30.0;

/// 2D position of a participant, used for visualization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub receivers: usize,
    pub senders: usize,
    pub packets_sent: u64,
    pub packets_delivered: u64,
    pub bytes_sent: u64,
}

/// The built-in engine: deterministic addressing, seeded placement, and a
/// time-ordered delivery loop.
pub struct InMemoryEngine {
    addresses: SubnetAddressBook,
    positions: BTreeMap<Participant, Position>,
    events: Vec<ScheduledEvent>,
    trace: Option<BufWriter<File>>,
}

impl InMemoryEngine {
    /// Build the engine for a roster: fixed participants on a line at
    /// `distance` intervals, mobile participants at seeded random spots in a
    /// bounded rectangle. The seed keeps placement reproducible run to run.
    pub fn new(roster: &Roster, distance: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut positions = BTreeMap::new();
        for participant in roster.all_participants() {
            let position = match participant.kind {
                NodeKind::Fixed => Position {
                    x: participant.index as f64 * distance,
                    y: 0.0,
                },
                NodeKind::Mobile => Position {
                    x: rng.gen_range(0.0..MOBILE_AREA_X),
                    y: rng.gen_range(0.0..MOBILE_AREA_Y),
                },
            };
            positions.insert(participant, position);
        }
        Self {
            addresses: SubnetAddressBook::new(roster),
            positions,
            events: Vec::new(),
            trace: None,
        }
    }

    /// Enable the plain-text packet trace (the pcap toggle).
    pub fn enable_packet_trace(&mut self, path: &Path) -> color_eyre::Result<()> {
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create packet trace '{}'", path.display()))?;
        self.trace = Some(BufWriter::new(file));
        Ok(())
    }

    /// Placement of every participant, for the visualization backends.
    pub fn positions(&self) -> &BTreeMap<Participant, Position> {
        &self.positions
    }

    /// Whether a packet sent to `destination` at time `t` reaches the
    /// receiver of `server`. Subnet-broadcast destinations match every
    /// receiver on the port except the sender's own.
    fn delivers(server: &ScheduledEvent, destination: Endpoint, sender: Participant, t: Duration) -> bool {
        if server.role != Role::Server || server.participant == sender {
            return false;
        }
        if t < server.start || t >= server.stop {
            return false;
        }
        if destination.address.octets()[3] == 255 {
            server.endpoint.port == destination.port
        } else {
            server.endpoint == destination
        }
    }
}

impl AddressBook for InMemoryEngine {
    fn address_of(&self, participant: Participant) -> Option<Ipv4Addr> {
        self.addresses.address_of(participant)
    }

    fn broadcast_address(&self) -> Ipv4Addr {
        self.addresses.broadcast_address()
    }
}

impl Engine for InMemoryEngine {
    fn install(&mut self, event: &ScheduledEvent) -> color_eyre::Result<()> {
        debug!(
            "install {:?} {:?} on {} at {} [{:.1}s, {:.1}s)",
            event.phase,
            event.role,
            event.participant,
            event.endpoint,
            event.start.as_secs_f64(),
            event.stop.as_secs_f64()
        );
        self.events.push(*event);
        Ok(())
    }

    fn run(&mut self, stop: Duration) -> color_eyre::Result<RunStats> {
        let mut stats = RunStats::default();
        stats.receivers = self.events.iter().filter(|e| e.role == Role::Server).count();
        stats.senders = self.events.iter().filter(|e| e.role == Role::Client).count();

        // Expand every sender into its individual sends and walk them in
        // time order.
        let mut sends: Vec<(Duration, Participant, Endpoint, u32)> = Vec::new();
        for event in self.events.iter().filter(|e| e.role == Role::Client) {
            let traffic = match event.traffic {
                Some(traffic) => traffic,
                None => continue,
            };
            let last = event.stop.min(stop);
            for k in 0..traffic.max_packets {
                let t = event.start + traffic.interval * k;
                if t >= last {
                    break;
                }
                sends.push((t, event.participant, event.endpoint, traffic.packet_size));
            }
        }
        sends.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        for (t, sender, destination, size) in sends {
            stats.packets_sent += 1;
            stats.bytes_sent += size as u64;
            let delivered = self
                .events
                .iter()
                .filter(|server| Self::delivers(server, destination, sender, t))
                .count() as u64;
            stats.packets_delivered += delivered;
            if let Some(trace) = &mut self.trace {
                writeln!(
                    trace,
                    "{:.3}s {} -> {} {}B delivered={}",
                    t.as_secs_f64(),
                    sender,
                    destination,
                    size,
                    delivered
                )?;
            }
        }

        if let Some(trace) = &mut self.trace {
            trace.flush()?;
        }

        info!(
            "Event loop finished at {:.1}s: {} packets sent, {} delivered",
            stop.as_secs_f64(),
            stats.packets_sent,
            stats.packets_delivered
        );

        // All applications are retired once their stop time has elapsed.
        self.events.clear();
        Ok(stats)
    }
}
