//! Run-scoped event registry.
//!
//! Every receiver and sender the orchestrators install is recorded here so
//! the derived schedule can be inspected, replayed for visualization, and
//! torn down after the run. Serialized to `plan.json` in the output
//! directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use color_eyre::eyre::WrapErr;

use crate::event::{Phase, Role, ScheduledEvent};
use crate::topology::Participant;

/// Ordered collection of all scheduled events in a run.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRegistry {
    events: Vec<ScheduledEvent>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed event. Insertion order is preserved so a replayed
    /// plan installs in the same order it was derived.
    pub fn record(&mut self, event: ScheduledEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events belonging to one phase.
    pub fn phase_events(&self, phase: Phase) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.iter().filter(move |e| e.phase == phase)
    }

    /// Events installed on one participant.
    pub fn events_for(&self, participant: Participant) -> impl Iterator<Item = &ScheduledEvent> {
        self.events
            .iter()
            .filter(move |e| e.participant == participant)
    }

    /// Count of (servers, clients) in one phase, for the operator summary.
    pub fn phase_counts(&self, phase: Phase) -> (usize, usize) {
        let mut servers = 0;
        let mut clients = 0;
        for event in self.phase_events(phase) {
            match event.role {
                Role::Server => servers += 1,
                Role::Client => clients += 1,
            }
        }
        (servers, clients)
    }

    /// Write the plan to a JSON file for inspection and replay.
    pub fn write_json(&self, path: &Path) -> color_eyre::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .wrap_err("Failed to serialize event registry")?;
        std::fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write plan file '{}'", path.display()))?;
        Ok(())
    }

    /// Read a previously written plan.
    pub fn read_json(path: &Path) -> color_eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read plan file '{}'", path.display()))?;
        let registry = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse plan file '{}'", path.display()))?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use std::net::Ipv4Addr;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn sample_event(participant: Participant, phase: Phase, role: Role) -> ScheduledEvent {
        ScheduledEvent {
            participant,
            phase,
            role,
            endpoint: Endpoint {
                address: Ipv4Addr::new(10, 1, 1, 1),
                port: 8000,
            },
            peer: None,
            start: Duration::from_secs(2),
            stop: Duration::from_secs(22),
            traffic: None,
        }
    }

    #[test]
    fn test_registry_queries() {
        let mut registry = EventRegistry::new();
        registry.record(sample_event(Participant::fixed(0), Phase::Discovery, Role::Server));
        registry.record(sample_event(Participant::fixed(0), Phase::Discovery, Role::Client));
        registry.record(sample_event(Participant::mobile(0), Phase::Collaboration, Role::Server));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.phase_events(Phase::Discovery).count(), 2);
        assert_eq!(registry.events_for(Participant::fixed(0)).count(), 2);
        assert_eq!(registry.phase_counts(Phase::Discovery), (1, 1));
        assert_eq!(registry.phase_counts(Phase::Collaboration), (1, 0));
    }

    #[test]
    fn test_registry_json_round_trip() {
        let mut registry = EventRegistry::new();
        registry.record(sample_event(Participant::fixed(1), Phase::Discovery, Role::Server));
        registry.record(sample_event(Participant::mobile(2), Phase::Collaboration, Role::Client));

        let file = NamedTempFile::new().unwrap();
        registry.write_json(file.path()).unwrap();
        let reread = EventRegistry::read_json(file.path()).unwrap();
        assert_eq!(reread, registry);
    }
}
