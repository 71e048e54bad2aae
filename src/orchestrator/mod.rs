//! Phase orchestration.
//!
//! The orchestrators turn the topology, windows, and port plan into the
//! complete list of scheduled events for a run. All decisions are made
//! eagerly and synchronously here; nothing is handed to the engine until the
//! whole schedule exists, so a planning failure never leaves a partial
//! schedule behind.

pub mod collaboration;
pub mod discovery;

use crate::topology::Participant;

/// Planning errors.
///
/// These indicate an inconsistent setup (an edge or lookup referencing a
/// participant the run does not have) and are always fatal; the orchestrators
/// never skip an entry or substitute a default.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no address resolved for {0}")]
    UnresolvedAddress(Participant),
    #[error("no collaboration port resolved for {0}")]
    UnresolvedPort(Participant),
    #[error("refusing to schedule self edge on {0}")]
    SelfEdge(Participant),
}
