//! Topology type definitions.
//!
//! This file contains the participant identity types and the directed
//! neighbor edge produced by the adjacency rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a simulated participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    /// Stationary node, placed on a line at a configured spacing
    Fixed,
    /// Node with a mobility model attached by the engine
    Mobile,
}

/// Identity of a simulated participant.
///
/// Immutable once created; the participant set is fixed for the whole run.
/// Ordering follows the roster order (all fixed participants before all
/// mobile ones, ascending index within each kind), which is what the derived
/// `Ord` gives us since `Fixed < Mobile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Participant {
    pub kind: NodeKind,
    pub index: u32,
}

impl Participant {
    pub fn fixed(index: u32) -> Self {
        Self {
            kind: NodeKind::Fixed,
            index,
        }
    }

    pub fn mobile(index: u32) -> Self {
        Self {
            kind: NodeKind::Mobile,
            index,
        }
    }

    /// Operator-facing label, e.g. `Fixed-0` or `Mobile-3`.
    pub fn label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Fixed => write!(f, "Fixed-{}", self.index),
            NodeKind::Mobile => write!(f, "Mobile-{}", self.index),
        }
    }
}

/// Directed collaboration intent: the source will send to the target.
///
/// Computed once from the adjacency rule before scheduling and never mutated.
/// Self-edges are never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborEdge {
    pub source: Participant,
    pub target: Participant,
}

impl fmt::Display for NeighborEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_labels() {
        assert_eq!(Participant::fixed(0).label(), "Fixed-0");
        assert_eq!(Participant::mobile(3).label(), "Mobile-3");
    }

    #[test]
    fn test_roster_ordering_via_ord() {
        // Fixed sorts before mobile regardless of index.
        assert!(Participant::fixed(5) < Participant::mobile(0));
        assert!(Participant::fixed(0) < Participant::fixed(1));
        assert!(Participant::mobile(2) < Participant::mobile(3));
    }
}
