//! Neighbor derivation.
//!
//! This file implements the deterministic adjacency rule that stands in for
//! signal-range discovery: the same participant counts always produce the
//! same edge set. Isolated here so a distance- or signal-based rule could
//! replace it without touching the orchestrators.

use crate::topology::roster::Roster;
use crate::topology::types::{NeighborEdge, NodeKind, Participant};

/// Neighbors of a participant under the adjacency rule.
///
/// Fixed participant `i` is adjacent to fixed participants `j` with
/// `|i - j| <= 1` (a linear chain) plus the first `min(2, num_mobile)` mobile
/// participants. Mobile participant `i` is adjacent to fixed participant
/// `i mod num_fixed` and to mobile participant `(i + 1) mod num_mobile`
/// unless that wraps back to itself.
///
/// The rule is intentionally asymmetric (mobile participants do not all
/// reciprocate the fixed-to-mobile edges); edges are directed intents, not
/// mutual links. Pure function: no randomness, no hidden state.
pub fn neighbors_of(roster: &Roster, participant: Participant) -> Vec<Participant> {
    debug_assert!(roster.contains(participant));

    let mut neighbors = Vec::new();
    match participant.kind {
        NodeKind::Fixed => {
            let i = participant.index;
            if i > 0 {
                neighbors.push(Participant::fixed(i - 1));
            }
            if i + 1 < roster.num_fixed() {
                neighbors.push(Participant::fixed(i + 1));
            }
            for j in 0..roster.num_mobile().min(2) {
                neighbors.push(Participant::mobile(j));
            }
        }
        NodeKind::Mobile => {
            let i = participant.index;
            neighbors.push(Participant::fixed(i % roster.num_fixed()));
            let next = (i + 1) % roster.num_mobile();
            if next != i {
                neighbors.push(Participant::mobile(next));
            }
        }
    }
    neighbors
}

/// The full directed edge set, one entry per (source, neighbor) pair, in
/// roster order of sources.
pub fn all_edges(roster: &Roster) -> Vec<NeighborEdge> {
    let mut edges = Vec::new();
    for source in roster.all_participants() {
        for target in neighbors_of(roster, source) {
            edges.push(NeighborEdge { source, target });
        }
    }
    edges
}
