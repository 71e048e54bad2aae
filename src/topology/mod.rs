//! Network topology model.
//!
//! Static description of the participant set and the derived neighbor
//! relationships: who exists, in what order, and who intends to collaborate
//! with whom.

pub mod connections;
pub mod roster;
pub mod types;

pub use connections::{all_edges, neighbors_of};
pub use roster::Roster;
pub use types::{NeighborEdge, NodeKind, Participant};
