//! # Phasesim - Phase scheduling and neighbor topology engine
//!
//! This library derives complete, collision-free schedules for two-phase
//! discrete-event network simulations: a discovery phase in which every
//! participant advertises its presence by broadcast, followed by a
//! collaboration phase in which participants open unicast links to the
//! neighbors inferred from discovery.
//!
//! ## Overview
//!
//! Given participant counts and phase windows, the core computes which
//! participants collaborate with which (a deterministic adjacency rule
//! standing in for signal-range discovery), staggers every transmission so
//! thousands of events neither collide nor leak across phase boundaries, and
//! assigns each participant a unique collaboration port. Setup is idempotent
//! and replayable: the same configuration always derives the same plan,
//! which is also written out as JSON for visualization, tracing, and
//! teardown.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: simulation parameters, YAML parsing, and validation
//! - `topology`: participant roster and neighbor edge derivation
//! - `schedule`: phase windows and per-participant offset derivation
//! - `endpoint`: discovery/collaboration port allocation
//! - `event`: scheduled event records consumed by the engine
//! - `orchestrator`: discovery and collaboration phase planners
//! - `registry`: run-scoped event collection and plan serialization
//! - `engine`: the external engine seam plus a built-in in-memory engine
//! - `viz`: 3D scene trace with a 2D animation fallback
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use phasesim::config::SimConfig;
//! use phasesim::endpoint::PortPlan;
//! use phasesim::engine::SubnetAddressBook;
//! use phasesim::orchestrator::{collaboration, discovery};
//! use phasesim::registry::EventRegistry;
//! use phasesim::schedule::{PhasePlan, PhaseWindow};
//! use phasesim::topology::Roster;
//!
//! let config = SimConfig::default();
//! config.validate()?;
//!
//! let roster = Roster::new(config.num_fixed, config.num_mobile)?;
//! let phases = PhasePlan::new(
//!     PhaseWindow::new(config.discovery_start, config.discovery_duration, "discovery")?,
//!     PhaseWindow::new(config.collab_start, config.collab_duration, "collaboration")?,
//! )?;
//! let ports = PortPlan::new(config.discovery_port, config.collab_base_port, roster.len())?;
//! let addresses = SubnetAddressBook::new(&roster);
//!
//! let mut registry = EventRegistry::new();
//! discovery::plan(
//!     &roster,
//!     &phases.discovery,
//!     config.discovery_spacing,
//!     config.discovery_interval,
//!     &ports,
//!     &addresses,
//!     &mut registry,
//! )?;
//! collaboration::plan(
//!     &roster,
//!     &phases.collaboration,
//!     config.collab_spacing,
//!     &ports,
//!     &addresses,
//!     &mut registry,
//! )?;
//!
//! // registry now holds every receiver and sender for the engine to install.
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! Configuration errors (overlapping windows, offset spacing that does not
//! fit its window, out-of-range neighbor references, a missing participant
//! kind) are typed with `thiserror` and surface before any event reaches the
//! engine; a partial schedule is never handed off. The driver layer wraps
//! them with `color_eyre` context. The only graceful degradation is the
//! visualization backend fallback.

pub mod config;
pub mod endpoint;
pub mod engine;
pub mod event;
pub mod orchestrator;
pub mod registry;
pub mod schedule;
pub mod topology;
pub mod viz;
