//! Simulation configuration.
//!
//! This module defines the tunable parameters of a simulation run and the
//! validation pass that rejects inconsistent configurations before any
//! scheduling work happens. Defaults match the reference two-phase scenario
//! (2 fixed nodes, 4 mobile nodes, 100 s of simulated time).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::WrapErr;

/// Configuration errors.
///
/// Every variant is fatal: validation runs before scheduling and a failure
/// aborts the run, so a partial schedule is never handed to the engine.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one {0} participant is required by the adjacency rule")]
    MissingKind(&'static str),
    #[error("{0} window must have a positive length")]
    EmptyWindow(&'static str),
    #[error("collaboration window starts at {collab_start:?}, before discovery ends at {discovery_end:?}")]
    PhaseOverlap {
        collab_start: Duration,
        discovery_end: Duration,
    },
    #[error("{phase} spacing {spacing:?} x {count} participants does not fit in a {length:?} window")]
    SpacingOverrun {
        phase: &'static str,
        spacing: Duration,
        count: usize,
        length: Duration,
    },
    #[error("collaboration ports exhaust the u16 range: base {base} + {count} participants")]
    PortRangeExhausted { base: u16, count: usize },
    #[error("{0} spacing must be positive")]
    ZeroSpacing(&'static str),
    #[error("discovery interval must be positive")]
    ZeroInterval,
    #[error("simulation stops at {stop:?}, before the collaboration window ends at {collab_end:?}")]
    StopBeforeCollabEnd { stop: Duration, collab_end: Duration },
}

/// Parameters of a simulation run.
///
/// Serialized as YAML for config files; every field has a default so a
/// partial file (or no file at all) is usable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Number of fixed (stationary) participants
    pub num_fixed: u32,
    /// Number of mobile participants
    pub num_mobile: u32,
    /// Total simulated time
    #[serde(with = "humantime_serde")]
    pub sim_time: Duration,
    /// Distance in meters between adjacent fixed nodes
    pub distance: f64,
    /// Write a plain-text packet trace during the run
    pub enable_pcap: bool,
    /// Verbose logging
    pub verbose: bool,

    /// Start of the discovery window
    #[serde(with = "humantime_serde")]
    pub discovery_start: Duration,
    /// Length of the discovery window
    #[serde(with = "humantime_serde")]
    pub discovery_duration: Duration,
    /// Start of the collaboration window
    #[serde(with = "humantime_serde")]
    pub collab_start: Duration,
    /// Length of the collaboration window
    #[serde(with = "humantime_serde")]
    pub collab_duration: Duration,

    /// Well-known port shared by every discovery receiver
    pub discovery_port: u16,
    /// Base port for per-participant collaboration receivers
    pub collab_base_port: u16,

    /// Repetition interval for discovery broadcasts
    #[serde(with = "humantime_serde")]
    pub discovery_interval: Duration,
    /// Per-participant stagger between discovery send starts
    #[serde(with = "humantime_serde")]
    pub discovery_spacing: Duration,
    /// Per-participant stagger between collaboration send starts
    #[serde(with = "humantime_serde")]
    pub collab_spacing: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_fixed: 2,
            num_mobile: 4,
            sim_time: Duration::from_secs(100),
            distance: 50.0,
            enable_pcap: false,
            verbose: false,
            discovery_start: Duration::from_secs(2),
            discovery_duration: Duration::from_secs(20),
            collab_start: Duration::from_secs(25),
            collab_duration: Duration::from_secs(70),
            discovery_port: 8000,
            collab_base_port: 9000,
            discovery_interval: Duration::from_secs(2),
            discovery_spacing: Duration::from_millis(200),
            collab_spacing: Duration::from_millis(300),
        }
    }
}

impl SimConfig {
    /// Total number of participants across both kinds.
    pub fn total_participants(&self) -> usize {
        self.num_fixed as usize + self.num_mobile as usize
    }

    /// End of the discovery window.
    pub fn discovery_end(&self) -> Duration {
        self.discovery_start + self.discovery_duration
    }

    /// End of the collaboration window.
    pub fn collab_end(&self) -> Duration {
        self.collab_start + self.collab_duration
    }

    /// Validate the configuration.
    ///
    /// Checks every configuration-error class up front so that scheduling can
    /// assume a consistent input. The adjacency rule needs at least one
    /// participant of each kind; zero of either would silently produce a
    /// broken edge set, so it is rejected here instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_fixed == 0 {
            return Err(ConfigError::MissingKind("fixed"));
        }
        if self.num_mobile == 0 {
            return Err(ConfigError::MissingKind("mobile"));
        }

        if self.discovery_duration.is_zero() {
            return Err(ConfigError::EmptyWindow("discovery"));
        }
        if self.collab_duration.is_zero() {
            return Err(ConfigError::EmptyWindow("collaboration"));
        }

        if self.collab_start < self.discovery_end() {
            return Err(ConfigError::PhaseOverlap {
                collab_start: self.collab_start,
                discovery_end: self.discovery_end(),
            });
        }

        if self.discovery_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        let count = self.total_participants();
        Self::check_spacing("discovery", self.discovery_spacing, count, self.discovery_duration)?;
        Self::check_spacing("collaboration", self.collab_spacing, count, self.collab_duration)?;

        // Every participant gets a dedicated collaboration port.
        let highest = self.collab_base_port as usize + count - 1;
        if highest > u16::MAX as usize {
            return Err(ConfigError::PortRangeExhausted {
                base: self.collab_base_port,
                count,
            });
        }

        if self.sim_time < self.collab_end() {
            return Err(ConfigError::StopBeforeCollabEnd {
                stop: self.sim_time,
                collab_end: self.collab_end(),
            });
        }

        Ok(())
    }

    fn check_spacing(
        phase: &'static str,
        spacing: Duration,
        count: usize,
        length: Duration,
    ) -> Result<(), ConfigError> {
        // Zero spacing would collapse every offset onto the window start.
        if spacing.is_zero() {
            return Err(ConfigError::ZeroSpacing(phase));
        }
        let total = u32::try_from(count)
            .ok()
            .and_then(|n| spacing.checked_mul(n))
            .unwrap_or(Duration::MAX);
        if total >= length {
            return Err(ConfigError::SpacingOverrun {
                phase,
                spacing,
                count,
                length,
            });
        }
        Ok(())
    }
}

/// Load a configuration from a YAML file.
pub fn load_config(path: &Path) -> color_eyre::Result<SimConfig> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: SimConfig = serde_yaml::from_str(&contents)
        .wrap_err_with(|| format!("Failed to parse config file '{}'", path.display()))?;
    Ok(config)
}
