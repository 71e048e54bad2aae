//! Phase windows and offset derivation.
//!
//! A run has two phase windows, discovery and collaboration, that must not
//! overlap in simulated time. Within a window each participant gets a start
//! offset staggered by its roster position so that transmissions do not all
//! fire at the same instant.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConfigError;

/// A simulated time interval during which one class of events is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWindow {
    /// Start of the window, relative to simulation time zero
    #[serde(with = "humantime_serde")]
    pub start: Duration,
    /// Length of the window, always positive
    #[serde(with = "humantime_serde")]
    pub length: Duration,
}

impl PhaseWindow {
    /// Build a window, rejecting a zero length.
    pub fn new(start: Duration, length: Duration, phase: &'static str) -> Result<Self, ConfigError> {
        if length.is_zero() {
            return Err(ConfigError::EmptyWindow(phase));
        }
        Ok(Self { start, length })
    }

    /// First instant after the window.
    pub fn end(&self) -> Duration {
        self.start + self.length
    }

    /// Whether `t` falls within `[start, end)`.
    pub fn contains(&self, t: Duration) -> bool {
        t >= self.start && t < self.end()
    }
}

/// The discovery/collaboration window pair of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub discovery: PhaseWindow,
    pub collaboration: PhaseWindow,
}

impl PhasePlan {
    /// Pair two windows, enforcing that collaboration starts no earlier than
    /// discovery ends. The simulated protocol depends on this ordering, so a
    /// violation is a configuration error rather than something to clamp.
    pub fn new(discovery: PhaseWindow, collaboration: PhaseWindow) -> Result<Self, ConfigError> {
        if collaboration.start < discovery.end() {
            return Err(ConfigError::PhaseOverlap {
                collab_start: collaboration.start,
                discovery_end: discovery.end(),
            });
        }
        Ok(Self {
            discovery,
            collaboration,
        })
    }
}

/// Per-participant start offsets within a window.
///
/// Offset `i` is `window.start + i * spacing` for the participant at roster
/// position `i`. Offsets strictly increase with position and all fall inside
/// the window as long as `spacing * count < window.length`; violating that
/// precondition is a configuration error, never a silent truncation.
pub fn stagger(
    window: &PhaseWindow,
    count: usize,
    spacing: Duration,
    phase: &'static str,
) -> Result<Vec<Duration>, ConfigError> {
    // Zero spacing would collapse every offset onto the window start,
    // breaking the strictly-increasing guarantee.
    if spacing.is_zero() {
        return Err(ConfigError::ZeroSpacing(phase));
    }
    let total = u32::try_from(count)
        .ok()
        .and_then(|n| spacing.checked_mul(n))
        .unwrap_or(Duration::MAX);
    if total >= window.length {
        return Err(ConfigError::SpacingOverrun {
            phase,
            spacing,
            count,
            length: window.length,
        });
    }
    Ok((0..count as u32).map(|i| window.start + spacing * i).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_window_rejects_zero_length() {
        assert!(matches!(
            PhaseWindow::new(secs(2), Duration::ZERO, "discovery"),
            Err(ConfigError::EmptyWindow("discovery"))
        ));
    }

    #[test]
    fn test_window_bounds() {
        let window = PhaseWindow::new(secs(2), secs(20), "discovery").unwrap();
        assert_eq!(window.end(), secs(22));
        assert!(window.contains(secs(2)));
        assert!(window.contains(secs(21)));
        assert!(!window.contains(secs(22)));
        assert!(!window.contains(secs(1)));
    }

    #[test]
    fn test_phase_plan_rejects_overlap() {
        let discovery = PhaseWindow::new(secs(2), secs(20), "discovery").unwrap();
        let collab = PhaseWindow::new(secs(21), secs(70), "collaboration").unwrap();
        assert!(matches!(
            PhasePlan::new(discovery, collab),
            Err(ConfigError::PhaseOverlap { .. })
        ));

        // Touching windows are fine.
        let collab = PhaseWindow::new(secs(22), secs(70), "collaboration").unwrap();
        assert!(PhasePlan::new(discovery, collab).is_ok());
    }

    #[test]
    fn test_stagger_reference_offsets() {
        // Discovery window [2.0, 22.0), spacing 0.2, 6 participants.
        let window = PhaseWindow::new(secs(2), secs(20), "discovery").unwrap();
        let offsets = stagger(&window, 6, Duration::from_millis(200), "discovery").unwrap();
        let expected: Vec<Duration> = [2.0, 2.2, 2.4, 2.6, 2.8, 3.0]
            .iter()
            .map(|&s| Duration::from_secs_f64(s))
            .collect();
        assert_eq!(offsets, expected);
        for offset in &offsets {
            assert!(window.contains(*offset));
        }
    }

    #[test]
    fn test_stagger_offsets_strictly_increase() {
        let window = PhaseWindow::new(secs(25), secs(70), "collaboration").unwrap();
        let offsets = stagger(&window, 12, Duration::from_millis(300), "collaboration").unwrap();
        for pair in offsets.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(offsets.iter().all(|&t| window.contains(t)));
    }

    #[test]
    fn test_stagger_rejects_zero_spacing() {
        let window = PhaseWindow::new(secs(2), secs(20), "discovery").unwrap();
        assert!(matches!(
            stagger(&window, 6, Duration::ZERO, "discovery"),
            Err(ConfigError::ZeroSpacing("discovery"))
        ));
    }

    #[test]
    fn test_stagger_rejects_overrun() {
        let window = PhaseWindow::new(secs(2), secs(20), "discovery").unwrap();
        assert!(matches!(
            stagger(&window, 6, secs(5), "discovery"),
            Err(ConfigError::SpacingOverrun { .. })
        ));
        // Exactly filling the window is also an overrun: the last offset
        // must stay strictly inside it with room for the spacing.
        assert!(matches!(
            stagger(&window, 4, secs(5), "discovery"),
            Err(ConfigError::SpacingOverrun { .. })
        ));
    }
}
