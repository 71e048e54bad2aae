//! Visualization output.
//!
//! Two backends: a 3D scene trace written as JSON for the primary renderer,
//! and a 2D animation file written as XML for the fallback renderer. The
//! choice is made once at setup time based on whether the 3D renderer's
//! asset directory is available; a missing 3D backend is the only capability
//! gap that degrades gracefully instead of failing the run.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use log::{info, warn};

use crate::engine::sim::Position;
use crate::registry::EventRegistry;
use crate::topology::{self, NodeKind, Participant, Roster};

/// Environment variable pointing at the 3D renderer's model assets.
pub const ASSETS_ENV: &str = "PHASESIM_3D_ASSETS";

/// The visualization strategy for a run, resolved once at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VizBackend {
    /// Primary: 3D scene trace (JSON)
    Scene3d(PathBuf),
    /// Fallback: 2D animation (XML)
    Animation2d(PathBuf),
}

impl VizBackend {
    /// Path of the file this backend writes.
    pub fn output_path(&self) -> &Path {
        match self {
            VizBackend::Scene3d(path) | VizBackend::Animation2d(path) => path,
        }
    }
}

/// Pick the backend: 3D when its asset directory exists, 2D otherwise.
///
/// `assets` overrides the `PHASESIM_3D_ASSETS` environment variable when
/// given. This is the only missing-capability branch that does not abort.
pub fn select_backend(output_dir: &Path, assets: Option<&Path>) -> VizBackend {
    let assets_dir = assets
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(ASSETS_ENV).map(PathBuf::from));
    match assets_dir {
        Some(dir) if dir.is_dir() => {
            info!("3D visualization configured (assets: {})", dir.display());
            VizBackend::Scene3d(output_dir.join("visualization.json"))
        }
        Some(dir) => {
            warn!(
                "3D renderer assets not found at '{}', falling back to 2D animation",
                dir.display()
            );
            VizBackend::Animation2d(output_dir.join("animation.xml"))
        }
        None => {
            warn!("3D renderer not available, falling back to 2D animation");
            VizBackend::Animation2d(output_dir.join("animation.xml"))
        }
    }
}

#[derive(Serialize)]
struct SceneNode {
    label: String,
    model: &'static str,
    scale: f64,
    color: [u8; 3],
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct SceneLink {
    source: String,
    target: String,
}

#[derive(Serialize)]
struct SceneEvent {
    time_s: f64,
    participant: String,
    role: String,
    endpoint: String,
}

#[derive(Serialize)]
struct Scene {
    nodes: Vec<SceneNode>,
    links: Vec<SceneLink>,
    timeline: Vec<SceneEvent>,
}

fn node_decoration(participant: Participant) -> (&'static str, f64, [u8; 3]) {
    match participant.kind {
        NodeKind::Fixed => ("Cube.obj", 2.0, [255, 0, 0]),
        NodeKind::Mobile => ("Sphere.obj", 1.5, [0, 0, 255]),
    }
}

/// Write the derived topology and schedule with the selected backend.
pub fn write_scene(
    backend: &VizBackend,
    roster: &Roster,
    positions: &BTreeMap<Participant, Position>,
    registry: &EventRegistry,
) -> color_eyre::Result<()> {
    match backend {
        VizBackend::Scene3d(path) => write_scene_3d(path, roster, positions, registry),
        VizBackend::Animation2d(path) => write_animation_2d(path, roster, positions, registry),
    }
}

fn write_scene_3d(
    path: &Path,
    roster: &Roster,
    positions: &BTreeMap<Participant, Position>,
    registry: &EventRegistry,
) -> color_eyre::Result<()> {
    let nodes = roster
        .all_participants()
        .into_iter()
        .map(|p| {
            let (model, scale, color) = node_decoration(p);
            let position = positions.get(&p).copied().unwrap_or(Position { x: 0.0, y: 0.0 });
            SceneNode {
                label: p.label(),
                model,
                scale,
                color,
                x: position.x,
                y: position.y,
            }
        })
        .collect();
    let links = topology::all_edges(roster)
        .into_iter()
        .map(|edge| SceneLink {
            source: edge.source.label(),
            target: edge.target.label(),
        })
        .collect();
    let timeline = registry
        .events()
        .iter()
        .map(|event| SceneEvent {
            time_s: event.start.as_secs_f64(),
            participant: event.participant.label(),
            role: format!("{:?}", event.role),
            endpoint: event.endpoint.to_string(),
        })
        .collect();

    let scene = Scene {
        nodes,
        links,
        timeline,
    };
    let json = serde_json::to_string_pretty(&scene).wrap_err("Failed to serialize 3D scene")?;
    std::fs::write(path, json)
        .wrap_err_with(|| format!("Failed to write scene file '{}'", path.display()))?;
    info!("3D scene trace written to {}", path.display());
    Ok(())
}

fn write_animation_2d(
    path: &Path,
    roster: &Roster,
    positions: &BTreeMap<Participant, Position>,
    registry: &EventRegistry,
) -> color_eyre::Result<()> {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<animation>\n");
    for participant in roster.all_participants() {
        let (color, size) = match participant.kind {
            NodeKind::Fixed => ("255 0 0", 5.0),
            NodeKind::Mobile => ("0 0 255", 3.0),
        };
        let position = positions
            .get(&participant)
            .copied()
            .unwrap_or(Position { x: 0.0, y: 0.0 });
        xml.push_str(&format!(
            "  <node label=\"{}\" color=\"{}\" size=\"{}\" x=\"{:.1}\" y=\"{:.1}\"/>\n",
            participant, color, size, position.x, position.y
        ));
    }
    for edge in topology::all_edges(roster) {
        xml.push_str(&format!(
            "  <link source=\"{}\" target=\"{}\"/>\n",
            edge.source, edge.target
        ));
    }
    for event in registry.events() {
        xml.push_str(&format!(
            "  <event time=\"{:.3}\" participant=\"{}\" role=\"{:?}\" endpoint=\"{}\"/>\n",
            event.start.as_secs_f64(),
            event.participant,
            event.role,
            event.endpoint
        ));
    }
    xml.push_str("</animation>\n");

    std::fs::write(path, xml)
        .wrap_err_with(|| format!("Failed to write animation file '{}'", path.display()))?;
    info!("2D animation written to {}", path.display());
    Ok(())
}
