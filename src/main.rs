use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use phasesim::config::{self, SimConfig};
use phasesim::endpoint::PortPlan;
use phasesim::engine::{Engine, InMemoryEngine};
use phasesim::event::Phase;
use phasesim::orchestrator::{collaboration, discovery};
use phasesim::registry::EventRegistry;
use phasesim::schedule::{PhasePlan, PhaseWindow};
use phasesim::topology::Roster;
use phasesim::viz;

/// Phase scheduling and neighbor topology engine for discrete-event network simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a simulation configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the plan, visualization, and trace files
    #[arg(short, long, default_value = "phasesim_output")]
    output: PathBuf,

    /// Number of fixed nodes
    #[arg(long)]
    num_fixed: Option<u32>,

    /// Number of mobile nodes
    #[arg(long)]
    num_mobile: Option<u32>,

    /// Total simulation time in seconds
    #[arg(long, allow_negative_numbers = true)]
    sim_time: Option<f64>,

    /// Distance between fixed nodes in meters
    #[arg(long)]
    distance: Option<f64>,

    /// Enable packet trace capture
    #[arg(long)]
    pcap: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Discovery phase duration in seconds
    #[arg(long, allow_negative_numbers = true)]
    discovery_duration: Option<f64>,

    /// Collaboration phase duration in seconds
    #[arg(long, allow_negative_numbers = true)]
    collab_duration: Option<f64>,

    /// Seed for mobile node placement in the built-in engine
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    ///
    /// Negative, NaN, or infinite duration flags are configuration errors,
    /// reported the same way a bad config file is.
    fn apply_to(&self, config: &mut SimConfig) -> Result<()> {
        if let Some(num_fixed) = self.num_fixed {
            config.num_fixed = num_fixed;
        }
        if let Some(num_mobile) = self.num_mobile {
            config.num_mobile = num_mobile;
        }
        if let Some(sim_time) = self.sim_time {
            config.sim_time = parse_secs("--sim-time", sim_time)?;
        }
        if let Some(distance) = self.distance {
            config.distance = distance;
        }
        if let Some(duration) = self.discovery_duration {
            config.discovery_duration = parse_secs("--discovery-duration", duration)?;
        }
        if let Some(duration) = self.collab_duration {
            config.collab_duration = parse_secs("--collab-duration", duration)?;
        }
        if self.pcap {
            config.enable_pcap = true;
        }
        if self.verbose {
            config.verbose = true;
        }
        Ok(())
    }
}

/// Convert a seconds flag to a `Duration`, rejecting values a `Duration`
/// cannot represent.
fn parse_secs(flag: &'static str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .wrap_err_with(|| format!("Invalid value for {flag}: {secs}"))
}

fn print_summary(config: &SimConfig) {
    println!("{}", "=".repeat(70));
    println!("Discovery and Collaboration Simulation");
    println!("{}", "=".repeat(70));
    println!("Fixed nodes: {}", config.num_fixed);
    println!("Mobile nodes: {}", config.num_mobile);
    println!("Total simulation time: {}s", config.sim_time.as_secs_f64());
    println!();
    println!("Phase timeline:");
    println!(
        "  Discovery:     {:.1}s - {:.1}s",
        config.discovery_start.as_secs_f64(),
        config.discovery_end().as_secs_f64()
    );
    println!(
        "  Collaboration: {:.1}s - {:.1}s",
        config.collab_start.as_secs_f64(),
        config.collab_end().as_secs_f64()
    );
    println!("{}", "=".repeat(70));
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration, then layer the command-line overrides on top
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => SimConfig::default(),
    };
    args.apply_to(&mut config)?;

    // Initialize logging with default filter level of "info"
    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Starting phasesim");
    info!("Output directory: {:?}", args.output);

    // All configuration errors surface here, before anything is scheduled
    config.validate().wrap_err("Invalid configuration")?;
    print_summary(&config);

    let roster = Roster::new(config.num_fixed, config.num_mobile)?;
    info!(
        "Created {} fixed and {} mobile participants",
        roster.num_fixed(),
        roster.num_mobile()
    );

    let phases = PhasePlan::new(
        PhaseWindow::new(config.discovery_start, config.discovery_duration, "discovery")?,
        PhaseWindow::new(config.collab_start, config.collab_duration, "collaboration")?,
    )?;
    let ports = PortPlan::new(config.discovery_port, config.collab_base_port, roster.len())?;

    let mut engine = InMemoryEngine::new(&roster, config.distance, args.seed);

    fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", args.output.display()))?;

    if config.enable_pcap {
        let trace_path = args.output.join("packets.trace");
        engine.enable_packet_trace(&trace_path)?;
        info!("Packet trace enabled: {:?}", trace_path);
    }

    // Derive the complete schedule before anything is handed to the engine
    let mut registry = EventRegistry::new();
    discovery::plan(
        &roster,
        &phases.discovery,
        config.discovery_spacing,
        config.discovery_interval,
        &ports,
        &engine,
        &mut registry,
    )
    .wrap_err("Failed to plan discovery phase")?;
    collaboration::plan(
        &roster,
        &phases.collaboration,
        config.collab_spacing,
        &ports,
        &engine,
        &mut registry,
    )
    .wrap_err("Failed to plan collaboration phase")?;

    let (discovery_servers, discovery_clients) = registry.phase_counts(Phase::Discovery);
    let (collab_servers, collab_clients) = registry.phase_counts(Phase::Collaboration);
    println!(
        "Discovery phase: {} receivers, {} broadcasters ({:.1}s - {:.1}s)",
        discovery_servers,
        discovery_clients,
        phases.discovery.start.as_secs_f64(),
        phases.discovery.end().as_secs_f64()
    );
    println!(
        "Collaboration phase: {} receivers, {} links ({:.1}s - {:.1}s)",
        collab_servers,
        collab_clients,
        phases.collaboration.start.as_secs_f64(),
        phases.collaboration.end().as_secs_f64()
    );

    // Write the plan for inspection and replay
    let plan_path = args.output.join("plan.json");
    registry.write_json(&plan_path)?;
    info!("Plan written to {:?}", plan_path);

    // Visualization backend is resolved once, here
    let backend = viz::select_backend(&args.output, None);
    viz::write_scene(&backend, &roster, engine.positions(), &registry)?;

    // Hand the complete schedule to the engine and run the event loop
    for event in registry.events() {
        engine.install(event)?;
    }
    println!("{}", "=".repeat(70));
    println!("Starting simulation...");
    let stats = engine.run(config.sim_time)?;
    println!("Simulation completed successfully!");
    println!("  - Scheduled events: {}", registry.len());
    println!("  - Packets sent: {}", stats.packets_sent);
    println!("  - Packets delivered: {}", stats.packets_delivered);
    println!("  - Bytes sent: {}", stats.bytes_sent);
    println!("  - Visualization: {:?}", backend.output_path());
    println!("{}", "=".repeat(70));

    Ok(())
}
