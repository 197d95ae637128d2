//! # Cabinet Guard Station Binary
//!
//! Loads the station configuration, plays a scenario through the simulation
//! adapters and drives the decision core at a fixed tick rate.
//!
//! # Usage
//!
//! ```bash
//! # Run with the shipped sample configuration
//! guard_station --config config/guard.toml --scenario config/scenario.toml
//!
//! # Bounded run, verbose JSON logs
//! guard_station -c config/guard.toml --scenario config/scenario.toml --ticks 200 -v --json
//! ```

use clap::Parser;
use guard_common::config::{ConfigError, GuardConfig, LogLevel};
use guard_common::consts::DEFAULT_CONFIG_PATH;
use guard_station::clock::MonotonicClock;
use guard_station::drivers::simulation;
use guard_station::runtime::GuardRuntime;
use guard_station::sinks::TracingSink;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Cabinet guard station - range/vision fusion with fail-safe output
#[derive(Parser, Debug)]
#[command(name = "guard_station")]
#[command(version)]
#[command(about = "Cabinet guard station: fuses range and vision into a fail-safe output")]
#[command(long_about = None)]
struct Args {
    /// Path to the station configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scenario played back by the simulation adapters.
    #[arg(long, value_name = "FILE")]
    scenario: PathBuf,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("station startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging is seeded from the config file, so load it first and report
    // a failure once the subscriber exists.
    let loaded = GuardConfig::load_validated(&args.config);
    let level = loaded
        .as_ref()
        .map_or(LogLevel::Info, |c| c.shared.log_level);
    setup_tracing(&args, level);

    info!("Cabinet guard station v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = loaded.map_err(|e: ConfigError| {
        error!(path = %args.config.display(), "configuration rejected: {e}");
        e
    })?;
    info!(
        service = %config.shared.service_name,
        cabinets = config.cabinets.len(),
        authorized = ?config.site.authorized_cabinets,
        "configuration loaded"
    );

    let clock = MonotonicClock::new();
    let (range, vision) = simulation::from_scenario_file(&args.scenario, clock)?;
    let mut runtime = GuardRuntime::new(config, clock)?;

    let running = runtime.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let mut sink = TracingSink::new();
    let summary = runtime.run(Box::new(range), Box::new(vision), &mut sink, args.ticks)?;

    info!(
        ticks = summary.ticks,
        faulted = summary.faulted_ticks,
        enabled = summary.enabled_ticks,
        transitions = summary.transitions,
        records = summary.records,
        final_state = %runtime.engine().safety_state(),
        "Cabinet guard station shutdown complete"
    );
    Ok(())
}

/// Setup tracing subscriber from CLI flags and the configured level.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug and the
/// configured level applies.
fn setup_tracing(args: &Args, level: LogLevel) {
    let default = if args.verbose {
        LogLevel::Debug.as_str()
    } else {
        level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
