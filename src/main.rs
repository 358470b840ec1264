use anyhow::{Context, Result};
use autostrade::simulation::{SimConfig, Simulation, Snapshot};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "autostrade")]
#[command(about = "Concurrent road traffic simulation (headless)")]
struct Cli {
    /// Wall-clock seconds to run the simulation for
    #[arg(long, default_value = "10", value_parser = parse_seconds)]
    seconds: f64,

    /// Global speed multiplier (simulated time per wall-clock time)
    #[arg(long, default_value = "60")]
    speed: f64,

    /// Seed for spawn speeds and destinations
    #[arg(long)]
    seed: Option<u64>,

    /// Number of cities in the generated ring world
    #[arg(long, default_value = "6")]
    cities: usize,

    /// Start from a JSON snapshot instead of the generated world
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a JSON snapshot here once the run is over
    #[arg(long)]
    save: Option<PathBuf>,

    /// Seconds between two progress summaries
    #[arg(long, default_value = "2", value_parser = parse_seconds)]
    report_every: f64,
}

/// A finite, non-negative number of seconds
fn parse_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|err| format!("{value:?} is not a number: {err}"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("{value:?} is not a finite, non-negative duration"));
    }
    Ok(seconds)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,autostrade=info"),
    )
    .init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation without any front end
fn run_headless(cli: &Cli) -> Result<()> {
    let config = SimConfig {
        seed: cli.seed,
        ..SimConfig::default()
    }
    .with_speed(cli.speed);

    let world = match &cli.load {
        Some(path) => {
            let snapshot = Snapshot::load(path)?;
            let world = Simulation::from_snapshot(&snapshot, config)
                .with_context(|| format!("Failed to restore {}", path.display()))?;
            world.set_speed(cli.speed);
            world
        }
        None => Simulation::create_demo_world(config, cli.cities),
    };

    info!(
        "Running for {:.1}s at {:.1}x speed",
        cli.seconds, cli.speed
    );
    world.log_summary();
    world.start();

    let run_for = Duration::from_secs_f64(cli.seconds);
    let report_every = Duration::from_secs_f64(cli.report_every.max(0.1));
    let started = Instant::now();
    let mut next_report = started + report_every;
    while started.elapsed() < run_for {
        let now = Instant::now();
        let wake = next_report.min(started + run_for);
        thread::sleep(wake.saturating_duration_since(now));
        if Instant::now() >= next_report {
            info!("--- After {:.1}s ---", started.elapsed().as_secs_f64());
            world.log_summary();
            next_report += report_every;
        }
    }

    world.stop();

    let stats = world.stats();
    info!("=== SIMULATION COMPLETE ===");
    world.log_summary();
    info!("Vehicles in flight: {}", stats.in_flight());
    info!("Success rate: {:.1}%", stats.success_rate());

    if let Some(path) = &cli.save {
        world.snapshot().save(path)?;
        info!("Snapshot written to {}", path.display());
    }

    Ok(())
}
