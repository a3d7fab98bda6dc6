use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stillone_app::{RunOptions, load_config, run, write_report};
use stillone_core::EcosystemWorld;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "stillone",
    version,
    about = "Run the Still One follower/pursuer ecosystem headless"
)]
struct Cli {
    /// JSON configuration file. Missing fields take their defaults.
    #[arg(long, env = "STILLONE_CONFIG")]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Fixed time step per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Override the configured RNG seed.
    #[arg(long, env = "STILLONE_SEED")]
    seed: Option<u64>,
    /// Progress log interval in ticks (0 disables).
    #[arg(long, default_value_t = 600)]
    log_every: u64,
    /// Write the run report here instead of stdout.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Include every entity's final state in the report.
    #[arg(long)]
    snapshot: bool,
    /// Tick at which every pursuer stands still (repeatable).
    #[arg(long = "still-at")]
    still_at: Vec<u64>,
    /// Tick at which every pursuer begins its ritual (repeatable).
    #[arg(long = "ritual-at")]
    ritual_at: Vec<u64>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.rng_seed = Some(seed);
    }
    let mut world = EcosystemWorld::new(config).context("failed to build world")?;
    info!(ticks = cli.ticks, dt = cli.dt, "starting headless run");

    let options = RunOptions {
        ticks: cli.ticks,
        dt: cli.dt,
        log_every: cli.log_every,
        include_snapshot: cli.snapshot,
        still_at: cli.still_at,
        ritual_at: cli.ritual_at,
    };
    let report = run(&mut world, &options)?;
    info!(
        births = report.totals.births,
        deaths = report.totals.deaths,
        splits = report.totals.splits,
        peak_followers = report.peak_followers,
        "run complete"
    );

    match cli.report {
        Some(path) => write_report(&path, &report)?,
        None => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialise report")?
        ),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
