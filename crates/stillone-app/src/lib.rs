//! Headless runner for the Still One ecosystem: configuration loading, the
//! fixed-step run loop and the JSON run report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use stillone_core::{
    ControlCommand, EcosystemConfig, EcosystemWorld, PursuerId, TickSummary, WorldSnapshot,
    apply_control_command,
};
use tracing::{debug, info};

/// Read a JSON configuration. Absent fields keep their defaults; no path
/// means an all-default configuration.
pub fn load_config(path: Option<&Path>) -> Result<EcosystemConfig> {
    let Some(path) = path else {
        return Ok(EcosystemConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: EcosystemConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Parameters of one headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub ticks: u64,
    pub dt: f32,
    /// Emit a progress line every this many ticks; zero disables it.
    pub log_every: u64,
    /// Include a full entity snapshot in the report.
    pub include_snapshot: bool,
    /// Ticks at which every pursuer is told to stand still.
    pub still_at: Vec<u64>,
    /// Ticks at which every pursuer begins its ritual.
    pub ritual_at: Vec<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 3_600,
            dt: 1.0 / 60.0,
            log_every: 600,
            include_snapshot: false,
            still_at: Vec::new(),
            ritual_at: Vec::new(),
        }
    }
}

/// Event totals across a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunTotals {
    pub births: usize,
    pub deaths: usize,
    pub splits: usize,
    pub signs_dissolved: usize,
}

impl RunTotals {
    fn absorb(&mut self, summary: &TickSummary) {
        self.births += summary.births;
        self.deaths += summary.deaths;
        self.splits += summary.splits;
        self.signs_dissolved += summary.signs_dissolved;
    }
}

/// What a run produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub ticks: u64,
    pub dt: f32,
    pub totals: RunTotals,
    pub peak_followers: usize,
    pub last: Option<TickSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<WorldSnapshot>,
}

fn command_all_pursuers(
    world: &mut EcosystemWorld,
    make: fn(PursuerId) -> ControlCommand,
) -> Result<()> {
    let ids: Vec<PursuerId> = world.pursuers().map(|(id, _)| id).collect();
    for id in ids {
        apply_control_command(world, make(id)).context("control command rejected")?;
    }
    Ok(())
}

/// Step `world` for `options.ticks` ticks at a fixed delta.
pub fn run(world: &mut EcosystemWorld, options: &RunOptions) -> Result<RunReport> {
    if !options.dt.is_finite() || options.dt <= 0.0 {
        bail!("time step must be positive and finite, got {}", options.dt);
    }

    let mut totals = RunTotals::default();
    let mut peak_followers = world.population().follower_count();
    let mut last = None;
    for _ in 0..options.ticks {
        let tick = world.tick().0;
        if options.still_at.contains(&tick) {
            command_all_pursuers(world, ControlCommand::StillPursuer)?;
        }
        if options.ritual_at.contains(&tick) {
            command_all_pursuers(world, ControlCommand::BeginRitual)?;
        }

        let summary = world.step(options.dt);
        totals.absorb(&summary);
        peak_followers = peak_followers.max(summary.followers);
        if options.log_every > 0 && summary.tick.0.is_multiple_of(options.log_every) {
            info!(
                tick = summary.tick.0,
                followers = summary.followers,
                signs = summary.signs,
                pursuers = summary.pursuers,
                births = totals.births,
                deaths = totals.deaths,
                "progress"
            );
        }
        last = Some(summary);
    }

    Ok(RunReport {
        ticks: options.ticks,
        dt: options.dt,
        totals,
        peak_followers,
        last,
        snapshot: options.include_snapshot.then(|| world.snapshot()),
    })
}

/// Write `report` as pretty JSON.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialise report")?;
    fs::write(path, json).with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(())
}
