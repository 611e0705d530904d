//! Headless Ironclad driver.
//!
//! Plays one round context with the scripted [`autopilot::Autopilot`] and
//! prints a JSON summary. Useful for soak runs, replays by seed and
//! profiling without a renderer.
//!
//! ```text
//! RUST_LOG=ironclad_core=debug ironclad-headless --seed 7 --ticks 20000 --mode rescue
//! ```

mod autopilot;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ironclad_core::persistence::{NoopNavigator, ScoreWindow};
use ironclad_core::{GameConfig, GameEvent, GameMode, Services, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::autopilot::Autopilot;

#[derive(Parser, Debug)]
#[command(name = "ironclad-headless")]
#[command(about = "Run Ironclad rounds headless with a scripted autopilot")]
struct Cli {
    /// RNG seed for the round
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,
    /// Milliseconds per tick
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Ruleset
    #[arg(long, value_enum, default_value_t = CliMode::Endless)]
    mode: CliMode,
    /// JSON configuration overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ticks between fire presses
    #[arg(long, default_value_t = 12)]
    fire_every: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    Endless,
    Rescue,
}

impl From<CliMode> for GameMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Endless => Self::Endless,
            CliMode::Rescue => Self::Rescue,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: u64,
    mode: String,
    ticks: u64,
    sim_ms: u64,
    state: String,
    score: u64,
    best_score: u64,
    rank: String,
    military_rank: String,
    deaths: u64,
    kills: u64,
    boxes_destroyed: u64,
    rescues: u64,
    shots_fired: u64,
    promotions: u64,
    spawn_skips: u64,
    daily_best: Option<u64>,
    events: u64,
}

impl Summary {
    fn record(&mut self, event: &GameEvent) {
        self.events += 1;
        match event {
            GameEvent::TankDestroyed { .. } => self.deaths += 1,
            GameEvent::EnemyDestroyed { .. } => self.kills += 1,
            GameEvent::BoxDestroyed { .. } => self.boxes_destroyed += 1,
            GameEvent::Rescued { .. } => self.rescues += 1,
            GameEvent::ProjectileFired { .. } => self.shots_fired += 1,
            GameEvent::Promotion { .. } => self.promotions += 1,
            GameEvent::SpawnSkipped { .. } => self.spawn_skips += 1,
            _ => {}
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GameConfig::from_json_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    config.mode = cli.mode.into();
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut summary = Summary {
        seed: cli.seed,
        mode: format!("{:?}", config.mode),
        ..Summary::default()
    };
    let mut world =
        World::new(config, cli.seed, Services::in_memory()).context("building round context")?;
    let mut pilot = Autopilot::new(cli.fire_every);

    info!(seed = cli.seed, ticks = cli.ticks, mode = %summary.mode, "headless run starting");
    for tick in 0..cli.ticks {
        let decision = pilot.decide(&world);
        if let Some(edge) = decision.fire {
            world.fire_edge(edge);
        }
        world.step(cli.tick_ms, decision.stick);
        for event in world.drain_events() {
            summary.record(&event);
        }
        if tick % 1_000 == 0 {
            debug!(tick, score = world.score(), state = %world.state(), "progress");
        }
    }

    summary.ticks = world.tick();
    summary.sim_ms = world.now().as_millis();
    summary.state = world.state().to_string();
    summary.score = world.score();
    summary.best_score = world.best_score();
    summary.rank = world.rank().to_string();
    summary.military_rank = world.military_rank().to_string();

    world.return_to_menu(&mut NoopNavigator);
    for event in world.drain_events() {
        summary.record(&event);
    }

    let mut services = world.into_services();
    let now_ms = services.clock.now_epoch_ms();
    summary.daily_best = services
        .archive
        .best(ScoreWindow::Daily, now_ms)
        .context("reading daily best")?
        .map(|record| record.score);

    info!(
        score = summary.score,
        best = summary.best_score,
        deaths = summary.deaths,
        "headless run finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
