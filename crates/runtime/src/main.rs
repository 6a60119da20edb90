//! Headless training runner.
//!
//! Runs the DQN trainer over the Flappy world with no UI, logging one
//! line per episode, and optionally round-trips trainer snapshots as
//! JSON files.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use rl::{AgentConfig, FlappyEnv, ModelVariant, Pacer, RunControl, Snapshot, Trainer};
use sim::SimConfig;

#[derive(Parser, Debug)]
#[command(name = "fledge", about = "Train a DQN agent on the Flappy world")]
struct Cli {
    /// Episode iterations to run.
    #[arg(long, default_value_t = 200)]
    episodes: usize,

    /// Use one network for both action selection and bootstrap targets
    /// instead of keeping a frozen target copy.
    #[arg(long)]
    single: bool,

    /// Delay in milliseconds inserted after every simulation tick, for
    /// watching a run at human speed.
    #[arg(long)]
    pace_ms: Option<u64>,

    /// Seed for the world layout and the agent's RNG.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the initial exploration rate.
    #[arg(long)]
    epsilon: Option<f32>,

    /// Restore a JSON snapshot before training.
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a JSON snapshot here after training.
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Pacer that sleeps a fixed duration after every tick.
struct SleepPacer(Duration);

impl Pacer for SleepPacer {
    fn after_tick(&mut self) {
        std::thread::sleep(self.0);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let mut config = AgentConfig { seed: cli.seed, ..AgentConfig::default() };
    if let Some(epsilon) = cli.epsilon {
        config.epsilon = epsilon;
    }
    let variant = if cli.single {
        ModelVariant::Single
    } else {
        ModelVariant::Double
    };

    let env = FlappyEnv::new(SimConfig { seed: cli.seed, ..SimConfig::default() });
    let mut trainer = Trainer::new(env, variant, config);

    if let Some(path) = &cli.load {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        trainer
            .restore(&snapshot)
            .context("restoring snapshot")?;
        tracing::info!(
            episode = trainer.episode_index(),
            epsilon = trainer.epsilon(),
            "snapshot restored"
        );
    }

    let mut ctl = RunControl::default();
    if let Some(ms) = cli.pace_ms {
        ctl.pacer = Box::new(SleepPacer(Duration::from_millis(ms)));
    }

    tracing::info!(episodes = cli.episodes, double = !cli.single, "training");
    let report = trainer.train(cli.episodes, &mut ctl);
    tracing::info!(
        completed = report.completed,
        total_steps = trainer.total_steps(),
        "training finished"
    );
    if let Some(best) = trainer.stats().scores.iter().max() {
        tracing::info!(best_score = *best, "best episode score");
    }

    if let Some(path) = &cli.save {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let snapshot = trainer.snapshot(timestamp);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot saved");
    }

    Ok(())
}
