//! Subcommands of the `pong-rl` binary.
//!
//! `train` and `test` share [`GameArgs`]: a TOML file supplies the base
//! configuration and flags override individual values.

pub mod inspect;
pub mod train;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::{
    adapters::AsciiRenderer,
    app::{App, Controller, ControllerSpec, GameConfig, Mode},
    environment::Side,
    pipeline::{
        CsvRewardObserver, LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver,
        RunMode, RunResult, TrainingPipeline,
    },
};

/// Options shared by `train` and `test`.
#[derive(Args, Debug, Clone, Default)]
pub struct GameArgs {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Court layout (single or dual)
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Left paddle controller (q-learning, sarsa, easy, medium, hard)
    #[arg(long)]
    pub left: Option<String>,

    /// Right paddle controller, dual mode only
    #[arg(long)]
    pub right: Option<String>,

    /// Number of episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Truncate episodes after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Let episodes run until a miss, however long
    #[arg(long, conflicts_with = "max_steps")]
    pub no_step_limit: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Load the left agent from this file
    #[arg(long)]
    pub load_left: Option<PathBuf>,

    /// Load the right agent from this file
    #[arg(long)]
    pub load_right: Option<PathBuf>,

    /// Write per-episode rewards as CSV
    #[arg(long)]
    pub rewards_csv: Option<PathBuf>,

    /// Write the full run result as JSON
    #[arg(long)]
    pub result: Option<PathBuf>,

    /// Draw every step in the terminal
    #[arg(long)]
    pub render: bool,

    /// Delay between rendered frames in milliseconds
    #[arg(long, default_value_t = 30)]
    pub frame_delay_ms: u64,

    /// Disable the progress bar and log periodic summaries instead
    #[arg(long)]
    pub no_progress: bool,
}

impl GameArgs {
    /// Load the configuration file (or defaults) and apply flag overrides.
    pub fn resolve(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(name) = &self.left {
            config.left = replace_controller(&config.left, name)?;
        }
        if let Some(name) = &self.right {
            config.right = replace_controller(&config.right, name)?;
        }
        if let Some(episodes) = self.episodes {
            config.training.episodes = episodes;
        }
        if let Some(max_steps) = self.max_steps {
            config.training.max_steps_per_episode = Some(max_steps);
        }
        if self.no_step_limit {
            config.training.max_steps_per_episode = None;
        }
        if self.seed.is_some() {
            config.training.seed = self.seed;
        }
        for (side, path) in [(Side::Left, &self.load_left), (Side::Right, &self.load_right)] {
            let Some(path) = path else { continue };
            let spec = match side {
                Side::Left => &mut config.left,
                Side::Right => &mut config.right,
            };
            match spec.agent_spec_mut() {
                Some(agent) => agent.load = Some(path.clone()),
                None => bail!("--load-{side} given but the {side} paddle is scripted"),
            }
        }
        if self.rewards_csv.is_some() {
            config.output.rewards_csv = self.rewards_csv.clone();
        }
        if self.result.is_some() {
            config.output.run_result = self.result.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Swap the controller kind, keeping load/save paths and explicit
/// hyperparameters when the algorithm stays the same.
fn replace_controller(current: &ControllerSpec, name: &str) -> Result<ControllerSpec> {
    let mut next = ControllerSpec::parse_name(name)?;
    if next.algorithm() == current.algorithm()
        && let (Some(target), Some(existing)) = (next.agent_spec_mut(), current.agent_spec())
    {
        *target = existing.clone();
    }
    Ok(next)
}

/// Controllers and outcome of one run.
pub struct GameOutcome {
    pub result: RunResult,
    pub metrics: MetricsSummary,
    pub left: Controller,
    /// `None` in single mode
    pub right: Option<Controller>,
}

/// Build everything `config` describes and play it in `mode`.
pub fn run_game(
    app: &App,
    config: &GameConfig,
    run_mode: RunMode,
    args: &GameArgs,
) -> Result<GameOutcome> {
    let seed = config.training.seed;
    let mut left = app.build_controller(&config.left, Side::Left, &config.physics, seed)?;

    let metrics = MetricsObserver::new();
    let mut pipeline = TrainingPipeline::new(config.training.clone())
        .with_observer(Box::new(metrics.clone()));
    if args.no_progress || args.render {
        let logging = LoggingObserver::new(config.training.log_interval);
        pipeline = pipeline.with_observer(Box::new(logging));
    } else {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &config.output.rewards_csv {
        let observer = CsvRewardObserver::new(path)
            .with_context(|| format!("creating {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }
    if args.render {
        let renderer = AsciiRenderer::stdout(60, 20)
            .with_frame_delay(Duration::from_millis(args.frame_delay_ms));
        pipeline = pipeline.with_renderer(Box::new(renderer));
    }

    let (result, right) = match config.mode {
        Mode::Single => {
            let mut env = app.single_environment(config)?;
            let result = match run_mode {
                RunMode::Train => pipeline.train_single(&mut env, &mut left)?,
                RunMode::Test => pipeline.test_single(&mut env, &mut left)?,
            };
            (result, None)
        }
        Mode::Dual => {
            let mut right =
                app.build_controller(&config.right, Side::Right, &config.physics, seed)?;
            let mut env = app.dual_environment(config)?;
            let result = match run_mode {
                RunMode::Train => pipeline.train_dual(&mut env, &mut left, &mut right)?,
                RunMode::Test => pipeline.test_dual(&mut env, &mut left, &mut right)?,
            };
            (result, Some(right))
        }
    };

    if let Some(path) = &config.output.run_result {
        result
            .save(path)
            .with_context(|| format!("writing run result to {}", path.display()))?;
    }

    Ok(GameOutcome {
        result,
        metrics: metrics.summary(),
        left,
        right,
    })
}
