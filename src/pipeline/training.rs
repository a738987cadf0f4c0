//! Training and testing loops for paddle agents

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    environment::{DualPaddleEnv, Environment, SinglePaddleEnv, StepInfo},
    ports::{Agent, Observer, Renderer},
    types::{Action, DiscreteState},
    utils::derive_seed,
};

/// Seed offsets for the components of one run.
pub const ENV_SEED_OFFSET: u64 = 0;
pub const LEFT_SEED_OFFSET: u64 = 1;
pub const RIGHT_SEED_OFFSET: u64 = 2;

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub episodes: usize,

    /// Truncate an episode after this many steps; `None` disables the ceiling
    pub max_steps_per_episode: Option<usize>,

    /// Run seed; when set, every run reseeds the agents from it
    pub seed: Option<u64>,

    /// Episodes between periodic progress log lines
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps_per_episode: Some(10_000),
            seed: None,
            log_interval: 100,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps_per_episode == Some(0) {
            return Err(Error::invalid_config(
                "max_steps_per_episode must be at least 1",
            ));
        }
        if self.log_interval == 0 {
            return Err(Error::invalid_config("log_interval must be at least 1"));
        }
        Ok(())
    }
}

/// Whether agents learn during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Exploring actions and learning updates
    Train,
    /// Greedy actions only, no learning
    Test,
}

/// Reward of one step or one whole episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeReward {
    Single(f64),
    Dual { left: f64, right: f64 },
}

impl EpisodeReward {
    /// Reward of the left paddle (the only paddle on a single court).
    pub fn left(&self) -> f64 {
        match *self {
            EpisodeReward::Single(reward) => reward,
            EpisodeReward::Dual { left, .. } => left,
        }
    }

    pub fn right(&self) -> Option<f64> {
        match *self {
            EpisodeReward::Single(_) => None,
            EpisodeReward::Dual { right, .. } => Some(right),
        }
    }
}

/// Outcome of one episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Episode index (0-based)
    pub episode: usize,
    /// Accumulated reward
    pub reward: EpisodeReward,
    /// Environment steps taken
    pub steps: usize,
    /// Stopped by the step ceiling rather than a miss
    pub truncated: bool,
    /// Hit counts at the end of the episode
    pub info: StepInfo,
}

/// One environment transition as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    pub episode: usize,
    /// Step index within the episode (0-based)
    pub step: usize,
    pub state: DiscreteState,
    pub left_action: Action,
    /// `None` on a single-paddle court
    pub right_action: Option<Action>,
    pub reward: EpisodeReward,
    pub next_state: DiscreteState,
    pub done: bool,
}

/// Result of a training or testing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub mode: RunMode,
    pub episodes: Vec<EpisodeResult>,
}

impl RunResult {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            episodes: Vec::new(),
        }
    }

    pub fn total_episodes(&self) -> usize {
        self.episodes.len()
    }

    /// Per-episode rewards of the left paddle, in episode order.
    pub fn left_rewards(&self) -> Vec<f64> {
        self.episodes.iter().map(|e| e.reward.left()).collect()
    }

    /// Per-episode rewards of the right paddle; empty for single-paddle runs.
    pub fn right_rewards(&self) -> Vec<f64> {
        self.episodes.iter().filter_map(|e| e.reward.right()).collect()
    }

    pub fn mean_left_reward(&self) -> f64 {
        mean(&self.left_rewards())
    }

    pub fn mean_right_reward(&self) -> Option<f64> {
        let rewards = self.right_rewards();
        (!rewards.is_empty()).then(|| mean(&rewards))
    }

    pub fn total_steps(&self) -> usize {
        self.episodes.iter().map(|e| e.steps).sum()
    }

    pub fn truncated_count(&self) -> usize {
        self.episodes.iter().filter(|e| e.truncated).count()
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Episode driver coupling environments and agents.
///
/// Environments and agents never call each other; every transition passes
/// through here. Errors from either side abort the run unmasked.
///
/// When [`TrainingConfig::seed`] is set, each training run reseeds the agents
/// from it (left at offset 1, right at offset 2) and testing runs reseed the
/// right controller. This replaces any seed the caller gave the agent, and a
/// second run on the same agent restarts its random stream. Leave the seed
/// unset to keep the agents' own generators.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    renderer: Option<Box<dyn Renderer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            renderer: None,
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Draw every step on the given surface
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Train one agent on a single-paddle court.
    pub fn train_single<A: Agent>(
        &mut self,
        env: &mut SinglePaddleEnv,
        agent: &mut A,
    ) -> Result<RunResult> {
        self.seed_agent(agent, LEFT_SEED_OFFSET);
        self.run_single(RunMode::Train, env, agent)
    }

    /// Greedy rollout on a single-paddle court, without learning.
    pub fn test_single<A: Agent>(
        &mut self,
        env: &mut SinglePaddleEnv,
        agent: &mut A,
    ) -> Result<RunResult> {
        self.run_single(RunMode::Test, env, agent)
    }

    /// Train two controllers against each other.
    ///
    /// Each side learns only from its own reward; scripted controllers simply
    /// ignore the transitions.
    pub fn train_dual<L: Agent, R: Agent>(
        &mut self,
        env: &mut DualPaddleEnv,
        left: &mut L,
        right: &mut R,
    ) -> Result<RunResult> {
        self.seed_agent(left, LEFT_SEED_OFFSET);
        self.seed_agent(right, RIGHT_SEED_OFFSET);
        self.run_dual(RunMode::Train, env, left, right)
    }

    /// Greedy rollout of two controllers, without learning.
    pub fn test_dual<L: Agent, R: Agent>(
        &mut self,
        env: &mut DualPaddleEnv,
        left: &mut L,
        right: &mut R,
    ) -> Result<RunResult> {
        self.seed_agent(right, RIGHT_SEED_OFFSET);
        self.run_dual(RunMode::Test, env, left, right)
    }

    fn seed_agent<A: Agent>(&self, agent: &mut A, offset: u64) {
        if let Some(seed) = derive_seed(self.config.seed, offset) {
            agent.set_rng_seed(seed);
        }
    }

    fn step_ceiling_reached(&self, steps: usize) -> bool {
        self.config
            .max_steps_per_episode
            .is_some_and(|max| steps >= max)
    }

    fn notify<F>(&mut self, mut event: F) -> Result<()>
    where
        F: FnMut(&mut dyn Observer) -> Result<()>,
    {
        for observer in &mut self.observers {
            event(observer.as_mut())?;
        }
        Ok(())
    }

    fn render<E: Environment>(&mut self, env: &E) -> Result<()> {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&env.frame())?;
        }
        Ok(())
    }

    fn start(&mut self, mode: RunMode, agents: &str) -> Result<()> {
        self.config.validate()?;
        info!(
            ?mode,
            episodes = self.config.episodes,
            max_steps = ?self.config.max_steps_per_episode,
            seed = ?self.config.seed,
            agents,
            "starting run"
        );
        let total = self.config.episodes;
        self.notify(|o| o.on_training_start(total))
    }

    fn finish(&mut self, result: &RunResult) -> Result<()> {
        self.notify(|o| o.on_training_end())?;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.close()?;
        }
        info!(
            mode = ?result.mode,
            episodes = result.total_episodes(),
            mean_left_reward = result.mean_left_reward(),
            mean_right_reward = ?result.mean_right_reward(),
            truncated = result.truncated_count(),
            "run finished"
        );
        Ok(())
    }

    fn end_episode(&mut self, result: EpisodeResult, run: &mut RunResult) -> Result<()> {
        debug!(
            episode = result.episode,
            steps = result.steps,
            left_reward = result.reward.left(),
            right_reward = ?result.reward.right(),
            truncated = result.truncated,
            "episode finished"
        );
        self.notify(|o| o.on_episode_end(&result))?;
        run.episodes.push(result);
        Ok(())
    }

    fn run_single<A: Agent>(
        &mut self,
        mode: RunMode,
        env: &mut SinglePaddleEnv,
        agent: &mut A,
    ) -> Result<RunResult> {
        self.start(mode, agent.name())?;
        let mut run = RunResult::new(mode);

        for episode in 0..self.config.episodes {
            let mut state = env.reset();
            agent.on_episode_start();
            self.notify(|o| o.on_episode_start(episode))?;

            let mut total = 0.0;
            let mut steps = 0;
            let mut truncated = false;
            let mut info = StepInfo::default();

            loop {
                if self.step_ceiling_reached(steps) {
                    truncated = true;
                    break;
                }

                let action = match mode {
                    RunMode::Train => agent.choose_action(&state),
                    RunMode::Test => agent.choose_best_action(&state),
                };
                let step = env.step(action)?;

                let event = StepEvent {
                    episode,
                    step: steps,
                    state,
                    left_action: action,
                    right_action: None,
                    reward: EpisodeReward::Single(step.reward),
                    next_state: step.state,
                    done: step.done,
                };
                self.notify(|o| o.on_step(&event))?;

                if mode == RunMode::Train {
                    agent.observe(&state, action, step.reward, &step.state);
                }

                total += step.reward;
                steps += 1;
                info = step.info;
                state = step.state;
                self.render(&*env)?;

                if step.done {
                    break;
                }
            }

            let result = EpisodeResult {
                episode,
                reward: EpisodeReward::Single(total),
                steps,
                truncated,
                info,
            };
            self.end_episode(result, &mut run)?;
        }

        self.finish(&run)?;
        Ok(run)
    }

    fn run_dual<L: Agent, R: Agent>(
        &mut self,
        mode: RunMode,
        env: &mut DualPaddleEnv,
        left: &mut L,
        right: &mut R,
    ) -> Result<RunResult> {
        let agents = format!("{} vs {}", left.name(), right.name());
        self.start(mode, &agents)?;
        let mut run = RunResult::new(mode);

        for episode in 0..self.config.episodes {
            let mut state = env.reset();
            left.on_episode_start();
            right.on_episode_start();
            self.notify(|o| o.on_episode_start(episode))?;

            let (mut left_total, mut right_total) = (0.0, 0.0);
            let mut steps = 0;
            let mut truncated = false;
            let mut info = StepInfo::default();

            loop {
                if self.step_ceiling_reached(steps) {
                    truncated = true;
                    break;
                }

                let actions = match mode {
                    RunMode::Train => (left.choose_action(&state), right.choose_action(&state)),
                    RunMode::Test => (
                        left.choose_best_action(&state),
                        right.choose_best_action(&state),
                    ),
                };
                let step = env.step(actions)?;
                let (left_reward, right_reward) = step.reward;

                let event = StepEvent {
                    episode,
                    step: steps,
                    state,
                    left_action: actions.0,
                    right_action: Some(actions.1),
                    reward: EpisodeReward::Dual {
                        left: left_reward,
                        right: right_reward,
                    },
                    next_state: step.state,
                    done: step.done,
                };
                self.notify(|o| o.on_step(&event))?;

                if mode == RunMode::Train {
                    left.observe(&state, actions.0, left_reward, &step.state);
                    right.observe(&state, actions.1, right_reward, &step.state);
                }

                left_total += left_reward;
                right_total += right_reward;
                steps += 1;
                info = step.info;
                state = step.state;
                self.render(&*env)?;

                if step.done {
                    break;
                }
            }

            let result = EpisodeResult {
                episode,
                reward: EpisodeReward::Dual {
                    left: left_total,
                    right: right_total,
                },
                steps,
                truncated,
                info,
            };
            self.end_episode(result, &mut run)?;
        }

        self.finish(&run)?;
        Ok(run)
    }
}
