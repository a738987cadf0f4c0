//! Dependency injection container for the pong-rl application.
//!
//! The container owns infrastructure dependencies (the agent repository and
//! the default seed) and provides factory methods for agents, scripted
//! opponents and environments.

use std::{path::Path, sync::Arc};

use tracing::debug;

use super::config::{AgentSpec, ControllerSpec, GameConfig};
use crate::{
    Error, Result,
    adapters::MsgPackRepository,
    environment::{DualPaddleEnv, PhysicsConfig, SinglePaddleEnv, Side},
    pipeline::{
        TrackingOpponent,
        training::{ENV_SEED_OFFSET, LEFT_SEED_OFFSET, RIGHT_SEED_OFFSET},
    },
    ports::{Agent, AgentRepository},
    q_learning::{
        Hyperparameters, QLearningAgent, SarsaAgent, SavedTdAgent, TdAgent, TdAlgorithm,
        TrainingMetadata,
    },
    types::{Action, DiscreteState},
    utils::derive_seed,
};

/// Paddle controller built from a [`ControllerSpec`].
#[derive(Debug, Clone)]
pub enum Controller {
    Learner(TdAgent),
    Scripted(TrackingOpponent),
}

impl Controller {
    /// The learning agent, if this side has one.
    pub fn learner(&self) -> Option<&TdAgent> {
        match self {
            Controller::Learner(agent) => Some(agent),
            Controller::Scripted(_) => None,
        }
    }

    fn inner(&mut self) -> &mut dyn Agent {
        match self {
            Controller::Learner(agent) => agent,
            Controller::Scripted(opponent) => opponent,
        }
    }
}

impl Agent for Controller {
    fn choose_action(&mut self, state: &DiscreteState) -> Action {
        self.inner().choose_action(state)
    }

    fn choose_best_action(&mut self, state: &DiscreteState) -> Action {
        self.inner().choose_best_action(state)
    }

    fn observe(
        &mut self,
        state: &DiscreteState,
        action: Action,
        reward: f64,
        next_state: &DiscreteState,
    ) {
        self.inner().observe(state, action, reward, next_state);
    }

    fn on_episode_start(&mut self) {
        self.inner().on_episode_start();
    }

    fn decay_learning_rate(&mut self) {
        self.inner().decay_learning_rate();
    }

    fn name(&self) -> &str {
        match self {
            Controller::Learner(agent) => agent.name(),
            Controller::Scripted(opponent) => opponent.name(),
        }
    }

    fn is_learner(&self) -> bool {
        matches!(self, Controller::Learner(_))
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.inner().set_rng_seed(seed);
    }
}

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use pong_rl::app::App;
/// use pong_rl::q_learning::{Hyperparameters, TdAlgorithm};
///
/// let app = App::new();
/// let agent = app.create_agent(TdAlgorithm::QLearning, Hyperparameters::q_learning())?;
/// # Ok::<(), pong_rl::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use pong_rl::app::App;
/// use pong_rl::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for agent persistence
    agent_repository: Arc<dyn AgentRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults: [`MsgPackRepository`]
    /// and no default seed.
    pub fn new() -> Self {
        Self {
            agent_repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// The given seed, falling back to the container default.
    pub fn effective_seed(&self, seed: Option<u64>) -> Option<u64> {
        seed.or(self.default_seed)
    }

    /// Create a fresh TD agent with an empty table.
    ///
    /// The container's default seed, if any, seeds the agent's exploration.
    pub fn create_agent(
        &self,
        algorithm: TdAlgorithm,
        hyperparameters: Hyperparameters,
    ) -> Result<TdAgent> {
        let mut agent = match algorithm {
            TdAlgorithm::QLearning => TdAgent::QLearning(QLearningAgent::new(hyperparameters)?),
            TdAlgorithm::Sarsa => TdAgent::Sarsa(SarsaAgent::new(hyperparameters)?),
        };
        if let Some(seed) = self.default_seed {
            agent.set_rng_seed(seed);
        }
        Ok(agent)
    }

    /// Load an agent from persistent storage.
    ///
    /// The stored table, visit counts and schedule position are used as-is.
    pub fn load_agent(&self, path: &Path) -> Result<TdAgent> {
        let mut agent = self.load_saved(path)?.to_agent()?;
        if let Some(seed) = self.default_seed {
            agent.set_rng_seed(seed);
        }
        Ok(agent)
    }

    /// Load the raw snapshot, including its metadata.
    pub fn load_saved(&self, path: &Path) -> Result<SavedTdAgent> {
        self.agent_repository.load(path)
    }

    /// Save an agent to persistent storage.
    pub fn save_agent(
        &self,
        agent: &TdAgent,
        metadata: TrainingMetadata,
        path: &Path,
    ) -> Result<()> {
        let saved = SavedTdAgent::from_agent(agent, metadata);
        self.agent_repository.save(&saved, path)
    }

    /// Build the controller for one side of the court.
    ///
    /// Learners resume from `load` when a file is named; the stored
    /// algorithm must match the requested one. `seed` is the run seed, from
    /// which each side derives its own.
    pub fn build_controller(
        &self,
        spec: &ControllerSpec,
        side: Side,
        physics: &PhysicsConfig,
        seed: Option<u64>,
    ) -> Result<Controller> {
        let offset = match side {
            Side::Left => LEFT_SEED_OFFSET,
            Side::Right => RIGHT_SEED_OFFSET,
        };
        let side_seed = derive_seed(self.effective_seed(seed), offset);

        let mut controller = match spec {
            ControllerSpec::Scripted { difficulty } => {
                Controller::Scripted(TrackingOpponent::new(side, *difficulty, physics))
            }
            ControllerSpec::QLearning(agent_spec) => Controller::Learner(self.resume_or_create(
                TdAlgorithm::QLearning,
                agent_spec,
                Hyperparameters::q_learning(),
                side,
            )?),
            ControllerSpec::Sarsa(agent_spec) => Controller::Learner(self.resume_or_create(
                TdAlgorithm::Sarsa,
                agent_spec,
                Hyperparameters::sarsa(),
                side,
            )?),
        };

        if let Some(seed) = side_seed {
            controller.set_rng_seed(seed);
        }
        Ok(controller)
    }

    fn resume_or_create(
        &self,
        algorithm: TdAlgorithm,
        agent_spec: &AgentSpec,
        defaults: Hyperparameters,
        side: Side,
    ) -> Result<TdAgent> {
        let Some(path) = &agent_spec.load else {
            let params = agent_spec.resolve_hyperparameters(defaults);
            return self.create_agent(algorithm, params);
        };
        let saved = self.load_saved(path)?;
        if saved.algorithm != algorithm {
            return Err(Error::invalid_config(format!(
                "{path:?} holds a {} agent but the {side} side expects {algorithm}",
                saved.algorithm
            )));
        }
        debug!(?path, entries = saved.entries.len(), "resuming saved agent");
        saved.to_agent()
    }

    /// Build the single-paddle court described by `config`.
    pub fn single_environment(&self, config: &GameConfig) -> Result<SinglePaddleEnv> {
        let seed = derive_seed(self.effective_seed(config.training.seed), ENV_SEED_OFFSET);
        SinglePaddleEnv::new(config.physics, config.rewards, seed)
    }

    /// Build the dual-paddle court described by `config`.
    pub fn dual_environment(&self, config: &GameConfig) -> Result<DualPaddleEnv> {
        let seed = derive_seed(self.effective_seed(config.training.seed), ENV_SEED_OFFSET);
        DualPaddleEnv::new(config.physics, config.rewards, seed)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    agent_repository: Option<Arc<dyn AgentRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            agent_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom agent repository.
    pub fn with_repository<R: AgentRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.agent_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for everything the container builds.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app; without a repository, `MsgPackRepository` is used.
    pub fn build(self) -> App {
        App {
            agent_repository: self
                .agent_repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{
        adapters::InMemoryRepository,
        environment::Environment,
        pipeline::Difficulty,
    };

    fn state() -> DiscreteState {
        DiscreteState::new([3, 4, 1, 0, 5, 5])
    }

    #[test]
    fn test_app_creates_agent() {
        let app = App::new();
        let agent = app
            .create_agent(TdAlgorithm::Sarsa, Hyperparameters::sarsa())
            .unwrap();
        assert!(matches!(agent, TdAgent::Sarsa(_)));
        assert_eq!(agent.q_table().size(), 0);
    }

    #[test]
    fn test_invalid_hyperparameters_rejected() {
        let app = App::new();
        let params = Hyperparameters {
            gamma: 1.5,
            ..Hyperparameters::q_learning()
        };
        assert!(app.create_agent(TdAlgorithm::QLearning, params).is_err());
    }

    #[test]
    fn test_default_seed_makes_agents_reproducible() {
        let app = App::for_testing().with_default_seed(42).build();
        let mut a = app
            .create_agent(TdAlgorithm::QLearning, Hyperparameters::q_learning())
            .unwrap();
        let mut b = app
            .create_agent(TdAlgorithm::QLearning, Hyperparameters::q_learning())
            .unwrap();
        let first: Vec<Action> = (0..50).map(|_| a.choose_action(&state())).collect();
        let second: Vec<Action> = (0..50).map(|_| b.choose_action(&state())).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_and_load_through_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing().with_repository(repo.clone()).build();
        let mut agent = app
            .create_agent(TdAlgorithm::QLearning, Hyperparameters::q_learning())
            .unwrap();
        agent.observe(&state(), Action::MoveUp, 1.0, &state());

        let path = Path::new("left.msgpack");
        let metadata = TrainingMetadata {
            episodes_trained: Some(1),
            ..TrainingMetadata::default()
        };
        app.save_agent(&agent, metadata, path).unwrap();
        assert!(repo.contains(path));

        let loaded = app.load_agent(path).unwrap();
        assert_eq!(loaded.best_action(&state()), Action::MoveUp);
        assert_eq!(loaded.q_table().visit_count(&state(), Action::MoveUp), 1);
        assert_eq!(
            app.load_saved(path).unwrap().metadata.episodes_trained,
            Some(1)
        );
    }

    #[test]
    fn test_build_controller_rejects_mismatched_algorithm() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing().with_repository(repo).build();
        let agent = app
            .create_agent(TdAlgorithm::QLearning, Hyperparameters::q_learning())
            .unwrap();
        let path = PathBuf::from("q.msgpack");
        app.save_agent(&agent, TrainingMetadata::default(), &path)
            .unwrap();

        let spec = ControllerSpec::Sarsa(AgentSpec {
            load: Some(path),
            ..AgentSpec::default()
        });
        let err = app
            .build_controller(&spec, Side::Left, &PhysicsConfig::default(), Some(1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_build_scripted_controller() {
        let app = App::new();
        let spec = ControllerSpec::Scripted {
            difficulty: Difficulty::Hard,
        };
        let controller = app
            .build_controller(&spec, Side::Right, &PhysicsConfig::default(), None)
            .unwrap();
        assert!(!controller.is_learner());
        assert!(controller.learner().is_none());
        assert_eq!(controller.name(), "Tracking-hard");
        match controller {
            Controller::Scripted(opponent) => assert_eq!(opponent.difficulty(), Difficulty::Hard),
            Controller::Learner(_) => panic!("expected a scripted controller"),
        }
    }

    #[test]
    fn test_scripted_controller_forwards_episode_start() {
        let app = App::new();
        let spec = ControllerSpec::Scripted {
            difficulty: Difficulty::Medium,
        };
        let mut controller = app
            .build_controller(&spec, Side::Right, &PhysicsConfig::default(), Some(2))
            .unwrap();
        let high_ball = DiscreteState::new([8, 11, 1, 0, 4, 4]);
        let level_ball = DiscreteState::new([6, 5, 0, 0, 4, 4]);

        assert_eq!(controller.choose_action(&high_ball), Action::MoveUp);
        controller.on_episode_start();
        assert_eq!(controller.choose_action(&level_ball), Action::Stay);
    }

    #[test]
    fn test_environments_follow_run_seed() {
        let app = App::new();
        let config = GameConfig {
            training: crate::pipeline::TrainingConfig {
                seed: Some(5),
                ..Default::default()
            },
            ..GameConfig::default()
        };
        let mut a = app.single_environment(&config).unwrap();
        let mut b = app.single_environment(&config).unwrap();
        a.reset();
        b.reset();
        assert_eq!(a.continuous_state(), b.continuous_state());

        let mut c = app.dual_environment(&config).unwrap();
        let mut d = app.dual_environment(&config).unwrap();
        c.reset();
        d.reset();
        assert_eq!(c.continuous_state(), d.continuous_state());
    }
}
