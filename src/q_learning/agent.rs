//! Q-learning and SARSA agents
//!
//! Both agents share epsilon-greedy selection, the visit-count-adjusted
//! learning rate and the global learning-rate decay. They differ only in
//! the value they bootstrap from at the successor state.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::Agent,
    q_learning::{
        q_table::{QTable, TableEntry},
        schedule::{Hyperparameters, LearningSchedule},
    },
    types::{Action, DiscreteState},
    utils::build_rng,
};

/// Persistable part of a TD agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TdAgentState {
    pub hyperparameters: Hyperparameters,
    pub alpha: f64,
    pub steps_done: u64,
    pub entries: Vec<TableEntry>,
    pub rng_seed: Option<u64>,
}

/// State and selection logic shared by both TD agents.
#[derive(Debug, Clone)]
struct TdCore {
    q_table: QTable,
    schedule: LearningSchedule,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl TdCore {
    fn new(params: Hyperparameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            schedule: LearningSchedule::new(params),
            rng: build_rng(None),
            rng_seed: None,
        })
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// ε-greedy action selection
    fn select_action_epsilon_greedy(&mut self, state: &DiscreteState) -> Action {
        let epsilon = self.schedule.next_epsilon();
        if self.rng.random::<f64>() < epsilon {
            // Explore: random action
            Action::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Action::Stay)
        } else {
            // Exploit: greedy action based on Q-values
            self.q_table.greedy_action(state)
        }
    }

    /// Count the visit and return the learning rate for this pair.
    fn visit(&mut self, state: DiscreteState, action: Action) -> f64 {
        let visits = self.q_table.record_visit(state, action);
        self.schedule.adjusted_alpha(visits)
    }

    fn export_state(&self) -> TdAgentState {
        TdAgentState {
            hyperparameters: *self.schedule.params(),
            alpha: self.schedule.alpha(),
            steps_done: self.schedule.steps_done(),
            entries: self.q_table.entries(),
            rng_seed: self.rng_seed,
        }
    }

    fn from_state(state: TdAgentState) -> Result<Self> {
        state.hyperparameters.validate()?;
        Ok(Self {
            q_table: QTable::from_entries(state.entries),
            schedule: LearningSchedule::resume(state.hyperparameters, state.alpha, state.steps_done),
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        })
    }

    fn reset(&mut self) {
        self.q_table.reset();
        self.schedule.restart();
        self.rng = build_rng(self.rng_seed);
    }
}

macro_rules! td_agent_accessors {
    ($agent:ty) => {
        impl $agent {
            pub fn with_seed(mut self, seed: u64) -> Self {
                self.core.reseed(seed);
                self
            }

            /// Greedy action without touching any state.
            pub fn best_action(&self, state: &DiscreteState) -> Action {
                self.core.q_table.greedy_action(state)
            }

            pub fn q_table(&self) -> &QTable {
                &self.core.q_table
            }

            pub fn schedule(&self) -> &LearningSchedule {
                &self.core.schedule
            }

            pub fn hyperparameters(&self) -> &Hyperparameters {
                self.core.schedule.params()
            }

            /// Current effective exploration rate.
            pub fn epsilon(&self) -> f64 {
                self.core.schedule.epsilon()
            }

            pub fn q_table_size(&self) -> usize {
                self.core.q_table.size()
            }

            /// Clear learned values and restart both schedules.
            pub fn reset(&mut self) {
                self.core.reset();
            }

            pub(crate) fn export_state(&self) -> TdAgentState {
                self.core.export_state()
            }

            pub(crate) fn from_state(state: TdAgentState) -> Result<Self> {
                Ok(Self {
                    core: TdCore::from_state(state)?,
                })
            }
        }
    };
}

/// Q-learning agent (off-policy TD control)
///
/// Learns the optimal Q* function by always updating toward the maximum
/// next-state value, regardless of the action actually taken next.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    core: TdCore,
}

impl QLearningAgent {
    /// Create a new Q-learning agent with an entropy-seeded random source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the hyperparameters
    /// fail validation.
    pub fn new(params: Hyperparameters) -> Result<Self> {
        Ok(Self {
            core: TdCore::new(params)?,
        })
    }
}

td_agent_accessors!(QLearningAgent);

impl Agent for QLearningAgent {
    fn choose_action(&mut self, state: &DiscreteState) -> Action {
        self.core.select_action_epsilon_greedy(state)
    }

    fn choose_best_action(&mut self, state: &DiscreteState) -> Action {
        self.best_action(state)
    }

    fn observe(
        &mut self,
        state: &DiscreteState,
        action: Action,
        reward: f64,
        next_state: &DiscreteState,
    ) {
        let alpha = self.core.visit(*state, action);
        let target = reward + self.core.schedule.gamma() * self.core.q_table.max_q(next_state);
        self.core.q_table.update(*state, action, alpha, target);
        self.decay_learning_rate();
    }

    fn decay_learning_rate(&mut self) {
        self.core.schedule.decay_alpha();
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn is_learner(&self) -> bool {
        true
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.core.reseed(seed);
    }
}

/// SARSA agent (on-policy TD control)
///
/// Learns Q^π for the policy it follows, exploration included. The
/// successor action is drawn from the current ε-greedy policy inside
/// [`Agent::observe`], which also advances the exploration counter.
#[derive(Debug, Clone)]
pub struct SarsaAgent {
    core: TdCore,
}

impl SarsaAgent {
    /// Create a new SARSA agent with an entropy-seeded random source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the hyperparameters
    /// fail validation.
    pub fn new(params: Hyperparameters) -> Result<Self> {
        Ok(Self {
            core: TdCore::new(params)?,
        })
    }
}

td_agent_accessors!(SarsaAgent);

impl Agent for SarsaAgent {
    fn choose_action(&mut self, state: &DiscreteState) -> Action {
        self.core.select_action_epsilon_greedy(state)
    }

    fn choose_best_action(&mut self, state: &DiscreteState) -> Action {
        self.best_action(state)
    }

    fn observe(
        &mut self,
        state: &DiscreteState,
        action: Action,
        reward: f64,
        next_state: &DiscreteState,
    ) {
        let alpha = self.core.visit(*state, action);
        let next_action = self.choose_action(next_state);
        let target =
            reward + self.core.schedule.gamma() * self.core.q_table.get(next_state, next_action);
        self.core.q_table.update(*state, action, alpha, target);
        self.decay_learning_rate();
    }

    fn decay_learning_rate(&mut self) {
        self.core.schedule.decay_alpha();
    }

    fn name(&self) -> &str {
        "SARSA"
    }

    fn is_learner(&self) -> bool {
        true
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.core.reseed(seed);
    }
}

/// Either TD learner, for code that picks the algorithm at runtime.
#[derive(Debug, Clone)]
pub enum TdAgent {
    QLearning(QLearningAgent),
    Sarsa(SarsaAgent),
}

impl TdAgent {
    pub fn best_action(&self, state: &DiscreteState) -> Action {
        match self {
            TdAgent::QLearning(agent) => agent.best_action(state),
            TdAgent::Sarsa(agent) => agent.best_action(state),
        }
    }

    pub fn q_table(&self) -> &QTable {
        match self {
            TdAgent::QLearning(agent) => agent.q_table(),
            TdAgent::Sarsa(agent) => agent.q_table(),
        }
    }

    pub fn schedule(&self) -> &LearningSchedule {
        match self {
            TdAgent::QLearning(agent) => agent.schedule(),
            TdAgent::Sarsa(agent) => agent.schedule(),
        }
    }

    fn inner(&mut self) -> &mut dyn Agent {
        match self {
            TdAgent::QLearning(agent) => agent,
            TdAgent::Sarsa(agent) => agent,
        }
    }
}

impl Agent for TdAgent {
    fn choose_action(&mut self, state: &DiscreteState) -> Action {
        self.inner().choose_action(state)
    }

    fn choose_best_action(&mut self, state: &DiscreteState) -> Action {
        self.best_action(state)
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
            TdAgent::QLearning(agent) => agent.name(),
            TdAgent::Sarsa(agent) => agent.name(),
        }
    }

    fn is_learner(&self) -> bool {
        true
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.inner().set_rng_seed(seed);
    }
}

impl From<QLearningAgent> for TdAgent {
    fn from(agent: QLearningAgent) -> Self {
        TdAgent::QLearning(agent)
    }
}

impl From<SarsaAgent> for TdAgent {
    fn from(agent: SarsaAgent) -> Self {
        TdAgent::Sarsa(agent)
    }
}
