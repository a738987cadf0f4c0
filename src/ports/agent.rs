//! Agent port - abstraction over paddle controllers
//!
//! This port defines the interface that every paddle controller implements,
//! allowing the training loop to drive:
//! - Off-policy TD learners (Q-learning)
//! - On-policy TD learners (SARSA)
//! - Scripted opponents that track the ball

use crate::types::{Action, DiscreteState};

/// Agent trait - unified interface for paddle controllers
///
/// # Design Philosophy
///
/// This trait represents a **port** in hexagonal architecture. The training
/// loop only talks to agents through it, and agents never see the
/// environment directly: they receive discretized states and transitions.
///
/// Dispatch is static. Pipelines are generic over `A: Agent`, and the
/// persisted learners are grouped in the [`crate::q_learning::TdAgent`] enum.
///
/// # Examples
///
/// ```no_run
/// use pong_rl::{ports::Agent, types::DiscreteState};
///
/// fn rollout<A: Agent>(agent: &mut A, states: &[DiscreteState]) {
///     for state in states {
///         let _ = agent.choose_best_action(state);
///     }
/// }
/// ```
pub trait Agent: Send {
    /// Select an action while training.
    ///
    /// Learners explore here; every call advances their exploration step
    /// counter.
    fn choose_action(&mut self, state: &DiscreteState) -> Action;

    /// Select the action the agent currently believes is best.
    ///
    /// Used for testing rollouts. Takes `&mut self` so scripted controllers
    /// can keep their own randomness; learners do not mutate anything here.
    fn choose_best_action(&mut self, state: &DiscreteState) -> Action;

    /// Learn from one transition `(s, a, r, s')`.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for scripted controllers.
    fn observe(
        &mut self,
        _state: &DiscreteState,
        _action: Action,
        _reward: f64,
        _next_state: &DiscreteState,
    ) {
    }

    /// Called after the environment is reset, before the first action of an
    /// episode.
    ///
    /// Controllers that remember earlier steps clear that memory here.
    fn on_episode_start(&mut self) {}

    /// Apply one step of the global learning-rate decay.
    ///
    /// Learners already call this at the end of every [`Agent::observe`].
    fn decay_learning_rate(&mut self) {}

    /// Get the agent's name.
    ///
    /// Used for identification in logs and saved metadata.
    fn name(&self) -> &str;

    /// Whether [`Agent::observe`] changes the agent.
    fn is_learner(&self) -> bool {
        false
    }

    /// Seed the agent's internal random number generator.
    ///
    /// Training pipelines call this when supplied with a deterministic seed.
    /// Deterministic controllers can ignore it.
    fn set_rng_seed(&mut self, _seed: u64) {}
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn choose_action(&mut self, state: &DiscreteState) -> Action {
        (**self).choose_action(state)
    }

    fn choose_best_action(&mut self, state: &DiscreteState) -> Action {
        (**self).choose_best_action(state)
    }

    fn observe(
        &mut self,
        state: &DiscreteState,
        action: Action,
        reward: f64,
        next_state: &DiscreteState,
    ) {
        (**self).observe(state, action, reward, next_state);
    }

    fn on_episode_start(&mut self) {
        (**self).on_episode_start();
    }

    fn decay_learning_rate(&mut self) {
        (**self).decay_learning_rate();
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_learner(&self) -> bool {
        (**self).is_learner()
    }

    fn set_rng_seed(&mut self, seed: u64) {
        (**self).set_rng_seed(seed);
    }
}
