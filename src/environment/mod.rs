//! Paddle-game environments
//!
//! Both variants own a continuous simulation (ball position and velocity,
//! paddle positions, terminal flag) and expose it to learners only through
//! discretized states.
//!
//! | Variant | Controllable paddles | Far side | Reward |
//! |---------|----------------------|----------|--------|
//! | [`SinglePaddleEnv`] | left | fixed wall | scalar |
//! | [`DualPaddleEnv`] | left and right | opponent paddle | `(left, right)` pair |
//!
//! Stepping a terminated episode fails with [`crate::Error::EnvironmentNotReset`]
//! in both variants.

pub mod dual;
pub mod physics;
pub mod single;

use serde::{Deserialize, Serialize};

pub use dual::DualPaddleEnv;
pub use physics::{ContinuousState, PhysicsConfig, RewardConfig, Side};
pub use single::SinglePaddleEnv;

use crate::{Result, types::DiscreteState};

/// Auxiliary per-step information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Successful returns by the left paddle this episode
    pub left_hits: u32,
    /// Successful returns by the right paddle this episode
    pub right_hits: u32,
}

/// Result of one environment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<R> {
    pub state: DiscreteState,
    pub reward: R,
    pub done: bool,
    pub info: StepInfo,
}

/// Positions handed to a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub ball_x: f64,
    pub ball_y: f64,
    pub left_paddle: f64,
    /// `None` when the right side is a wall
    pub right_paddle: Option<f64>,
    pub paddle_height: f64,
    pub field_width: f64,
    pub field_height: f64,
}

/// Episodic environment driven by discrete actions.
pub trait Environment {
    /// What one step consumes: a single action or one per paddle.
    type Action: Copy;
    /// What one step pays out: a scalar or one value per paddle.
    type Reward: Copy;

    /// Start a new episode and return its initial discretized state.
    fn reset(&mut self) -> DiscreteState;

    /// Advance the simulation by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EnvironmentNotReset`] when the episode has
    /// already terminated.
    fn step(&mut self, action: Self::Action) -> Result<Step<Self::Reward>>;

    /// Discretized view of the current state.
    fn observe(&self) -> DiscreteState;

    /// Raw continuous state.
    fn continuous_state(&self) -> ContinuousState;

    /// Whether the current episode has terminated.
    fn is_done(&self) -> bool;

    /// Snapshot for a rendering surface.
    fn frame(&self) -> Frame;
}
