//! One controllable paddle against a wall.

use rand::rngs::StdRng;

use super::{
    ContinuousState, Environment, Frame, PhysicsConfig, RewardConfig, Side, Step, StepInfo,
    physics::Court,
};
use crate::{
    Error, Result,
    types::{Action, DiscreteState},
    utils::build_rng,
};

/// Court with the agent's paddle on the left and a reflecting wall on the right.
///
/// A miss on the left terminates the episode. The right wall always
/// returns the ball.
#[derive(Debug, Clone)]
pub struct SinglePaddleEnv {
    court: Court,
    rewards: RewardConfig,
    done: bool,
    score: u32,
}

impl SinglePaddleEnv {
    /// Create an environment with its own seeded random source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the physics constants are inconsistent.
    pub fn new(physics: PhysicsConfig, rewards: RewardConfig, seed: Option<u64>) -> Result<Self> {
        Self::with_rng(physics, rewards, build_rng(seed))
    }

    /// Create an environment driven by an injected random source.
    pub fn with_rng(physics: PhysicsConfig, rewards: RewardConfig, rng: StdRng) -> Result<Self> {
        Ok(Self {
            court: Court::new(physics, rng)?,
            rewards,
            done: false,
            score: 0,
        })
    }

    /// Hits scored in the current episode.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current speed ceiling (raised by each hit).
    pub fn max_speed(&self) -> f64 {
        self.court.max_speed
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.court.config
    }

    /// Place the simulation in an explicit state and mark the episode active.
    ///
    /// Used to replay situations and to set up deterministic scenarios.
    pub fn restore(&mut self, state: ContinuousState) {
        self.court.state = state;
        self.done = false;
    }

    /// Step with a raw action index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] for indices outside `0..=2`, otherwise
    /// whatever [`Environment::step`] returns.
    pub fn step_index(&mut self, index: usize) -> Result<Step<f64>> {
        let action = Action::from_index(index)?;
        self.step(action)
    }
}

impl Environment for SinglePaddleEnv {
    type Action = Action;
    type Reward = f64;

    fn reset(&mut self) -> DiscreteState {
        self.court.serve();
        self.done = false;
        self.score = 0;
        self.court.discretized()
    }

    fn step(&mut self, action: Action) -> Result<Step<f64>> {
        if self.done {
            return Err(Error::EnvironmentNotReset);
        }

        self.court.move_paddle(Side::Left, action);
        self.court.advance_ball();

        let mut reward = self.rewards.idle;
        if self.court.ball_past(Side::Left) {
            if self.court.paddle_covers_ball(Side::Left) {
                self.court.bounce_off_paddle(Side::Left);
                reward = self.rewards.hit;
                self.score += 1;
            } else {
                self.done = true;
                reward = self.rewards.miss;
            }
        }

        if self.court.ball_past(Side::Right) {
            self.court.bounce_off_wall(Side::Right);
        }

        Ok(Step {
            state: self.court.discretized(),
            reward,
            done: self.done,
            info: StepInfo {
                left_hits: self.score,
                right_hits: 0,
            },
        })
    }

    fn observe(&self) -> DiscreteState {
        self.court.discretized()
    }

    fn continuous_state(&self) -> ContinuousState {
        self.court.state
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn frame(&self) -> Frame {
        let s = self.court.state;
        let cfg = self.court.config;
        Frame {
            ball_x: s.ball_x,
            ball_y: s.ball_y,
            left_paddle: s.left_paddle,
            right_paddle: None,
            paddle_height: cfg.paddle_height,
            field_width: cfg.field_width,
            field_height: cfg.field_height,
        }
    }
}
