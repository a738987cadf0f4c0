//! Two competing paddles.

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

/// Court with a controllable paddle at each end.
///
/// Either side missing terminates the episode; the side that missed is paid
/// `miss`, the other side `score`. A successful return pays `hit` to the
/// returning side only.
#[derive(Debug, Clone)]
pub struct DualPaddleEnv {
    court: Court,
    rewards: RewardConfig,
    done: bool,
    hits: [u32; 2],
}

impl DualPaddleEnv {
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
            hits: [0, 0],
        })
    }

    /// Place the simulation in an explicit state and mark the episode active.
    pub fn restore(&mut self, state: ContinuousState) {
        self.court.state = state;
        self.done = false;
    }

    /// Step with raw action indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] if either index is outside `0..=2`.
    pub fn step_indices(&mut self, left: usize, right: usize) -> Result<Step<(f64, f64)>> {
        let actions = (Action::from_index(left)?, Action::from_index(right)?);
        self.step(actions)
    }

    fn resolve_end(&mut self, side: Side, rewards: &mut (f64, f64)) {
        if !self.court.ball_past(side) {
            return;
        }
        let (own, other) = match side {
            Side::Left => (&mut rewards.0, &mut rewards.1),
            Side::Right => (&mut rewards.1, &mut rewards.0),
        };
        if self.court.paddle_covers_ball(side) {
            self.court.bounce_off_paddle(side);
            *own = self.rewards.hit;
            match side {
                Side::Left => self.hits[0] += 1,
                Side::Right => self.hits[1] += 1,
            }
        } else {
            self.done = true;
            *own = self.rewards.miss;
            *other = self.rewards.score;
        }
    }
}

impl Environment for DualPaddleEnv {
    type Action = (Action, Action);
    type Reward = (f64, f64);

    fn reset(&mut self) -> DiscreteState {
        self.court.serve();
        self.done = false;
        self.hits = [0, 0];
        self.court.discretized()
    }

    fn step(&mut self, (left, right): (Action, Action)) -> Result<Step<(f64, f64)>> {
        if self.done {
            return Err(Error::EnvironmentNotReset);
        }

        self.court.move_paddle(Side::Left, left);
        self.court.move_paddle(Side::Right, right);
        self.court.advance_ball();

        let mut rewards = (self.rewards.idle, self.rewards.idle);
        self.resolve_end(Side::Left, &mut rewards);
        if !self.done {
            self.resolve_end(Side::Right, &mut rewards);
        }

        Ok(Step {
            state: self.court.discretized(),
            reward: rewards,
            done: self.done,
            info: StepInfo {
                left_hits: self.hits[0],
                right_hits: self.hits[1],
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
            right_paddle: Some(s.right_paddle),
            paddle_height: cfg.paddle_height,
            field_width: cfg.field_width,
            field_height: cfg.field_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> DualPaddleEnv {
        DualPaddleEnv::new(PhysicsConfig::default(), RewardConfig::default(), Some(5)).unwrap()
    }

    fn approaching(side: Side, ball_y: f64) -> ContinuousState {
        let (ball_x, ball_vx) = match side {
            Side::Left => (0.01, -0.02),
            Side::Right => (0.99, 0.02),
        };
        ContinuousState {
            ball_x,
            ball_y,
            ball_vx,
            ball_vy: 0.0,
            left_paddle: 0.4,
            right_paddle: 0.4,
        }
    }

    #[test]
    fn test_left_miss_pays_right() {
        let mut env = env();
        env.restore(approaching(Side::Left, 0.1));
        let step = env.step((Action::Stay, Action::Stay)).unwrap();
        assert!(step.done);
        assert_eq!(step.reward, (-1.0, 1.0));
    }

    #[test]
    fn test_right_miss_pays_left() {
        let mut env = env();
        env.restore(approaching(Side::Right, 0.95));
        let step = env.step((Action::Stay, Action::Stay)).unwrap();
        assert!(step.done);
        assert_eq!(step.reward, (1.0, -1.0));
    }

    #[test]
    fn test_right_hit_rewards_only_right() {
        let mut env = env();
        env.restore(approaching(Side::Right, 0.5));
        let step = env.step((Action::Stay, Action::Stay)).unwrap();
        assert!(!step.done);
        assert_eq!(step.reward, (0.0, 1.0));
        assert_eq!(step.info.right_hits, 1);
        assert!(env.continuous_state().ball_vx < 0.0);
    }

    #[test]
    fn test_step_after_terminal_fails() {
        let mut env = env();
        env.restore(approaching(Side::Left, 0.1));
        env.step((Action::Stay, Action::Stay)).unwrap();
        assert!(matches!(
            env.step((Action::Stay, Action::Stay)),
            Err(Error::EnvironmentNotReset)
        ));
    }

    #[test]
    fn test_both_paddles_move() {
        let mut env = env();
        env.reset();
        env.step((Action::MoveUp, Action::MoveDown)).unwrap();
        let s = env.continuous_state();
        assert!((s.left_paddle - 0.44).abs() < 1e-9);
        assert!((s.right_paddle - 0.36).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_index_rejected() {
        let mut env = env();
        assert!(matches!(
            env.step_indices(0, 3),
            Err(Error::InvalidAction { index: 3 })
        ));
    }
}
