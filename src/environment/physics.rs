//! Continuous ball and paddle dynamics shared by both court variants.

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    discretizer::Discretizer,
    types::{Action, DiscreteState, STATE_DIMS},
    utils::jitter,
};

/// Physical constants of the court.
///
/// One policy is used by both variants: reflections are jittered and clipped
/// to `max_speed`, and each paddle hit raises `max_speed` by
/// `speed_increment` for the rest of the episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub field_width: f64,
    pub field_height: f64,
    pub paddle_height: f64,
    /// Paddle displacement per move action
    pub paddle_step: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Largest allowed `|vy / vx|` after a paddle hit
    pub angle_limit: f64,
    /// Magnitude of the horizontal serve velocity (sign is random)
    pub initial_speed_x: f64,
    /// Vertical serve velocity is uniform in `[-initial_speed_y, initial_speed_y]`
    pub initial_speed_y: f64,
    pub wall_jitter: f64,
    pub hit_jitter: f64,
    /// Vertical velocity added per unit of impact factor
    pub impact_nudge: f64,
    pub speed_increment: f64,
    pub bins: [u32; STATE_DIMS],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            field_width: 1.0,
            field_height: 1.0,
            paddle_height: 0.2,
            paddle_step: 0.04,
            min_speed: 0.03,
            max_speed: 0.04,
            angle_limit: 0.7,
            initial_speed_x: 0.02,
            initial_speed_y: 0.02,
            wall_jitter: 0.003,
            hit_jitter: 0.002,
            impact_nudge: 0.02,
            speed_increment: 0.001,
            bins: [12, 12, 2, 2, 12, 12],
        }
    }
}

impl PhysicsConfig {
    /// Check the constants for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("paddle_height", self.paddle_height),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("angle_limit", self.angle_limit),
            ("initial_speed_x", self.initial_speed_x),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let non_negative = [
            ("paddle_step", self.paddle_step),
            ("initial_speed_y", self.initial_speed_y),
            ("wall_jitter", self.wall_jitter),
            ("hit_jitter", self.hit_jitter),
            ("impact_nudge", self.impact_nudge),
            ("speed_increment", self.speed_increment),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::invalid_config(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        if self.paddle_height >= self.field_height {
            return Err(Error::invalid_config(format!(
                "paddle_height {} must be smaller than field_height {}",
                self.paddle_height, self.field_height
            )));
        }
        if self.min_speed > self.max_speed {
            return Err(Error::invalid_config(format!(
                "min_speed {} exceeds max_speed {}",
                self.min_speed, self.max_speed
            )));
        }
        Discretizer::new(self.bins)?;
        Ok(())
    }

    /// Highest legal paddle top coordinate.
    pub fn paddle_max(&self) -> f64 {
        self.field_height - self.paddle_height
    }
}

/// Reward values paid out by the environments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Paid to a paddle that returns the ball
    pub hit: f64,
    /// Paid to a paddle that lets the ball through
    pub miss: f64,
    /// Paid to the opposing paddle when the other side misses (dual court only)
    pub score: f64,
    /// Paid on every other step
    pub idle: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            hit: 1.0,
            miss: -1.0,
            score: 1.0,
            idle: 0.0,
        }
    }
}

/// Raw simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousState {
    pub ball_x: f64,
    pub ball_y: f64,
    pub ball_vx: f64,
    pub ball_vy: f64,
    /// Top coordinate of the left paddle
    pub left_paddle: f64,
    /// Top coordinate of the right paddle
    pub right_paddle: f64,
}

impl ContinuousState {
    /// Observation vector in discretizer order.
    pub fn to_array(&self) -> [f64; STATE_DIMS] {
        [
            self.ball_x,
            self.ball_y,
            self.ball_vx,
            self.ball_vy,
            self.left_paddle,
            self.right_paddle,
        ]
    }

    /// Euclidean norm of the ball velocity.
    pub fn speed(&self) -> f64 {
        self.ball_vx.hypot(self.ball_vy)
    }
}

/// Which end of the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign of the horizontal velocity pointing away from this side.
    fn outward(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Ball, paddles and the random source driving serves and jitter.
#[derive(Debug, Clone)]
pub(crate) struct Court {
    pub config: PhysicsConfig,
    pub state: ContinuousState,
    /// Current speed ceiling; grows with every paddle hit during an episode
    pub max_speed: f64,
    discretizer: Discretizer,
    rng: StdRng,
}

impl Court {
    pub fn new(config: PhysicsConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let discretizer = Discretizer::new(config.bins)?;
        let mut court = Self {
            config,
            state: ContinuousState {
                ball_x: 0.0,
                ball_y: 0.0,
                ball_vx: 0.0,
                ball_vy: 0.0,
                left_paddle: 0.0,
                right_paddle: 0.0,
            },
            max_speed: config.max_speed,
            discretizer,
            rng,
        };
        court.serve();
        Ok(court)
    }

    /// Center the ball and paddles and draw a fresh serve velocity.
    pub fn serve(&mut self) {
        let cfg = self.config;
        let direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let centered_paddle = (cfg.field_height - cfg.paddle_height) / 2.0;
        self.state = ContinuousState {
            ball_x: cfg.field_width / 2.0,
            ball_y: cfg.field_height / 2.0,
            ball_vx: direction * cfg.initial_speed_x,
            ball_vy: jitter(&mut self.rng, cfg.initial_speed_y),
            left_paddle: centered_paddle,
            right_paddle: centered_paddle,
        };
        self.max_speed = cfg.max_speed;
    }

    pub fn discretized(&self) -> DiscreteState {
        self.discretizer.discretize(&self.state.to_array())
    }

    pub fn move_paddle(&mut self, side: Side, action: Action) {
        let delta = action.direction() * self.config.paddle_step;
        let max = self.config.paddle_max();
        let paddle = match side {
            Side::Left => &mut self.state.left_paddle,
            Side::Right => &mut self.state.right_paddle,
        };
        *paddle = (*paddle + delta).clamp(0.0, max);
    }

    /// Integrate one tick and bounce off the top and bottom walls.
    pub fn advance_ball(&mut self) {
        self.state.ball_x += self.state.ball_vx;
        self.state.ball_y += self.state.ball_vy;

        let height = self.config.field_height;
        if self.state.ball_y <= 0.0 || self.state.ball_y >= height {
            let inward = if self.state.ball_y <= 0.0 { 1.0 } else { -1.0 };
            let vy = -self.state.ball_vy + jitter(&mut self.rng, self.config.wall_jitter);
            self.state.ball_vy = inward * vy.abs().min(self.max_speed);
            self.state.ball_y = self.state.ball_y.clamp(0.0, height);
        }

        self.enforce_min_speed();
    }

    pub fn ball_past(&self, side: Side) -> bool {
        match side {
            Side::Left => self.state.ball_x <= 0.0,
            Side::Right => self.state.ball_x >= self.config.field_width,
        }
    }

    /// Whether the paddle on `side` spans the ball's current height.
    pub fn paddle_covers_ball(&self, side: Side) -> bool {
        let top = match side {
            Side::Left => self.state.left_paddle,
            Side::Right => self.state.right_paddle,
        };
        (top..=top + self.config.paddle_height).contains(&self.state.ball_y)
    }

    /// Return the ball from the paddle on `side`.
    pub fn bounce_off_paddle(&mut self, side: Side) {
        let cfg = self.config;
        let top = match side {
            Side::Left => self.state.left_paddle,
            Side::Right => self.state.right_paddle,
        };

        let vx = -self.state.ball_vx + jitter(&mut self.rng, cfg.wall_jitter);
        let vx = vx.clamp(-self.max_speed, self.max_speed);
        self.state.ball_x = self.state.ball_x.clamp(0.0, cfg.field_width);

        let half = cfg.paddle_height / 2.0;
        let impact = ((self.state.ball_y - (top + half)) / half).clamp(-1.0, 1.0);
        self.state.ball_vy += impact * cfg.impact_nudge;

        let vx = vx + jitter(&mut self.rng, cfg.hit_jitter);
        self.state.ball_vx = side.outward() * vx.abs();

        self.clamp_angle();
        self.enforce_min_speed();
        self.max_speed += cfg.speed_increment;
    }

    /// Bounce off the unguarded far wall of the single-paddle court.
    pub fn bounce_off_wall(&mut self, side: Side) {
        self.state.ball_vx = side.outward() * self.state.ball_vx.abs();
        self.state.ball_x = self.state.ball_x.clamp(0.0, self.config.field_width);
    }

    /// Limit `|vy / vx|` to the configured angle. A zero horizontal velocity is
    /// left alone because the ratio is undefined.
    pub fn clamp_angle(&mut self) {
        let vx = self.state.ball_vx;
        if vx == 0.0 {
            return;
        }
        let ratio = (self.state.ball_vy / vx).abs();
        if ratio > self.config.angle_limit {
            self.state.ball_vy *= self.config.angle_limit / ratio;
        }
    }

    /// Rescale the velocity up to `min_speed` when it has fallen below it.
    pub fn enforce_min_speed(&mut self) {
        let min = self.config.min_speed;
        let speed = self.state.speed();
        if speed >= min {
            return;
        }
        if speed == 0.0 {
            // Direction is lost; send the ball toward the left paddle.
            self.state.ball_vx = -min;
            self.state.ball_vy = 0.0;
            return;
        }
        let scale = min / speed;
        self.state.ball_vx *= scale;
        self.state.ball_vy *= scale;
    }
}
