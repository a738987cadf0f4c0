//! Scripted paddle controllers used as opponents in the dual court.

use std::{fmt, str::FromStr};

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    environment::{PhysicsConfig, Side},
    ports::Agent,
    types::{Action, DiscreteState},
    utils::build_rng,
};

/// Ball-tracking skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Moves randomly half the time, otherwise tracks the ball
    Easy,
    /// Tracks where the ball was on the previous step
    #[default]
    Medium,
    /// Tracks the ball's current position
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(Error::ParseChoice {
                kind: "difficulty".to_string(),
                input: s.to_string(),
                expected: "easy, medium, hard".to_string(),
            }),
        }
    }
}

/// Paddle controller that chases the ball's vertical position.
///
/// It reads the same discretized state a learner sees: the ball's y bin and
/// its own paddle's bin. It never learns.
#[derive(Debug, Clone)]
pub struct TrackingOpponent {
    side: Side,
    difficulty: Difficulty,
    ball_bins: f64,
    paddle_bins: f64,
    half_paddle: f64,
    previous_ball_bin: Option<i64>,
    rng: StdRng,
    name: String,
}

impl TrackingOpponent {
    pub fn new(side: Side, difficulty: Difficulty, physics: &PhysicsConfig) -> Self {
        let paddle_dim = match side {
            Side::Left => 4,
            Side::Right => 5,
        };
        Self {
            side,
            difficulty,
            ball_bins: f64::from(physics.bins[1]),
            paddle_bins: f64::from(physics.bins[paddle_dim]),
            half_paddle: physics.paddle_height / (2.0 * physics.field_height),
            previous_ball_bin: None,
            rng: build_rng(None),
            name: format!("Tracking-{difficulty}"),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn paddle_bin(&self, state: &DiscreteState) -> i64 {
        match self.side {
            Side::Left => state.bin(4),
            Side::Right => state.bin(5),
        }
    }

    /// Move the paddle centre toward the ball, staying put within half a bin.
    fn track(&self, ball_bin: i64, paddle_bin: i64) -> Action {
        let ball = (ball_bin as f64 + 0.5) / self.ball_bins;
        let centre = (paddle_bin as f64 + 0.5) / self.paddle_bins + self.half_paddle;
        let dead_zone = 0.5 / self.ball_bins;
        if ball > centre + dead_zone {
            Action::MoveUp
        } else if ball < centre - dead_zone {
            Action::MoveDown
        } else {
            Action::Stay
        }
    }

    fn act(&mut self, state: &DiscreteState) -> Action {
        let ball_bin = state.bin(1);
        let paddle_bin = self.paddle_bin(state);
        match self.difficulty {
            Difficulty::Easy => {
                if self.rng.random_bool(0.5) {
                    if self.rng.random_bool(0.5) {
                        Action::MoveUp
                    } else {
                        Action::MoveDown
                    }
                } else {
                    self.track(ball_bin, paddle_bin)
                }
            }
            Difficulty::Medium => {
                let seen = self.previous_ball_bin.replace(ball_bin).unwrap_or(ball_bin);
                self.track(seen, paddle_bin)
            }
            Difficulty::Hard => self.track(ball_bin, paddle_bin),
        }
    }
}

impl Agent for TrackingOpponent {
    fn choose_action(&mut self, state: &DiscreteState) -> Action {
        self.act(state)
    }

    fn choose_best_action(&mut self, state: &DiscreteState) -> Action {
        self.act(state)
    }

    fn on_episode_start(&mut self) {
        self.previous_ball_bin = None;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = build_rng(Some(seed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(ball_bin: i64, right_paddle_bin: i64) -> DiscreteState {
        DiscreteState::new([8, ball_bin, 1, 0, 4, right_paddle_bin])
    }

    fn opponent(difficulty: Difficulty) -> TrackingOpponent {
        TrackingOpponent::new(Side::Right, difficulty, &PhysicsConfig::default()).with_seed(4)
    }

    #[test]
    fn test_hard_tracks_ball() {
        let mut hard = opponent(Difficulty::Hard);
        // Paddle top in bin 4 puts its centre around bin 5.7.
        assert_eq!(hard.choose_action(&state(10, 4)), Action::MoveUp);
        assert_eq!(hard.choose_action(&state(1, 4)), Action::MoveDown);
        assert_eq!(hard.choose_action(&state(5, 4)), Action::Stay);
    }

    #[test]
    fn test_medium_lags_one_step() {
        let mut medium = opponent(Difficulty::Medium);
        assert_eq!(medium.choose_action(&state(10, 4)), Action::MoveUp);
        // Still reacting to the ball it saw last step.
        assert_eq!(medium.choose_action(&state(1, 4)), Action::MoveUp);
        assert_eq!(medium.choose_action(&state(1, 4)), Action::MoveDown);
    }

    #[test]
    fn test_medium_forgets_ball_between_episodes() {
        let mut medium = opponent(Difficulty::Medium);
        assert_eq!(medium.choose_action(&state(11, 4)), Action::MoveUp);

        medium.on_episode_start();
        // A fresh episode reacts to the ball it sees now.
        assert_eq!(medium.choose_action(&state(5, 4)), Action::Stay);
    }

    #[test]
    fn test_easy_sometimes_moves_randomly() {
        let mut easy = opponent(Difficulty::Easy);
        let actions: Vec<Action> = (0..200).map(|_| easy.choose_action(&state(5, 4))).collect();
        // Tracking alone would always stay here.
        assert!(actions.iter().any(|&a| a != Action::Stay));
        assert!(actions.contains(&Action::Stay));
    }

    #[test]
    fn test_left_side_reads_left_paddle() {
        let mut hard =
            TrackingOpponent::new(Side::Left, Difficulty::Hard, &PhysicsConfig::default());
        let s = DiscreteState::new([1, 10, -1, 0, 0, 4]);
        assert_eq!(hard.choose_action(&s), Action::MoveUp);
        assert!(!hard.is_learner());
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }
}
