//! Resolved game configuration.
//!
//! Every section has defaults, so an empty TOML file describes a
//! single-paddle Q-learning run with the stock physics.
//!
//! ```toml
//! mode = "dual"
//!
//! [left]
//! controller = "q_learning"
//! save = "left.msgpack"
//!
//! # Keys left out keep the Q-learning defaults
//! [left.hyperparameters]
//! alpha = 0.3
//!
//! [right]
//! controller = "scripted"
//! difficulty = "hard"
//!
//! [training]
//! episodes = 5000
//! seed = 7
//! ```

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    environment::{PhysicsConfig, RewardConfig},
    pipeline::{Difficulty, TrainingConfig},
    q_learning::{HyperparameterOverrides, Hyperparameters, TdAlgorithm},
};

/// Court layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// One learner against a wall
    #[default]
    Single,
    /// Two paddles against each other
    Dual,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "single"),
            Mode::Dual => write!(f, "dual"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Mode::Single),
            "dual" => Ok(Mode::Dual),
            _ => Err(Error::ParseChoice {
                kind: "mode".to_string(),
                input: s.to_string(),
                expected: "single, dual".to_string(),
            }),
        }
    }
}

/// Settings of one learning agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    /// Hyperparameters to change; missing keys keep the algorithm's defaults
    pub hyperparameters: Option<HyperparameterOverrides>,
    /// Resume from a saved agent instead of starting empty
    pub load: Option<PathBuf>,
    /// Where to save the agent after training
    pub save: Option<PathBuf>,
}

impl AgentSpec {
    /// Apply the configured keys over `defaults`.
    pub fn resolve_hyperparameters(&self, defaults: Hyperparameters) -> Hyperparameters {
        self.hyperparameters
            .map_or(defaults, |overrides| overrides.apply(defaults))
    }
}

/// Who controls a paddle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "controller", rename_all = "snake_case")]
pub enum ControllerSpec {
    QLearning(AgentSpec),
    Sarsa(AgentSpec),
    Scripted {
        #[serde(default)]
        difficulty: Difficulty,
    },
}

impl ControllerSpec {
    /// Learning algorithm, or `None` for scripted controllers.
    pub fn algorithm(&self) -> Option<TdAlgorithm> {
        match self {
            ControllerSpec::QLearning(_) => Some(TdAlgorithm::QLearning),
            ControllerSpec::Sarsa(_) => Some(TdAlgorithm::Sarsa),
            ControllerSpec::Scripted { .. } => None,
        }
    }

    pub fn agent_spec(&self) -> Option<&AgentSpec> {
        match self {
            ControllerSpec::QLearning(spec) | ControllerSpec::Sarsa(spec) => Some(spec),
            ControllerSpec::Scripted { .. } => None,
        }
    }

    pub fn agent_spec_mut(&mut self) -> Option<&mut AgentSpec> {
        match self {
            ControllerSpec::QLearning(spec) | ControllerSpec::Sarsa(spec) => Some(spec),
            ControllerSpec::Scripted { .. } => None,
        }
    }

    /// Hyperparameters after applying algorithm defaults.
    pub fn hyperparameters(&self) -> Option<Hyperparameters> {
        match self {
            ControllerSpec::QLearning(spec) => {
                Some(spec.resolve_hyperparameters(Hyperparameters::q_learning()))
            }
            ControllerSpec::Sarsa(spec) => {
                Some(spec.resolve_hyperparameters(Hyperparameters::sarsa()))
            }
            ControllerSpec::Scripted { .. } => None,
        }
    }

    /// Parse a command-line controller name: `q-learning`, `sarsa`, or
    /// `easy` / `medium` / `hard` for a scripted paddle.
    pub fn parse_name(name: &str) -> Result<Self> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "q-learning" | "qlearning" | "q" => Ok(ControllerSpec::QLearning(AgentSpec::default())),
            "sarsa" => Ok(ControllerSpec::Sarsa(AgentSpec::default())),
            other => match other.parse::<Difficulty>() {
                Ok(difficulty) => Ok(ControllerSpec::Scripted { difficulty }),
                Err(_) => Err(Error::ParseChoice {
                    kind: "controller".to_string(),
                    input: name.to_string(),
                    expected: "q-learning, sarsa, easy, medium, hard".to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for ControllerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerSpec::QLearning(_) => write!(f, "q-learning"),
            ControllerSpec::Sarsa(_) => write!(f, "sarsa"),
            ControllerSpec::Scripted { difficulty } => write!(f, "scripted ({difficulty})"),
        }
    }
}

/// Files written by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Per-episode reward CSV
    pub rewards_csv: Option<PathBuf>,
    /// Full run result as JSON
    pub run_result: Option<PathBuf>,
}

/// Everything needed to build and run one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: Mode,
    pub left: ControllerSpec,
    /// Ignored in single mode
    pub right: ControllerSpec,
    pub physics: PhysicsConfig,
    pub rewards: RewardConfig,
    pub training: TrainingConfig,
    pub output: OutputConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            left: ControllerSpec::QLearning(AgentSpec::default()),
            right: ControllerSpec::Scripted {
                difficulty: Difficulty::default(),
            },
            physics: PhysicsConfig::default(),
            rewards: RewardConfig::default(),
            training: TrainingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {path:?}"),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every section once, before anything is built.
    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        self.training.validate()?;
        for (side, spec) in [("left", &self.left), ("right", &self.right)] {
            if side == "right" && self.mode == Mode::Single {
                continue;
            }
            if let Some(params) = spec.hyperparameters() {
                params.validate().map_err(|e| {
                    Error::invalid_config(format!("{side} hyperparameters: {e}"))
                })?;
            }
        }
        Ok(())
    }

    /// Controllers that take part in this mode, left first.
    pub fn active_controllers(&self) -> Vec<&ControllerSpec> {
        match self.mode {
            Mode::Single => vec![&self.left],
            Mode::Dual => vec![&self.left, &self.right],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.training.max_steps_per_episode, Some(10_000));
    }

    #[test]
    fn test_dual_config_parses() {
        let config = GameConfig::from_toml_str(
            r#"
            mode = "dual"

            [left]
            controller = "sarsa"
            save = "left.msgpack"

            [right]
            controller = "scripted"
            difficulty = "hard"

            [physics]
            paddle_height = 0.25

            [training]
            episodes = 50
            seed = 9
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Dual);
        assert_eq!(config.left.algorithm(), Some(TdAlgorithm::Sarsa));
        assert_eq!(
            config.left.hyperparameters(),
            Some(Hyperparameters::sarsa())
        );
        assert_eq!(
            config.left.agent_spec().and_then(|s| s.save.clone()),
            Some(PathBuf::from("left.msgpack"))
        );
        assert_eq!(
            config.right,
            ControllerSpec::Scripted {
                difficulty: Difficulty::Hard
            }
        );
        assert_eq!(config.physics.paddle_height, 0.25);
        assert_eq!(config.physics.paddle_step, 0.04);
        assert_eq!(config.training.episodes, 50);
        assert_eq!(config.training.seed, Some(9));
    }

    #[test]
    fn test_invalid_hyperparameters_rejected() {
        let err = GameConfig::from_toml_str(
            r#"
            [left]
            controller = "q_learning"

            [left.hyperparameters]
            epsilon_start = 0.9
            epsilon_end = 0.05
            epsilon_decay = 1000.0
            alpha = 0.2
            alpha_end = 0.5
            alpha_decay = 0.999
            gamma = 0.99
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_partial_hyperparameters_keep_algorithm_defaults() {
        let config = GameConfig::from_toml_str(
            "[left]\ncontroller = \"sarsa\"\n[left.hyperparameters]\nalpha = 0.3\n",
        )
        .unwrap();
        let params = config.left.hyperparameters().unwrap();
        assert_eq!(params.alpha, 0.3);
        assert_eq!(params.epsilon_decay, Hyperparameters::sarsa().epsilon_decay);
        assert_eq!(params.alpha_decay, Hyperparameters::sarsa().alpha_decay);
    }

    #[test]
    fn test_unknown_hyperparameter_rejected() {
        let err = GameConfig::from_toml_str(
            "[left]\ncontroller = \"sarsa\"\n[left.hyperparameters]\nlearning_rate = 0.3\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_invalid_physics_rejected() {
        let err = GameConfig::from_toml_str("[physics]\npaddle_height = 1.5\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = GameConfig::from_toml_str("mode = [").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_parse_controller_names() {
        assert_eq!(
            ControllerSpec::parse_name("Q_Learning").unwrap().algorithm(),
            Some(TdAlgorithm::QLearning)
        );
        assert_eq!(
            ControllerSpec::parse_name("easy").unwrap(),
            ControllerSpec::Scripted {
                difficulty: Difficulty::Easy
            }
        );
        assert!(ControllerSpec::parse_name("human").is_err());
    }
}
