//! Exploration and learning-rate schedules

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hyperparameters of a tabular TD agent.
///
/// Effective exploration at step `t` is
/// `epsilon_end + (epsilon_start - epsilon_end) * exp(-t / epsilon_decay)`;
/// the global learning rate decays as `alpha = max(alpha_end, alpha * alpha_decay)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub epsilon_start: f64,
    pub epsilon_end: f64,
    /// Time constant (in action selections) of the exponential epsilon decay
    pub epsilon_decay: f64,
    /// Initial learning rate α
    pub alpha: f64,
    /// Floor for both the global and the per-pair learning rate
    pub alpha_end: f64,
    /// Multiplicative learning-rate decay per update
    pub alpha_decay: f64,
    /// Discount factor γ
    pub gamma: f64,
}

impl Hyperparameters {
    /// Defaults tuned for Q-learning: slower exploration decay, lower α.
    pub const fn q_learning() -> Self {
        Self {
            epsilon_start: 0.9,
            epsilon_end: 0.05,
            epsilon_decay: 300_000.0,
            alpha: 0.2,
            alpha_end: 0.05,
            alpha_decay: 0.9995,
            gamma: 0.99,
        }
    }

    /// Defaults tuned for SARSA.
    pub const fn sarsa() -> Self {
        Self {
            epsilon_start: 0.9,
            epsilon_end: 0.05,
            epsilon_decay: 150_000.0,
            alpha: 0.25,
            alpha_end: 0.05,
            alpha_decay: 0.999,
            gamma: 0.99,
        }
    }

    /// Check every parameter against its legal range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::invalid_config(format!(
                    "{name} must be in [0, 1], got {value}"
                )))
            }
        };
        unit("epsilon_start", self.epsilon_start)?;
        unit("epsilon_end", self.epsilon_end)?;
        unit("gamma", self.gamma)?;
        unit("alpha", self.alpha)?;

        if self.epsilon_end > self.epsilon_start {
            return Err(Error::invalid_config(format!(
                "epsilon_end {} exceeds epsilon_start {}",
                self.epsilon_end, self.epsilon_start
            )));
        }
        if !(self.epsilon_decay.is_finite() && self.epsilon_decay > 0.0) {
            return Err(Error::invalid_config(format!(
                "epsilon_decay must be positive, got {}",
                self.epsilon_decay
            )));
        }
        if !(self.alpha_end > 0.0 && self.alpha_end <= self.alpha) {
            return Err(Error::invalid_config(format!(
                "alpha_end must be in (0, alpha], got {} with alpha {}",
                self.alpha_end, self.alpha
            )));
        }
        if !(self.alpha_decay > 0.0 && self.alpha_decay <= 1.0) {
            return Err(Error::invalid_config(format!(
                "alpha_decay must be in (0, 1], got {}",
                self.alpha_decay
            )));
        }
        Ok(())
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self::q_learning()
    }
}

/// Hyperparameters as written in a configuration file.
///
/// Keys left out keep the value of the base set they are applied to,
/// usually the algorithm's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyperparameterOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

impl HyperparameterOverrides {
    /// Fill the missing keys from `base`.
    pub fn apply(&self, base: Hyperparameters) -> Hyperparameters {
        Hyperparameters {
            epsilon_start: self.epsilon_start.unwrap_or(base.epsilon_start),
            epsilon_end: self.epsilon_end.unwrap_or(base.epsilon_end),
            epsilon_decay: self.epsilon_decay.unwrap_or(base.epsilon_decay),
            alpha: self.alpha.unwrap_or(base.alpha),
            alpha_end: self.alpha_end.unwrap_or(base.alpha_end),
            alpha_decay: self.alpha_decay.unwrap_or(base.alpha_decay),
            gamma: self.gamma.unwrap_or(base.gamma),
        }
    }
}

impl From<Hyperparameters> for HyperparameterOverrides {
    fn from(params: Hyperparameters) -> Self {
        Self {
            epsilon_start: Some(params.epsilon_start),
            epsilon_end: Some(params.epsilon_end),
            epsilon_decay: Some(params.epsilon_decay),
            alpha: Some(params.alpha),
            alpha_end: Some(params.alpha_end),
            alpha_decay: Some(params.alpha_decay),
            gamma: Some(params.gamma),
        }
    }
}

/// Mutable schedule state owned by one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSchedule {
    params: Hyperparameters,
    /// Current global learning rate
    alpha: f64,
    /// Number of exploratory action selections made so far
    steps_done: u64,
}

impl LearningSchedule {
    pub fn new(params: Hyperparameters) -> Self {
        Self {
            alpha: params.alpha,
            params,
            steps_done: 0,
        }
    }

    /// Rebuild a schedule from persisted progress.
    pub fn resume(params: Hyperparameters, alpha: f64, steps_done: u64) -> Self {
        Self {
            params,
            alpha: alpha.clamp(params.alpha_end, params.alpha.max(params.alpha_end)),
            steps_done,
        }
    }

    pub fn params(&self) -> &Hyperparameters {
        &self.params
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.params.gamma
    }

    pub fn steps_done(&self) -> u64 {
        self.steps_done
    }

    /// Effective epsilon at an arbitrary step count.
    pub fn epsilon_at(&self, steps: u64) -> f64 {
        let p = &self.params;
        p.epsilon_end + (p.epsilon_start - p.epsilon_end) * (-(steps as f64) / p.epsilon_decay).exp()
    }

    /// Effective epsilon at the current step count.
    pub fn epsilon(&self) -> f64 {
        self.epsilon_at(self.steps_done)
    }

    /// Return the current epsilon and advance the step counter.
    pub fn next_epsilon(&mut self) -> f64 {
        let eps = self.epsilon();
        self.steps_done += 1;
        eps
    }

    /// Learning rate for a pair visited `visits` times (including this visit).
    pub fn adjusted_alpha(&self, visits: u32) -> f64 {
        (self.alpha / (1.0 + f64::from(visits))).max(self.params.alpha_end)
    }

    /// One multiplicative step of the global learning-rate decay.
    pub fn decay_alpha(&mut self) {
        self.alpha = (self.alpha * self.params.alpha_decay).max(self.params.alpha_end);
    }

    /// Restart exploration and learning rate from the initial values.
    pub fn restart(&mut self) {
        self.alpha = self.params.alpha;
        self.steps_done = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Hyperparameters::q_learning().validate().unwrap();
        Hyperparameters::sarsa().validate().unwrap();
    }

    #[test]
    fn test_epsilon_starts_at_start() {
        let schedule = LearningSchedule::new(Hyperparameters::q_learning());
        assert!((schedule.epsilon() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_epsilon_is_non_increasing_and_converges() {
        let params = Hyperparameters {
            epsilon_decay: 100.0,
            ..Hyperparameters::q_learning()
        };
        let schedule = LearningSchedule::new(params);
        let mut previous = f64::INFINITY;
        for steps in (0..10_000).step_by(37) {
            let eps = schedule.epsilon_at(steps);
            assert!(eps <= previous);
            assert!(eps >= params.epsilon_end);
            previous = eps;
        }
        assert!((schedule.epsilon_at(100_000) - params.epsilon_end).abs() < 1e-9);
    }

    #[test]
    fn test_next_epsilon_advances_counter() {
        let mut schedule = LearningSchedule::new(Hyperparameters::sarsa());
        schedule.next_epsilon();
        schedule.next_epsilon();
        assert_eq!(schedule.steps_done(), 2);
    }

    #[test]
    fn test_alpha_decay_respects_floor() {
        let params = Hyperparameters {
            alpha: 0.2,
            alpha_end: 0.1,
            alpha_decay: 0.5,
            ..Hyperparameters::q_learning()
        };
        let mut schedule = LearningSchedule::new(params);
        schedule.decay_alpha();
        assert!((schedule.alpha() - 0.1).abs() < 1e-12);
        schedule.decay_alpha();
        assert!((schedule.alpha() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_alpha_shrinks_with_visits() {
        let schedule = LearningSchedule::new(Hyperparameters {
            alpha: 0.6,
            alpha_end: 0.05,
            ..Hyperparameters::q_learning()
        });
        assert!((schedule.adjusted_alpha(1) - 0.3).abs() < 1e-12);
        assert!((schedule.adjusted_alpha(2) - 0.2).abs() < 1e-12);
        assert!((schedule.adjusted_alpha(100) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            Hyperparameters {
                epsilon_end: 0.95,
                ..Hyperparameters::q_learning()
            },
            Hyperparameters {
                epsilon_decay: 0.0,
                ..Hyperparameters::q_learning()
            },
            Hyperparameters {
                alpha_end: 0.0,
                ..Hyperparameters::q_learning()
            },
            Hyperparameters {
                alpha_decay: 1.5,
                ..Hyperparameters::q_learning()
            },
            Hyperparameters {
                gamma: 1.2,
                ..Hyperparameters::q_learning()
            },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "{params:?} should be rejected");
        }
    }

    #[test]
    fn test_overrides_fill_missing_keys_from_base() {
        let overrides = HyperparameterOverrides {
            alpha: Some(0.3),
            gamma: Some(0.9),
            ..HyperparameterOverrides::default()
        };
        let params = overrides.apply(Hyperparameters::sarsa());
        assert_eq!(params.alpha, 0.3);
        assert_eq!(params.gamma, 0.9);
        assert_eq!(params.epsilon_decay, Hyperparameters::sarsa().epsilon_decay);
        assert_eq!(params.alpha_decay, Hyperparameters::sarsa().alpha_decay);

        let full = HyperparameterOverrides::from(Hyperparameters::q_learning());
        assert_eq!(full.apply(Hyperparameters::sarsa()), Hyperparameters::q_learning());
    }
}
