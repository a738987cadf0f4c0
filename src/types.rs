//! Newtype wrappers for the discrete side of the decision process.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of observation dimensions: ball x, ball y, ball vx, ball vy,
/// left paddle top, right paddle top.
pub const STATE_DIMS: usize = 6;

/// A paddle command.
///
/// The discriminants are the wire-level action indices (0, 1, 2) and the
/// enumeration order is the tie-break order for greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stay = 0,
    MoveUp = 1,
    MoveDown = 2,
}

impl Action {
    /// All actions in tie-break order.
    pub const ALL: [Action; 3] = [Action::Stay, Action::MoveUp, Action::MoveDown];

    /// Number of legal actions.
    pub const COUNT: usize = Self::ALL.len();

    /// Convert a raw action index, rejecting anything outside `0..=2`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAction`] for out-of-range indices.
    pub fn from_index(index: usize) -> Result<Self, crate::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(crate::Error::InvalidAction { index })
    }

    /// Wire-level index of this action.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Signed paddle displacement in units of the configured paddle step.
    pub fn direction(self) -> f64 {
        match self {
            Action::Stay => 0.0,
            Action::MoveUp => 1.0,
            Action::MoveDown => -1.0,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = crate::Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Stay => "stay",
            Action::MoveUp => "up",
            Action::MoveDown => "down",
        };
        f.write_str(name)
    }
}

/// Bin indices of one quantized observation.
///
/// Many continuous states share one discrete state. Velocity bins may be
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscreteState(pub [i64; STATE_DIMS]);

impl DiscreteState {
    /// Wrap raw bin indices.
    pub const fn new(bins: [i64; STATE_DIMS]) -> Self {
        DiscreteState(bins)
    }

    /// Bin index of one dimension.
    pub fn bin(&self, dimension: usize) -> i64 {
        self.0[dimension]
    }

    /// All bin indices.
    pub fn bins(&self) -> &[i64; STATE_DIMS] {
        &self.0
    }
}

impl fmt::Display for DiscreteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, bin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bin}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_index() {
        assert_eq!(Action::from_index(0).unwrap(), Action::Stay);
        assert_eq!(Action::from_index(1).unwrap(), Action::MoveUp);
        assert_eq!(Action::from_index(2).unwrap(), Action::MoveDown);
    }

    #[test]
    fn test_invalid_action_index() {
        let err = Action::try_from(3).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidAction { index: 3 }));
    }

    #[test]
    fn test_action_index_roundtrip_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }

    #[test]
    fn test_discrete_state_display() {
        let state = DiscreteState::new([6, 6, -1, 0, 4, 4]);
        assert_eq!(state.to_string(), "(6, 6, -1, 0, 4, 4)");
    }
}
