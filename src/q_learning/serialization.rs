//! Serialization support for temporal difference learning agents.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::{
        agent::{QLearningAgent, SarsaAgent, TdAgent, TdAgentState},
        q_table::TableEntry,
        schedule::Hyperparameters,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TdAlgorithm {
    QLearning,
    Sarsa,
}

impl std::fmt::Display for TdAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TdAlgorithm::QLearning => write!(f, "q-learning"),
            TdAlgorithm::Sarsa => write!(f, "sarsa"),
        }
    }
}

/// Metadata about how the agent was trained
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of episodes trained
    pub episodes_trained: Option<usize>,
    /// Game mode the agent was trained in ("single" or "dual")
    pub mode: Option<String>,
    /// Paddle the agent controlled ("left" or "right")
    pub side: Option<String>,
    /// Controller on the other side, if any
    pub opponent: Option<String>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Seconds since the Unix epoch when saved
    pub saved_at: Option<u64>,
}

/// Versioned snapshot of a TD agent.
///
/// Visit counts are persisted alongside values so that the per-pair
/// learning-rate shaping survives a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTdAgent {
    pub version: u32,
    pub algorithm: TdAlgorithm,
    pub hyperparameters: Hyperparameters,
    /// Global learning rate at save time
    pub alpha: f64,
    /// Exploration step counter at save time
    pub steps_done: u64,
    pub entries: Vec<TableEntry>,
    pub rng_seed: Option<u64>,
    pub metadata: TrainingMetadata,
}

impl SavedTdAgent {
    pub const VERSION: u32 = 1;

    fn from_state(algorithm: TdAlgorithm, state: TdAgentState, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            algorithm,
            hyperparameters: state.hyperparameters,
            alpha: state.alpha,
            steps_done: state.steps_done,
            entries: state.entries,
            rng_seed: state.rng_seed,
            metadata,
        }
    }

    pub fn from_q_learning(agent: &QLearningAgent, metadata: TrainingMetadata) -> Self {
        Self::from_state(TdAlgorithm::QLearning, agent.export_state(), metadata)
    }

    pub fn from_sarsa(agent: &SarsaAgent, metadata: TrainingMetadata) -> Self {
        Self::from_state(TdAlgorithm::Sarsa, agent.export_state(), metadata)
    }

    pub fn from_agent(agent: &TdAgent, metadata: TrainingMetadata) -> Self {
        match agent {
            TdAgent::QLearning(agent) => Self::from_q_learning(agent, metadata),
            TdAgent::Sarsa(agent) => Self::from_sarsa(agent, metadata),
        }
    }

    /// Rebuild the agent, replacing any in-memory table and schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormatVersion`] for snapshots written by
    /// another format version, or [`Error::InvalidConfiguration`] if the
    /// stored hyperparameters are out of range.
    pub fn to_agent(&self) -> Result<TdAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedFormatVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        let state = TdAgentState {
            hyperparameters: self.hyperparameters,
            alpha: self.alpha,
            steps_done: self.steps_done,
            entries: self.entries.clone(),
            rng_seed: self.rng_seed,
        };
        match self.algorithm {
            TdAlgorithm::QLearning => Ok(TdAgent::QLearning(QLearningAgent::from_state(state)?)),
            TdAlgorithm::Sarsa => Ok(TdAgent::Sarsa(SarsaAgent::from_state(state)?)),
        }
    }

    /// Encode as MessagePack.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| Error::SerializationContext {
            operation: "serialize TD agent".to_string(),
            message: e.to_string(),
        })
    }

    /// Decode MessagePack bytes produced by [`SavedTdAgent::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] for corrupt input and
    /// [`Error::UnsupportedFormatVersion`] for other format versions.
    pub fn from_bytes(bytes: &[u8], source_name: &str) -> Result<Self> {
        let saved: Self = rmp_serde::from_slice(bytes).map_err(|e| Error::Load {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        if saved.version != Self::VERSION {
            return Err(Error::UnsupportedFormatVersion {
                found: saved.version,
                expected: Self::VERSION,
            });
        }
        Ok(saved)
    }

    /// Total learning updates recorded in the snapshot.
    pub fn total_visits(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.visits)).sum()
    }
}
