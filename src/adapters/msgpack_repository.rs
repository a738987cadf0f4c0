//! MessagePack implementation of the agent repository.
//!
//! This adapter implements the AgentRepository port using rmp_serde for
//! compact binary serialization.

use std::{fs, path::Path};

use tracing::debug;

use crate::{Result, error::Error, ports::AgentRepository, q_learning::SavedTdAgent};

/// MessagePack-based agent repository.
///
/// Provides persistent storage using the MessagePack binary format via rmp_serde.
///
/// # Examples
///
/// ```no_run
/// use pong_rl::adapters::MsgPackRepository;
/// use pong_rl::ports::AgentRepository;
/// use pong_rl::q_learning::{Hyperparameters, QLearningAgent, SavedTdAgent, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let agent = QLearningAgent::new(Hyperparameters::q_learning())?;
/// let saved = SavedTdAgent::from_q_learning(&agent, TrainingMetadata::default());
///
/// repo.save(&saved, Path::new("left.msgpack"))?;
/// let loaded = repo.load(Path::new("left.msgpack"))?;
/// # Ok::<(), pong_rl::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl AgentRepository for MsgPackRepository {
    fn save(&self, agent: &SavedTdAgent, path: &Path) -> Result<()> {
        let bytes = agent.to_bytes()?;
        fs::write(path, bytes).map_err(|source| Error::Io {
            operation: format!("write agent to {path:?}"),
            source,
        })?;
        debug!(path = %path.display(), entries = agent.entries.len(), "saved agent");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedTdAgent> {
        let source_name = path.display().to_string();
        let bytes = fs::read(path).map_err(|e| Error::Load {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        SavedTdAgent::from_bytes(&bytes, &source_name)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        ports::Agent,
        q_learning::{Hyperparameters, SarsaAgent, TrainingMetadata},
        types::{Action, DiscreteState},
    };

    fn saved_agent() -> SavedTdAgent {
        let mut agent = SarsaAgent::new(Hyperparameters::sarsa())
            .expect("valid hyperparameters")
            .with_seed(3);
        let s = DiscreteState::new([1, 2, 0, 0, 3, 3]);
        let t = DiscreteState::new([2, 2, 0, 0, 3, 3]);
        agent.observe(&s, Action::MoveUp, 1.0, &t);
        SavedTdAgent::from_sarsa(&agent, TrainingMetadata::default())
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("agent.msgpack");

        let repo = MsgPackRepository::new();
        let saved = saved_agent();

        repo.save(&saved, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(saved, loaded);
    }

    #[test]
    fn test_load_nonexistent_returns_load_error() {
        let repo = MsgPackRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_12345.msgpack"));
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_load_corrupt_file_returns_load_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("corrupt.msgpack");
        fs::write(&file_path, b"definitely not msgpack").expect("write");

        let result = MsgPackRepository::new().load(&file_path);
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(&saved_agent(), Path::new("/invalid_dir_12345/file.msgpack"));
        assert!(result.is_err());
    }
}
