//! In-memory agent repository for testing.
//!
//! This adapter provides a pure in-memory implementation of AgentRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::AgentRepository, q_learning::SavedTdAgent};

/// In-memory repository for testing.
///
/// Stores encoded agents in a shared HashMap keyed by path, so the same
/// encode/decode path as the file repository is exercised.
///
/// # Examples
///
/// ```
/// use pong_rl::adapters::InMemoryRepository;
/// use pong_rl::ports::AgentRepository;
/// use pong_rl::q_learning::{Hyperparameters, QLearningAgent, SavedTdAgent, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = QLearningAgent::new(Hyperparameters::q_learning())?;
/// let saved = SavedTdAgent::from_q_learning(&agent, TrainingMetadata::default());
///
/// repo.save(&saved, Path::new("left"))?;
/// let loaded = repo.load(Path::new("left"))?;
/// assert_eq!(saved, loaded);
/// # Ok::<(), pong_rl::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still a valid map.
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the number of agents currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored agents.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if an agent exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    /// Store raw bytes at a path, bypassing encoding.
    pub fn insert_raw(&self, path: &Path, bytes: Vec<u8>) {
        self.storage().insert(key(path), bytes);
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl AgentRepository for InMemoryRepository {
    fn save(&self, agent: &SavedTdAgent, path: &Path) -> Result<()> {
        let bytes = agent.to_bytes()?;
        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedTdAgent> {
        let source_name = key(path);
        let storage = self.storage();
        let bytes = storage.get(&source_name).ok_or_else(|| Error::Load {
            source_name: source_name.clone(),
            message: "key not found in memory".to_string(),
        })?;
        SavedTdAgent::from_bytes(bytes, &source_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::{Hyperparameters, QLearningAgent, TrainingMetadata};

    fn saved_agent() -> SavedTdAgent {
        let agent = QLearningAgent::new(Hyperparameters::q_learning()).unwrap();
        SavedTdAgent::from_q_learning(&agent, TrainingMetadata::default())
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let saved = saved_agent();
        let path = Path::new("left");

        // Initially empty
        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&saved, path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));

        let loaded = repo.load(path).unwrap();
        assert_eq!(saved, loaded);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        let result = repo.load(Path::new("nonexistent"));
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_corrupt_bytes_return_load_error() {
        let repo = InMemoryRepository::new();
        repo.insert_raw(Path::new("bad"), vec![0xc1, 0xc1]);
        assert!(matches!(
            repo.load(Path::new("bad")),
            Err(Error::Load { .. })
        ));
    }

    #[test]
    fn test_clear_removes_all() {
        let repo = InMemoryRepository::new();
        let saved = saved_agent();

        repo.save(&saved, Path::new("a1")).unwrap();
        repo.save(&saved, Path::new("a2")).unwrap();
        assert_eq!(repo.count(), 2);

        repo.clear();
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();
        let path = Path::new("shared");

        repo1.save(&saved_agent(), path).unwrap();
        assert!(repo2.load(path).is_ok());
        assert_eq!(repo2.count(), 1);
    }
}
