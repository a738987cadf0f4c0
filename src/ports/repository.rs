//! Repository port for agent persistence.
//!
//! This module defines the trait boundary between the domain and
//! infrastructure layers for storing and retrieving trained agents.

use std::path::Path;

use crate::{Result, q_learning::SavedTdAgent};

/// Port for persisting and loading trained TD agents.
///
/// This trait abstracts the storage mechanism, allowing different
/// implementations (MessagePack files, in-memory maps) without coupling the
/// domain logic to a specific location or format.
///
/// # Examples
///
/// ```no_run
/// use pong_rl::ports::AgentRepository;
/// use pong_rl::q_learning::SavedTdAgent;
/// use std::path::Path;
///
/// fn checkpoint<R: AgentRepository>(
///     repo: &R,
///     agent: &SavedTdAgent,
///     path: &Path,
/// ) -> pong_rl::Result<()> {
///     repo.save(agent, path)
/// }
/// ```
pub trait AgentRepository {
    /// Save an agent snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be created or written to
    /// - Serialization fails
    fn save(&self, agent: &SavedTdAgent, path: &Path) -> Result<()>;

    /// Load an agent snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Load`] if the snapshot is missing or corrupt,
    /// and [`crate::Error::UnsupportedFormatVersion`] if it was written by
    /// another format version. A failed load never yields a fresh agent.
    fn load(&self, path: &Path) -> Result<SavedTdAgent>;
}
