//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training and testing
//! runs, allowing composable data collection without coupling the loop to
//! specific output formats or metrics.

use crate::{
    Result,
    pipeline::{EpisodeResult, StepEvent},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during a run.
/// Examples include:
/// - Progress bars for user feedback
/// - CSV reward export for plotting
/// - Periodic log lines
/// - Metrics tracking for evaluation
///
/// # Design Philosophy
///
/// This trait represents a **port** in hexagonal architecture - a boundary
/// between the training pipeline and external observation mechanisms.
/// Different observation strategies are **adapters** that implement this port.
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(event)` - For each environment step
///    - `on_episode_end(result)`
/// 3. `on_training_end()` - Once at the end
///
/// Errors returned by an observer abort the run and reach the caller.
///
/// # Examples
///
/// ```no_run
/// use pong_rl::{pipeline::EpisodeResult, ports::Observer};
///
/// struct LongestRally {
///     best: usize,
/// }
///
/// impl Observer for LongestRally {
///     fn on_episode_end(&mut self, result: &EpisodeResult) -> pong_rl::Result<()> {
///         self.best = self.best.max(result.steps);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when the run starts.
    ///
    /// # Parameters
    ///
    /// * `total_episodes` - Total number of episodes that will be played
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after the environment is reset for a new episode.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the episode (0-based)
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each environment step, before any learning update.
    fn on_step(&mut self, _event: &StepEvent) -> Result<()> {
        Ok(())
    }

    /// Called when an episode terminates or is truncated.
    fn on_episode_end(&mut self, _result: &EpisodeResult) -> Result<()> {
        Ok(())
    }

    /// Called when the run completes.
    ///
    /// Use this to finalize outputs, flush files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
