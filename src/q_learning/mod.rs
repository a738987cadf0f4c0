//! Q-learning and SARSA temporal difference learning
//!
//! Tabular TD agents keyed by discretized court states. Each agent owns a
//! value table, a visit-count table and a [`LearningSchedule`].
//!
//! ## Algorithms
//!
//! - **Q-learning**: Off-policy TD control that learns optimal Q* values
//! - **SARSA**: On-policy TD control that learns Q^π for the followed policy
//!
//! ## Key Differences
//!
//! | Aspect | Q-learning | SARSA |
//! |--------|------------|-------|
//! | Policy | Off-policy (learns Q*) | On-policy (learns Q^π) |
//! | Update | Uses max_a Q(s',a') | Uses Q(s',a') for a freshly drawn a' |
//! | Exploration counter | Advanced by `choose_action` only | Also advanced inside `observe` |
//!
//! Both use the per-pair learning rate `max(alpha_end, alpha / (1 + visits))`
//! and decay the global `alpha` after every update.
//!
//! ## Usage Example
//!
//! ```no_run
//! use pong_rl::q_learning::{Hyperparameters, QLearningAgent, SarsaAgent};
//!
//! let q_agent = QLearningAgent::new(Hyperparameters::q_learning())?.with_seed(42);
//! let sarsa_agent = SarsaAgent::new(Hyperparameters::sarsa())?;
//! # Ok::<(), pong_rl::Error>(())
//! ```

pub mod agent;
pub mod q_table;
pub mod schedule;
pub mod serialization;

// Public re-exports
pub use agent::{QLearningAgent, SarsaAgent, TdAgent};
pub use q_table::{QTable, TableEntry};
pub use schedule::{HyperparameterOverrides, Hyperparameters, LearningSchedule};
pub use serialization::{SavedTdAgent, TdAlgorithm, TrainingMetadata};
