//! Tabular reinforcement learning for a paddle-and-ball game
//!
//! This crate provides:
//! - Pong physics for a single-paddle court (against a wall) and a
//!   dual-paddle court (two paddles facing each other)
//! - A discretizer mapping continuous court states to integer bins
//! - Q-learning and SARSA agents with visit-count-adaptive learning rates
//!   and epsilon-greedy exploration
//! - Training and testing loops with pluggable observers, scripted
//!   opponents and versioned agent persistence

pub mod adapters;
pub mod analysis;
pub mod app;
pub mod cli;
pub mod discretizer;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;
pub mod utils;

pub use discretizer::Discretizer;
pub use environment::{
    DualPaddleEnv, Environment, PhysicsConfig, RewardConfig, Side, SinglePaddleEnv, StepInfo,
};
pub use error::{Error, Result};
pub use q_learning::{Hyperparameters, QLearningAgent, SarsaAgent, TdAgent};
pub use types::{Action, DiscreteState};
