//! CLI infrastructure for pong-rl
//!
//! Commands for training agents, testing them with greedy play and
//! inspecting saved agents.

pub mod commands;
pub mod output;
