//! Analysis of reward series produced by training and testing runs
//!
//! These are the numbers behind reward plots: trailing means for learning
//! curves and descriptive summaries for reports.

pub mod stats;

pub use stats::{RewardSummary, rolling_average};
