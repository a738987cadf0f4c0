//! Training and testing pipeline
//!
//! This module provides:
//! - The episode loops for single- and dual-paddle courts
//! - Observers that record what happens during a run
//! - Scripted opponents for the dual court

pub mod observers;
pub mod opponents;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    CsvRewardObserver, LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver,
};
pub use opponents::{Difficulty, TrackingOpponent};
pub use training::{
    EpisodeResult, EpisodeReward, RunMode, RunResult, StepEvent, TrainingConfig, TrainingPipeline,
};

pub use crate::ports::{Agent, Observer};
