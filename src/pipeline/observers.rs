//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    collections::VecDeque,
    fs::File,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    pipeline::training::{EpisodeResult, EpisodeReward, StepEvent},
    ports::Observer,
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    reward_sum: f64,
    episodes: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            reward_sum: 0.0,
            episodes: 0,
        }
    }

    fn message(&self) -> String {
        let mean = if self.episodes == 0 {
            0.0
        } else {
            self.reward_sum / self.episodes as f64
        };
        format!("{mean:+.3}")
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (mean reward {msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, result: &EpisodeResult) -> Result<()> {
        self.reward_sum += result.reward.left();
        self.episodes += 1;

        if let Some(pb) = &self.progress_bar {
            pb.set_position((result.episode + 1) as u64);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MetricsState {
    episodes: usize,
    total_steps: usize,
    left_misses: usize,
    right_misses: usize,
    truncated: usize,
    left_hits: u64,
    right_hits: u64,
    left_reward: f64,
    right_reward: Option<f64>,
    longest_episode: usize,
}

/// Metrics observer - Tracks run metrics
///
/// Clones share the same counters, so keep a clone before handing the
/// observer to a pipeline and read [`MetricsObserver::summary`] afterwards.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    state: Arc<Mutex<MetricsState>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MetricsState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let s = self.state();
        let per_episode = |value: f64| {
            if s.episodes == 0 {
                0.0
            } else {
                value / s.episodes as f64
            }
        };
        MetricsSummary {
            episodes: s.episodes,
            total_steps: s.total_steps,
            avg_episode_length: per_episode(s.total_steps as f64),
            longest_episode: s.longest_episode,
            left_misses: s.left_misses,
            right_misses: s.right_misses,
            truncated: s.truncated,
            avg_left_hits: per_episode(s.left_hits as f64),
            avg_right_hits: s.right_reward.map(|_| per_episode(s.right_hits as f64)),
            mean_left_reward: per_episode(s.left_reward),
            mean_right_reward: s.right_reward.map(per_episode),
        }
    }
}

/// Summary of run metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub total_steps: usize,
    pub avg_episode_length: f64,
    pub longest_episode: usize,
    pub left_misses: usize,
    pub right_misses: usize,
    pub truncated: usize,
    pub avg_left_hits: f64,
    pub avg_right_hits: Option<f64>,
    pub mean_left_reward: f64,
    pub mean_right_reward: Option<f64>,
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, event: &StepEvent) -> Result<()> {
        if !event.done {
            return Ok(());
        }
        let mut s = self.state();
        match event.reward {
            EpisodeReward::Single(_) => s.left_misses += 1,
            // The side that missed is paid less than the side that scored.
            EpisodeReward::Dual { left, right } if left < right => s.left_misses += 1,
            EpisodeReward::Dual { .. } => s.right_misses += 1,
        }
        Ok(())
    }

    fn on_episode_end(&mut self, result: &EpisodeResult) -> Result<()> {
        let mut s = self.state();
        s.episodes += 1;
        s.total_steps += result.steps;
        s.longest_episode = s.longest_episode.max(result.steps);
        s.left_hits += u64::from(result.info.left_hits);
        s.right_hits += u64::from(result.info.right_hits);
        s.left_reward += result.reward.left();
        if let Some(right) = result.reward.right() {
            *s.right_reward.get_or_insert(0.0) += right;
        }
        if result.truncated {
            s.truncated += 1;
        }
        Ok(())
    }
}

/// Logging observer - periodic progress lines through `tracing`
///
/// Every `interval` episodes it logs the mean reward over the last
/// `interval` episodes.
pub struct LoggingObserver {
    interval: usize,
    recent: VecDeque<EpisodeReward>,
}

impl LoggingObserver {
    pub fn new(interval: usize) -> Self {
        let interval = interval.max(1);
        Self {
            interval,
            recent: VecDeque::with_capacity(interval),
        }
    }
}

impl Observer for LoggingObserver {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        self.recent.clear();
        Ok(())
    }

    fn on_episode_end(&mut self, result: &EpisodeResult) -> Result<()> {
        if self.recent.len() == self.interval {
            self.recent.pop_front();
        }
        self.recent.push_back(result.reward);

        let completed = result.episode + 1;
        if completed.is_multiple_of(self.interval) {
            let n = self.recent.len() as f64;
            let avg_left = self.recent.iter().map(EpisodeReward::left).sum::<f64>() / n;
            let right: Vec<f64> = self.recent.iter().filter_map(EpisodeReward::right).collect();
            if right.is_empty() {
                info!(episode = completed, avg_reward = avg_left, "training progress");
            } else {
                let avg_right = right.iter().sum::<f64>() / right.len() as f64;
                info!(
                    episode = completed,
                    avg_left_reward = avg_left,
                    avg_right_reward = avg_right,
                    "training progress"
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RewardRow {
    episode: usize,
    left_reward: f64,
    right_reward: Option<f64>,
    steps: usize,
    truncated: bool,
}

/// CSV observer - per-episode rewards for plotting
///
/// Writes `episode,left_reward,right_reward,steps,truncated`; the right
/// column is empty for single-paddle runs.
pub struct CsvRewardObserver {
    writer: csv::Writer<File>,
}

impl CsvRewardObserver {
    /// Create a new CSV observer, truncating any existing file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
        })
    }
}

impl Observer for CsvRewardObserver {
    fn on_episode_end(&mut self, result: &EpisodeResult) -> Result<()> {
        self.writer.serialize(RewardRow {
            episode: result.episode,
            left_reward: result.reward.left(),
            right_reward: result.reward.right(),
            steps: result.steps,
            truncated: result.truncated,
        })?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{environment::StepInfo, types::{Action, DiscreteState}};

    fn episode(episode: usize, reward: EpisodeReward, steps: usize) -> EpisodeResult {
        EpisodeResult {
            episode,
            reward,
            steps,
            truncated: false,
            info: StepInfo {
                left_hits: 2,
                right_hits: 0,
            },
        }
    }

    fn terminal_step(reward: EpisodeReward) -> StepEvent {
        let state = DiscreteState::new([0, 5, -1, 0, 4, 4]);
        StepEvent {
            episode: 0,
            step: 10,
            state,
            left_action: Action::Stay,
            right_action: None,
            reward,
            next_state: state,
            done: true,
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();
        let handle = observer.clone();

        assert_eq!(handle.summary().episodes, 0);

        observer
            .on_step(&terminal_step(EpisodeReward::Single(-1.0)))
            .unwrap();
        observer
            .on_episode_end(&episode(0, EpisodeReward::Single(1.0), 40))
            .unwrap();
        observer
            .on_episode_end(&episode(1, EpisodeReward::Single(3.0), 80))
            .unwrap();

        let summary = handle.summary();
        assert_eq!(summary.episodes, 2);
        assert_eq!(summary.left_misses, 1);
        assert_eq!(summary.longest_episode, 80);
        assert!((summary.avg_episode_length - 60.0).abs() < 1e-12);
        assert!((summary.mean_left_reward - 2.0).abs() < 1e-12);
        assert!((summary.avg_left_hits - 2.0).abs() < 1e-12);
        assert_eq!(summary.mean_right_reward, None);
    }

    #[test]
    fn test_metrics_attributes_dual_miss() {
        let mut observer = MetricsObserver::new();
        observer
            .on_step(&terminal_step(EpisodeReward::Dual {
                left: 1.0,
                right: -1.0,
            }))
            .unwrap();
        observer
            .on_episode_end(&episode(
                0,
                EpisodeReward::Dual {
                    left: 1.0,
                    right: -1.0,
                },
                12,
            ))
            .unwrap();
        let summary = observer.summary();
        assert_eq!(summary.right_misses, 1);
        assert_eq!(summary.left_misses, 0);
        assert_eq!(summary.mean_right_reward, Some(-1.0));
    }

    #[test]
    fn test_csv_observer_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rewards.csv");

        let mut observer = CsvRewardObserver::new(&path).unwrap();
        observer
            .on_episode_end(&episode(0, EpisodeReward::Single(-1.0), 30))
            .unwrap();
        observer
            .on_episode_end(&episode(1, EpisodeReward::Single(2.0), 90))
            .unwrap();
        observer.on_training_end().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "episode,left_reward,right_reward,steps,truncated");
        assert_eq!(lines[1], "0,-1.0,,30,false");
        assert_eq!(lines[2], "1,2.0,,90,false");
    }

    #[test]
    fn test_logging_observer_keeps_window() {
        let mut observer = LoggingObserver::new(2);
        for i in 0..5 {
            observer
                .on_episode_end(&episode(i, EpisodeReward::Single(i as f64), 1))
                .unwrap();
        }
        assert_eq!(observer.recent.len(), 2);
        assert_eq!(observer.recent.back(), Some(&EpisodeReward::Single(4.0)));
    }
}
