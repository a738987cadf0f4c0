//! Statistics over per-episode reward series

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Trailing mean over a sliding window.
///
/// Element `i` of the output is the mean of `values[i + 1 - window ..= i]`,
/// so the output has `values.len() - window + 1` elements. Returns an empty
/// vector when the window is zero or longer than the series.
///
/// # Examples
///
/// ```
/// use pong_rl::analysis::rolling_average;
///
/// assert_eq!(rolling_average(&[1.0, 3.0, 5.0, 7.0], 2), vec![2.0, 4.0, 6.0]);
/// ```
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Descriptive statistics of a reward series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; zero for fewer than two values
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl RewardSummary {
    /// Summarize a series; `None` when it is empty.
    pub fn from_rewards(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            values.iter().std_dev()
        };
        Some(Self {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
