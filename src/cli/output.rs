//! Output formatting for CLI

use crate::{
    analysis::RewardSummary,
    pipeline::{MetricsSummary, RunResult},
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

fn print_reward_summary(label: &str, rewards: &[f64]) {
    let Some(summary) = RewardSummary::from_rewards(rewards) else {
        return;
    };
    print_subsection(label);
    print_kv("Mean", &format!("{:+.3}", summary.mean));
    print_kv("Std dev", &format!("{:.3}", summary.std_dev));
    print_kv("Min / max", &format!("{:+.1} / {:+.1}", summary.min, summary.max));
}

/// Print the outcome of a training or testing run
pub fn print_run_summary(result: &RunResult, metrics: &MetricsSummary) {
    print_kv("Episodes", &format_number(metrics.episodes));
    print_kv("Total steps", &format_number(metrics.total_steps));
    print_kv("Avg length", &format!("{:.1}", metrics.avg_episode_length));
    print_kv("Longest", &format_number(metrics.longest_episode));
    print_kv("Truncated", &format_number(metrics.truncated));
    print_kv("Avg left hits", &format!("{:.2}", metrics.avg_left_hits));
    print_kv("Left misses", &format_number(metrics.left_misses));
    if let Some(hits) = metrics.avg_right_hits {
        print_kv("Avg right hits", &format!("{hits:.2}"));
        print_kv("Right misses", &format_number(metrics.right_misses));
    }

    let right = result.right_rewards();
    if right.is_empty() {
        print_reward_summary("Reward per episode", &result.left_rewards());
    } else {
        print_reward_summary("Left reward per episode", &result.left_rewards());
        print_reward_summary("Right reward per episode", &right);
    }
}
