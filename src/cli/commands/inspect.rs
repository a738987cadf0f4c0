//! Inspect command - Show what a saved agent has learned

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    app::App,
    cli::output::{format_number, print_kv, print_section, print_subsection},
    q_learning::{LearningSchedule, SavedTdAgent},
    types::{Action, STATE_DIMS},
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a saved agent")]
pub struct InspectArgs {
    /// Path to the saved agent
    pub agent: PathBuf,

    /// List the most visited states
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// One state's row in the inspection listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRow {
    pub state: [i64; STATE_DIMS],
    pub visits: u64,
    pub values: [f64; Action::COUNT],
    pub greedy: Action,
}

/// States of a snapshot ordered by total visits, most visited first.
pub fn most_visited(saved: &SavedTdAgent, top: usize) -> Result<Vec<StateRow>> {
    let agent = saved.to_agent()?;
    let table = agent.q_table();

    let mut rows: Vec<StateRow> = Vec::new();
    for entry in &saved.entries {
        if rows.iter().any(|row| row.state == entry.state.0) {
            continue;
        }
        let visits = Action::ALL
            .iter()
            .map(|&a| u64::from(table.visit_count(&entry.state, a)))
            .sum();
        rows.push(StateRow {
            state: entry.state.0,
            visits,
            values: table.action_values(&entry.state),
            greedy: table.greedy_action(&entry.state),
        });
    }
    rows.sort_by(|a, b| b.visits.cmp(&a.visits).then(a.state.cmp(&b.state)));
    rows.truncate(top);
    Ok(rows)
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let app = App::new();
    let saved = app
        .load_saved(&args.agent)
        .with_context(|| format!("loading {}", args.agent.display()))?;
    let rows = most_visited(&saved, args.top)?;

    if args.json {
        let report = serde_json::json!({
            "algorithm": saved.algorithm,
            "version": saved.version,
            "hyperparameters": saved.hyperparameters,
            "alpha": saved.alpha,
            "steps_done": saved.steps_done,
            "entries": saved.entries.len(),
            "total_visits": saved.total_visits(),
            "metadata": saved.metadata,
            "most_visited": rows,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let schedule =
        LearningSchedule::resume(saved.hyperparameters, saved.alpha, saved.steps_done);
    let states = distinct_states(&saved);

    print_section(&format!("Agent: {}", args.agent.display()));
    print_kv("Algorithm", &saved.algorithm.to_string());
    print_kv("Format version", &saved.version.to_string());
    print_kv("Table entries", &format_number(saved.entries.len()));
    print_kv("States", &format_number(states));
    print_kv("Total updates", &saved.total_visits().to_string());
    print_kv("Exploration steps", &saved.steps_done.to_string());
    print_kv("Current epsilon", &format!("{:.4}", schedule.epsilon()));
    print_kv("Current alpha", &format!("{:.4}", saved.alpha));
    print_kv("Gamma", &format!("{}", saved.hyperparameters.gamma));

    let meta = &saved.metadata;
    print_subsection("Training");
    if let Some(episodes) = meta.episodes_trained {
        print_kv("Episodes", &format_number(episodes));
    }
    if let Some(mode) = &meta.mode {
        print_kv("Mode", mode);
    }
    if let Some(side) = &meta.side {
        print_kv("Side", side);
    }
    if let Some(opponent) = &meta.opponent {
        print_kv("Opponent", opponent);
    }
    if let Some(seed) = meta.seed {
        print_kv("Seed", &seed.to_string());
    }
    if let Some(saved_at) = meta.saved_at {
        print_kv("Saved at (unix)", &saved_at.to_string());
    }

    if !rows.is_empty() {
        print_subsection("Most visited states");
        println!(
            "  {:<28} {:>8} {:>9} {:>9} {:>9}  greedy",
            "state", "visits", "stay", "up", "down"
        );
        for row in &rows {
            println!(
                "  {:<28} {:>8} {:>9.3} {:>9.3} {:>9.3}  {:?}",
                format!("{:?}", row.state),
                row.visits,
                row.values[0],
                row.values[1],
                row.values[2],
                row.greedy
            );
        }
    }
    Ok(())
}

fn distinct_states(saved: &SavedTdAgent) -> usize {
    let mut states: Vec<[i64; STATE_DIMS]> = saved.entries.iter().map(|e| e.state.0).collect();
    states.sort_unstable();
    states.dedup();
    states.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ports::Agent,
        q_learning::{Hyperparameters, TdAlgorithm, TrainingMetadata},
        types::DiscreteState,
    };

    #[test]
    fn test_most_visited_orders_by_visits() {
        let app = App::new();
        let mut agent = app
            .create_agent(TdAlgorithm::QLearning, Hyperparameters::q_learning())
            .unwrap();
        let busy = DiscreteState::new([1, 1, 0, 0, 1, 1]);
        let quiet = DiscreteState::new([2, 2, 1, 1, 2, 2]);
        for _ in 0..3 {
            agent.observe(&busy, Action::MoveDown, 1.0, &busy);
        }
        agent.observe(&quiet, Action::Stay, -1.0, &quiet);

        let saved = SavedTdAgent::from_agent(&agent, TrainingMetadata::default());
        let rows = most_visited(&saved, 10).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].state, busy.0);
        assert_eq!(rows[0].visits, 3);
        assert_eq!(rows[0].greedy, Action::MoveDown);
        assert_eq!(rows[1].visits, 1);
        assert_eq!(distinct_states(&saved), 2);

        assert_eq!(most_visited(&saved, 1).unwrap().len(), 1);
    }
}
