//! Train command - Train Q-learning and SARSA paddle agents

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use super::{GameArgs, run_game};
use crate::{
    analysis::rolling_average,
    app::{App, Controller, ControllerSpec, GameConfig, Mode},
    cli::output::{print_kv, print_run_summary, print_section, print_subsection},
    environment::Side,
    pipeline::RunMode,
    q_learning::TrainingMetadata,
};

#[derive(Parser, Debug)]
#[command(about = "Train paddle agents", allow_negative_numbers = true)]
pub struct TrainArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Save the trained left agent to this file
    #[arg(long, short = 'o')]
    pub save_left: Option<PathBuf>,

    /// Save the trained right agent to this file (dual mode)
    #[arg(long)]
    pub save_right: Option<PathBuf>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = args.game.resolve()?;
    apply_save_paths(&mut config, &args)?;

    print_section("Training");
    print_kv("Mode", &config.mode.to_string());
    print_kv("Left", &config.left.to_string());
    if config.mode == Mode::Dual {
        print_kv("Right", &config.right.to_string());
    }
    print_kv("Episodes", &config.training.episodes.to_string());
    print_kv(
        "Step ceiling",
        &config
            .training
            .max_steps_per_episode
            .map_or_else(|| "none".to_string(), |max| max.to_string()),
    );
    if let Some(seed) = config.training.seed {
        print_kv("Seed", &seed.to_string());
    }

    let app = App::new();
    let outcome = run_game(&app, &config, RunMode::Train, &args.game)?;

    print_section("Training Complete");
    print_run_summary(&outcome.result, &outcome.metrics);

    let window = config.training.log_interval;
    if let Some(last) = rolling_average(&outcome.result.left_rewards(), window).last() {
        print_kv(&format!("Left last {window}"), &format!("{last:+.3}"));
    }
    if let Some(last) = rolling_average(&outcome.result.right_rewards(), window).last() {
        print_kv(&format!("Right last {window}"), &format!("{last:+.3}"));
    }

    save_side(&app, &config, Side::Left, &config.left, &outcome.left)?;
    if let Some(right) = &outcome.right {
        save_side(&app, &config, Side::Right, &config.right, right)?;
    }
    Ok(())
}

fn apply_save_paths(config: &mut GameConfig, args: &TrainArgs) -> Result<()> {
    for (side, path) in [(Side::Left, &args.save_left), (Side::Right, &args.save_right)] {
        let Some(path) = path else { continue };
        let spec = match side {
            Side::Left => &mut config.left,
            Side::Right => &mut config.right,
        };
        match spec.agent_spec_mut() {
            Some(agent) => agent.save = Some(path.clone()),
            None => bail!("--save-{side} given but the {side} paddle is scripted"),
        }
    }
    if args.save_right.is_some() && config.mode == Mode::Single {
        bail!("--save-right needs --mode dual");
    }
    Ok(())
}

fn save_side(
    app: &App,
    config: &GameConfig,
    side: Side,
    spec: &ControllerSpec,
    controller: &Controller,
) -> Result<()> {
    let (Some(agent), Some(agent_spec)) = (controller.learner(), spec.agent_spec()) else {
        return Ok(());
    };
    let Some(path) = &agent_spec.save else {
        println!("\nThe {side} agent was not saved (use --save-{side} to keep it)");
        return Ok(());
    };

    let previous = match &agent_spec.load {
        Some(load) => app.load_saved(load)?.metadata.episodes_trained.unwrap_or(0),
        None => 0,
    };
    let opponent = match (config.mode, side) {
        (Mode::Single, _) => None,
        (Mode::Dual, Side::Left) => Some(config.right.to_string()),
        (Mode::Dual, Side::Right) => Some(config.left.to_string()),
    };
    let metadata = TrainingMetadata {
        episodes_trained: Some(previous + config.training.episodes),
        mode: Some(config.mode.to_string()),
        side: Some(side.to_string()),
        opponent,
        seed: config.training.seed,
        saved_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs()),
    };

    app.save_agent(agent, metadata, path)
        .with_context(|| format!("saving the {side} agent to {}", path.display()))?;
    info!(?path, %side, states = agent.q_table().state_count(), "agent saved");

    print_subsection(&format!("Saved {side} agent"));
    print_kv("File", &path.display().to_string());
    print_kv("Table entries", &agent.q_table().size().to_string());
    Ok(())
}
