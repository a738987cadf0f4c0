//! pong-rl CLI - train and test tabular agents on a Pong court
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pong-rl")]
#[command(version, about = "Q-learning and SARSA agents for Pong", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train agents, optionally resuming from saved ones
    Train(Box<pong_rl::cli::commands::train::TrainArgs>),

    /// Run greedy episodes without learning
    Test(Box<pong_rl::cli::commands::test::TestArgs>),

    /// Show the contents of a saved agent
    Inspect(pong_rl::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => pong_rl::cli::commands::train::execute(*args),
        Commands::Test(args) => pong_rl::cli::commands::test::execute(*args),
        Commands::Inspect(args) => pong_rl::cli::commands::inspect::execute(args),
    }
}
