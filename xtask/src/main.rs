use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod external;

use cli::{Cli, Commands};
use commands::bump::BumpCommand;
use commands::doctor::DoctorCommand;
use commands::fixture::FixtureCommand;
use commands::fmt::FmtCommand;
use commands::lint::LintCommand;
use commands::test::TestCommand;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        // Default behavior: cargo xtask (no subcommand) - list the tasks
        None => tokio::runtime::Runtime::new()?.block_on(async { commands::show_tasks().await }),
        Some(Commands::Fmt { check }) => tokio::runtime::Runtime::new()?
            .block_on(async { FmtCommand::new(check).execute().await }),
        Some(Commands::Lint) => {
            tokio::runtime::Runtime::new()?.block_on(async { LintCommand::new().execute().await })
        }
        Some(Commands::Test { keep_running }) => tokio::runtime::Runtime::new()?
            .block_on(async { TestCommand::new(keep_running).execute().await }),
        Some(Commands::Bump { level, dry_run }) => tokio::runtime::Runtime::new()?
            .block_on(async { BumpCommand::new(level, dry_run).execute().await }),
        Some(Commands::Fixture { action }) => tokio::runtime::Runtime::new()?
            .block_on(async { FixtureCommand::new(action).execute().await }),
        Some(Commands::Doctor) => {
            tokio::runtime::Runtime::new()?.block_on(async { DoctorCommand::new().execute().await })
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
