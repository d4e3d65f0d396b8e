// Copyright 2026 jswatch contributors
// SPDX-License-Identifier: MIT

//! jswatch: daily snapshots of a site's JavaScript, committed to git.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod cli;

use cli::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "jswatch",
    about = "jswatch: snapshot a site's JavaScript every day and keep the history in git",
    version,
    after_help = "Run 'jswatch' with no command to start the daily watcher."
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot now, then again every day at the configured time (default)
    Run,
    /// Take a single snapshot and exit
    Once {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recorded snapshot commits, newest first
    History {
        /// Maximum number of commits to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that git and the output directory are usable
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::run_cmd::run(&cli.overrides).await,
        Commands::Once { json } => cli::run_cmd::run_once(&cli.overrides, json).await,
        Commands::History { limit, json } => {
            cli::history_cmd::run(&cli.overrides, limit, json).await
        }
        Commands::Doctor => cli::doctor::run(&cli.overrides).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "jswatch", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
