// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mythiq - an emotionally aware assistant that remembers what you tell it.
//!
//! This is the binary entry point.

mod chat;
mod providers;
mod runtime;
mod shell;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mythiq_config::MythiqConfig;
use mythiq_core::MythiqError;
use tracing::warn;

/// Mythiq - an emotionally aware assistant that remembers what you tell it.
#[derive(Parser, Debug)]
#[command(name = "mythiq", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message and print the reply.
    Chat {
        /// Who is talking.
        #[arg(long, default_value = "local")]
        user: String,
        /// Print the full reply as JSON.
        #[arg(long)]
        json: bool,
        /// The message text.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Launch an interactive REPL session.
    Shell {
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Show store counts and provider health.
    Status {
        /// Also show counts for this user.
        #[arg(long)]
        user: Option<String>,
        /// Output structured JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Delete everything stored about a user.
    Forget {
        #[arg(long)]
        user: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> MythiqConfig {
    let loaded = match path {
        Some(path) => mythiq_config::load_and_validate_path(path),
        None => mythiq_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            mythiq_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, config: MythiqConfig) -> Result<(), MythiqError> {
    let orchestrator = runtime::build_orchestrator(&config).await?;

    let result = match &cli.command {
        Commands::Chat { user, json, message } => {
            chat::run_chat(&orchestrator, user, &message.join(" "), *json).await
        }
        Commands::Shell { user } => shell::run_shell(&orchestrator, user).await,
        Commands::Status { user, json, plain } => {
            status::run_status(&orchestrator, user.as_deref(), *json, *plain).await
        }
        Commands::Forget { user } => chat::run_forget(&orchestrator, user).await,
    };

    finish(result, orchestrator.shutdown().await)
}

/// The command's own error wins; a shutdown error alongside it is logged.
fn finish(
    command: Result<(), MythiqError>,
    shutdown: Result<(), MythiqError>,
) -> Result<(), MythiqError> {
    match (command, shutdown) {
        (Err(err), Err(shutdown)) => {
            warn!(error = %shutdown, "shutdown failed after command error");
            Err(err)
        }
        (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
        (Ok(()), Ok(())) => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    runtime::init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
