// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mythiq status` command implementation.
//!
//! Reports Knowledge Store counts and the health of every configured
//! provider. Health is per process, so a fresh invocation shows every
//! circuit closed.

use std::io::IsTerminal;

use mythiq_agent::{Orchestrator, OrchestratorStatus};
use mythiq_core::{MythiqError, StoreStats};
use mythiq_gateway::HealthSnapshot;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: OrchestratorStatus,
    /// Counts for the user named with `--user`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserStatus>,
}

#[derive(Debug, Serialize)]
pub struct UserStatus {
    pub user_id: String,
    pub stats: StoreStats,
}

/// Run the `mythiq status` command.
pub async fn run_status(
    orchestrator: &Orchestrator,
    user_id: Option<&str>,
    json: bool,
    plain: bool,
) -> Result<(), MythiqError> {
    let status = orchestrator.status().await;
    let user = match user_id {
        Some(id) => Some(UserStatus {
            user_id: id.to_string(),
            stats: orchestrator.user_stats(id).await?,
        }),
        None => None,
    };
    let response = StatusResponse { status, user };

    if json {
        println!("{}", render_json(&response)?);
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }
    Ok(())
}

fn render_json(response: &StatusResponse) -> Result<String, MythiqError> {
    serde_json::to_string_pretty(response)
        .map_err(|e| MythiqError::Internal(format!("failed to encode status: {e}")))
}

fn print_status(response: &StatusResponse, use_color: bool) {
    let status = &response.status;
    println!();
    println!("  mythiq status");
    println!("  {}", "-".repeat(35));

    match &status.store {
        Some(stats) => println!("    Store:    {} ({})", status.store_backend, format_counts(stats)),
        None if use_color => {
            use colored::Colorize;
            println!("    Store:    {} {}", status.store_backend, "unreadable".red());
        }
        None => println!("    Store:    {} [FAIL] unreadable", status.store_backend),
    }
    if let Some(user) = &response.user {
        println!("    User:     {} ({})", user.user_id, format_counts(&user.stats));
    }
    if status.deferred_batches > 0 {
        println!("    Deferred: {} batch(es) awaiting the store", status.deferred_batches);
    }

    println!();
    if status.providers.is_empty() {
        println!("    Providers: none configured, replies come from the local responder");
    } else {
        println!("    Providers (priority order):");
        for snapshot in &status.providers {
            println!("      {}", format_provider(snapshot, use_color));
        }
    }
    println!();
}

fn format_counts(stats: &StoreStats) -> String {
    format!(
        "{} users, {} facts, {} turns",
        stats.distinct_users, stats.fact_count, stats.turn_count
    )
}

/// One line per provider: name, circuit state, counters.
fn format_provider(snapshot: &HealthSnapshot, use_color: bool) -> String {
    use mythiq_gateway::CircuitState;

    let state = snapshot.state.to_string();
    let state = if use_color {
        use colored::Colorize;
        match snapshot.state {
            CircuitState::Closed => state.green().to_string(),
            CircuitState::HalfOpen => state.yellow().to_string(),
            CircuitState::Open => state.red().to_string(),
        }
    } else {
        state
    };
    let mut line = format!(
        "{:<12} {state} (ok {}, failed {})",
        snapshot.provider.as_str(),
        snapshot.total_successes,
        snapshot.total_failures
    );
    if let Some(secs) = snapshot.open_for_secs {
        line.push_str(&format!(", retry in {secs}s"));
    }
    line
}
