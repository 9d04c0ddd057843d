// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mythiq shell` command implementation.
//!
//! Line-oriented REPL with readline history. Every line is one
//! `Orchestrator::chat` call for the same user; a handful of slash commands
//! inspect what has been learned.

use colored::Colorize;
use mythiq_agent::Orchestrator;
use mythiq_core::MythiqError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::chat::reply_footer;

/// Input recognised by the REPL.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Facts,
    Help,
    Empty,
    Message(&'a str),
}

fn parse_input(line: &str) -> ShellInput<'_> {
    match line.trim() {
        "" => ShellInput::Empty,
        "/quit" | "/exit" => ShellInput::Quit,
        "/facts" => ShellInput::Facts,
        "/help" => ShellInput::Help,
        other => ShellInput::Message(other),
    }
}

/// Runs the `mythiq shell` interactive REPL.
pub async fn run_shell(orchestrator: &Orchestrator, user_id: &str) -> Result<(), MythiqError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| MythiqError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "mythiq shell".bold().green());
    println!("Talking as {}. Type {} for commands, {} to exit.\n", user_id.cyan(), "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", user_id.green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match parse_input(&line) {
            ShellInput::Empty => continue,
            ShellInput::Quit => break,
            ShellInput::Help => print_help(),
            ShellInput::Facts => print_facts(orchestrator, user_id).await,
            ShellInput::Message(message) => {
                let _ = rl.add_history_entry(message);
                match orchestrator.chat(user_id, message).await {
                    Ok(reply) => {
                        println!("{}", reply.response);
                        println!("{}", reply_footer(&reply, true));
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
        }
    }

    let pending = orchestrator.flush_deferred().await;
    if pending > 0 {
        debug!(pending, "deferred learning left unwritten at exit");
        eprintln!("{}", format!("{pending} learning batch(es) could not be saved").yellow());
    }
    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn print_help() {
    println!("  /facts   show what has been learned about you");
    println!("  /help    show this list");
    println!("  /quit    leave the shell");
}

async fn print_facts(orchestrator: &Orchestrator, user_id: &str) {
    match orchestrator.facts(user_id).await {
        Ok(facts) if facts.is_empty() => println!("{}", "nothing learned yet".dimmed()),
        Ok(facts) => {
            for fact in facts {
                println!(
                    "  {} = {} {}",
                    fact.key.bold(),
                    fact.value,
                    format!("(turn {})", fact.source_turn).dimmed()
                );
            }
        }
        Err(e) => eprintln!("{}: {e}", "error".red()),
    }
}
