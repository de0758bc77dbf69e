// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tagarela - resilient conversation layer for a group chat assistant.
//!
//! This is the binary entry point. It loads configuration, installs logging,
//! and dispatches to the batch and memory maintenance commands.

mod memory;
mod process;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tagarela_config::{ConfigError, TagarelaConfig};

/// Tagarela - resilient conversation layer for a group chat assistant.
#[derive(Parser, Debug)]
#[command(name = "tagarela", version, about, long_about = None)]
struct Cli {
    /// Explicit config file. Defaults to the XDG lookup.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Process one batch of inbound messages and print the result as JSON.
    Process {
        /// JSON file holding an array of messages. Reads stdin when omitted.
        input: Option<PathBuf>,
        /// Group used for messages that carry no group id.
        #[arg(long, default_value = "direct")]
        group: String,
    },
    /// Inspect or edit long-term user memory.
    Memory {
        #[command(subcommand)]
        action: MemoryCommand,
    },
    /// Manage Tagarela configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MemoryCommand {
    /// Print everything remembered about a user.
    Show { user_id: String },
    /// Remove one remembered value.
    Forget {
        user_id: String,
        /// Category label, e.g. `gostos` or `hobbies`.
        category: String,
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, then print a summary.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            tagarela_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Process { input, group } => {
            process::run_process(&config, input.as_deref(), &group).await
        }
        Commands::Memory { action } => match action {
            MemoryCommand::Show { user_id } => memory::run_show(&config, &user_id).await,
            MemoryCommand::Forget {
                user_id,
                category,
                value,
            } => memory::run_forget(&config, &user_id, &category, &value).await,
        },
        Commands::Config {
            action: ConfigCommand::Check,
        } => {
            print_config_summary(&config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("tagarela: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: Option<&std::path::Path>) -> Result<TagarelaConfig, Vec<ConfigError>> {
    match path {
        Some(path) => tagarela_config::load_and_validate_path(path),
        None => tagarela_config::load_and_validate(),
    }
}

fn print_config_summary(config: &TagarelaConfig) {
    println!("config ok");
    println!("  agent.name       = {}", config.agent.name);
    println!("  upstream.endpoint = {}", config.upstream.endpoint);
    println!("  upstream.model   = {}", config.upstream.model);
    println!(
        "  upstream.api_key = {}",
        if config.upstream.api_key.is_some() {
            "set"
        } else {
            "from environment"
        }
    );
    println!("  storage.database_path = {}", config.storage.database_path);
    println!(
        "  operator alerts  = {}",
        config.agent.operator_id.as_deref().unwrap_or("disabled")
    );
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tagarela={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
