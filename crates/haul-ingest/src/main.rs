//! haul-ingest - Main entry point

use anyhow::Context;
use clap::Parser;
use console::Term;
use haul_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use haul_ingest::config::{RunContext, StoreConfig};
use haul_ingest::{commands, Cli, Commands};
use std::io::IsTerminal;
use std::process;
use tracing::{error, warn};

fn main() {
    let cli = Cli::parse();

    // Per-record outcomes are info events; verbose adds parser diagnostics.
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        })
        .output(LogOutput::Console)
        .log_file_prefix("haul-ingest")
        .build();

    // Environment variables take precedence
    let log_config = match log_config.clone().merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring invalid HAUL_LOG_* setting: {:#}", e);
            log_config
        },
    };

    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {:#}", e);
            None
        },
    };

    if let Err(err) = execute_command(&cli) {
        error!(error = %format!("{:#}", err), "Command failed");
        eprintln!("Error: {:?}", err);
        acknowledge(cli.no_pause);
        process::exit(1);
    }
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run { paths } => {
            let ctx = RunContext::new(load_store_config(cli)?, paths.clone().into());
            commands::run::run(&ctx).context("Ingestion run failed")?;
        },

        Commands::Status { paths } => {
            commands::status::run(&paths.clone().into()).context("Failed to read intake status")?;
        },

        Commands::Delete { mc_number } => {
            let config = load_store_config(cli)?;
            commands::delete::run(&config, *mc_number)
                .with_context(|| format!("Failed to delete carrier {}", mc_number))?;
        },
    }
    Ok(())
}

fn load_store_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    StoreConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))
}

/// Hold the failure on screen until the operator presses Enter
fn acknowledge(no_pause: bool) {
    let term = Term::stdout();
    if !should_pause(no_pause, std::io::stdin().is_terminal(), term.is_term()) {
        return;
    }

    let prompt = term
        .write_line("Press Enter to exit...")
        .and_then(|_| term.read_line());
    if let Err(e) = prompt {
        warn!(error = %e, "Could not wait for acknowledgment");
    }
}

/// Only an attended terminal session waits
fn should_pause(no_pause: bool, stdin_is_term: bool, stdout_is_term: bool) -> bool {
    !no_pause && stdin_is_term && stdout_is_term
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_requires_interactive_stdin_and_stdout() {
        assert!(should_pause(false, true, true));
        assert!(!should_pause(true, true, true));
        assert!(!should_pause(false, false, true));
        assert!(!should_pause(false, true, false));
    }
}
