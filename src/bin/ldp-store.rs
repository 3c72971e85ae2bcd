//! ldp-store CLI Binary
//!
//! Command-line interface for inspecting and maintaining an LDP resource store.

use anyhow::Context;
use clap::Parser;
use ldp_store::cli::{Cli, RunContext};
use ldp_store::config::ConfigLoader;
use ldp_store::logging::{init_logging, LoggingConfig};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            match e.downcast_ref::<ldp_store::error::LdpError>() {
                Some(ldp) => eprintln!("{}", ldp_store::cli::map_error(ldp)),
                None => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .with_context(|| format!("Failed to open workspace {}", cli.workspace.display()))?;
    info!(workspace = %cli.workspace.display(), "CLI context initialized");
    Ok(context.execute(&cli.command)?)
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let loaded = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    } else if config.file.is_relative() {
        config.file = cli.workspace.join(&config.file);
    }

    config
}
