//! fleetrun - Distributed Test-Run Coordinator
//!
//! A CLI tool that fans a test-run request out to every configured remote
//! worker machine concurrently, tolerates unresponsive machines without
//! aborting the whole run, and merges the per-machine outcomes into one
//! aggregated report.
//!
//! ## Usage
//!
//! ```bash
//! # Trigger a run across the configured fleet
//! fleetrun run --config fleetrun.yaml
//!
//! # Ad-hoc fleet with a per-run target override
//! fleetrun run -m http://worker1:8201 -m http://worker2:8201 \
//!     --url http://ci.internal/suite --timeout 30
//!
//! # Inspect the configured fleet
//! fleetrun machines
//!
//! # Write a starting-point configuration file
//! fleetrun config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

mod cli;
mod config;
mod coordinator;
mod http;
mod models;
mod output;
mod parser;
mod utils;

use cli::Args;
use config::RunnerConfig;
use coordinator::DistributedRunManager;
use output::{OutputFormat, ResultFormatter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        utils::LogLevel::Debug
    } else {
        utils::LogLevel::Info
    };
    utils::init_logger(level);

    match args.command {
        cli::Command::Run(run_args) => {
            run_fleet(run_args).await?;
        }
        cli::Command::Machines(machines_args) => {
            list_machines(machines_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
    }

    Ok(())
}

/// Merge config file, environment, and CLI flags into one run configuration.
fn resolve_config(args: &cli::RunArgs) -> Result<RunnerConfig> {
    let path = args
        .config
        .clone()
        .map(PathBuf::from)
        .or_else(RunnerConfig::find);

    let mut config = match path {
        Some(path) => RunnerConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let timeout = args
                .timeout
                .context("--timeout is required when no configuration file is present")?;
            RunnerConfig::new(Vec::new(), timeout)
        }
    };

    config.apply_env();

    if !args.machines.is_empty() {
        config.remote_machines = args
            .machines
            .iter()
            .map(|m| Url::parse(m).with_context(|| format!("Invalid machine URL: {m}")))
            .collect::<Result<Vec<_>>>()?;
    }
    if args.ignore_unresponsive {
        config.ignore_unresponsive = true;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(cap) = args.concurrent {
        config.max_concurrent = Some(cap);
    }

    config.validate()?;
    Ok(config)
}

async fn run_fleet(args: cli::RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let format = OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table);
    let formatter = ResultFormatter::new(format);

    info!(
        "Triggering distributed run on {} machines",
        config.remote_machines.len()
    );

    let mut manager = DistributedRunManager::new(Arc::new(config))?;
    if let Some(url) = &args.url {
        manager = manager.with_override_url(url.as_str());
    }

    manager.run().await?;

    let report = manager.result().report();
    println!("{}", formatter.format_report(&report));

    if let Some(path) = &args.output {
        std::fs::write(path, formatter.format_report(&report))
            .with_context(|| format!("Failed to write report to {path}"))?;
        println!("Report saved to: {path}");
    }

    if !report.is_successful() {
        std::process::exit(1);
    }

    Ok(())
}

fn list_machines(args: cli::MachinesArgs) -> Result<()> {
    let path = args
        .config
        .map(PathBuf::from)
        .or_else(RunnerConfig::find)
        .context("No configuration file found; run `fleetrun config init` first")?;
    let config = RunnerConfig::load(&path)?;

    println!("\nRemote machines ({}):", config.remote_machines.len());
    for (i, machine) in config.remote_machines.iter().enumerate() {
        println!("  {:2}. {machine}", i + 1);
    }

    if let Some(url) = &config.test_url {
        println!("\nTest URL: {url}");
    }
    println!("Timeout: {}s", config.timeout_secs);
    println!("Ignore unresponsive: {}", config.ignore_unresponsive);

    Ok(())
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            RunnerConfig::example().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to point at your worker machines.");
        }

        cli::ConfigAction::Show { config, format } => {
            let path = config
                .map(PathBuf::from)
                .or_else(RunnerConfig::find)
                .context("No configuration file found")?;
            let config = RunnerConfig::load(&path)?;

            let rendered = if format == "json" {
                serde_json::to_string_pretty(&config)?
            } else {
                serde_yaml::to_string(&config)?
            };
            println!("{rendered}");
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .map(PathBuf::from)
                .or_else(RunnerConfig::find)
                .context("No configuration file found")?;

            match RunnerConfig::load(&path).and_then(|config| config.validate()) {
                Ok(()) => {
                    println!("✓ Configuration file is valid: {}", path.display());
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
