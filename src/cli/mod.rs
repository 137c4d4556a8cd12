//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Distributed test-run coordinator for remote worker fleets
#[derive(Parser, Debug)]
#[command(name = "fleetrun")]
#[command(version)]
#[command(about = "Fan a test run out across remote worker machines")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trigger a distributed run across the fleet
    Run(RunArgs),

    /// List the configured remote machines
    Machines(MachinesArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration file (discovered automatically when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Remote machine base URL; repeatable, replaces the configured fleet
    #[arg(short, long = "machine")]
    pub machines: Vec<String>,

    /// Target URL overriding the configured test URL for this run
    #[arg(short, long)]
    pub url: Option<String>,

    /// Drop unresponsive machines instead of recording them
    #[arg(long)]
    pub ignore_unresponsive: bool,

    /// HTTP timeout per machine in seconds (here or in the config file)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Cap on concurrently contacted machines
    #[arg(long)]
    pub concurrent: Option<usize>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Write the report to a file as well
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the machines command
#[derive(Parser, Debug)]
pub struct MachinesArgs {
    /// Configuration file (discovered automatically when omitted)
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Arguments for configuration management
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "./fleetrun.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Configuration file (discovered automatically when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Check that a configuration file is valid
    Validate {
        /// File to check (discovered automatically when omitted)
        file: Option<String>,
    },
}
