//! Run configuration
//!
//! Loading, validation, and environment overrides for the fleet
//! configuration consumed by the coordinator.

#![allow(dead_code)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Config file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &["./fleetrun.yaml", "./fleetrun.yml", "./.fleetrun.yaml"];

/// Configuration for one distributed run
///
/// Read-only while a run is in flight; the coordinator observes it through
/// a shared reference and never mutates it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Remote worker machines taking part in the run
    pub remote_machines: Vec<Url>,

    /// Target URL the workers should load, unless overridden per run
    #[serde(default)]
    pub test_url: Option<String>,

    /// Drop unresponsive machines from the aggregate instead of recording them
    #[serde(default)]
    pub ignore_unresponsive: bool,

    /// HTTP timeout per machine, in seconds. Required; there is no default.
    pub timeout_secs: u64,

    /// Cap on concurrently contacted machines; unset means one task per machine
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

impl RunnerConfig {
    pub fn new(remote_machines: Vec<Url>, timeout_secs: u64) -> Self {
        Self {
            remote_machines,
            test_url: None,
            ignore_unresponsive: false,
            timeout_secs,
            max_concurrent: None,
        }
    }

    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = Some(url.into());
        self
    }

    pub fn with_ignore_unresponsive(mut self, ignore: bool) -> Self {
        self.ignore_unresponsive = ignore;
        self
    }

    pub fn with_max_concurrent(mut self, cap: usize) -> Self {
        self.max_concurrent = Some(cap);
        self
    }

    /// Load configuration from a YAML or JSON file, by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to a YAML or JSON file, by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// First config file present at a conventional location.
    pub fn find() -> Option<PathBuf> {
        for location in CONFIG_LOCATIONS {
            let path = PathBuf::from(location);
            if path.exists() {
                return Some(path);
            }
        }

        let user_config = dirs::config_dir()?.join("fleetrun/config.yaml");
        user_config.exists().then_some(user_config)
    }

    /// Apply `FLEETRUN_*` environment overrides on top of the loaded file.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("FLEETRUN_TEST_URL") {
            self.test_url = Some(value);
        }
        if let Ok(value) = std::env::var("FLEETRUN_IGNORE_UNRESPONSIVE") {
            if let Ok(flag) = value.parse() {
                self.ignore_unresponsive = flag;
            }
        }
        if let Ok(value) = std::env::var("FLEETRUN_TIMEOUT_SECS") {
            if let Ok(secs) = value.parse() {
                self.timeout_secs = secs;
            }
        }
        if let Ok(value) = std::env::var("FLEETRUN_MAX_CONCURRENT") {
            if let Ok(cap) = value.parse() {
                self.max_concurrent = Some(cap);
            }
        }
    }

    /// Reject configurations the coordinator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.remote_machines.is_empty() {
            anyhow::bail!("No remote machines configured");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if let Some(url) = &self.test_url {
            Url::parse(url).with_context(|| format!("Invalid test URL: {url}"))?;
        }
        if self.max_concurrent == Some(0) {
            anyhow::bail!("max_concurrent must be greater than zero when set");
        }
        Ok(())
    }

    /// Starting-point configuration written by `fleetrun config init`.
    pub fn example() -> Self {
        let machines = vec![
            Url::parse("http://worker1.example.com:8201").expect("example URL"),
            Url::parse("http://worker2.example.com:8201").expect("example URL"),
        ];
        Self::new(machines, 60).with_test_url("http://ci.example.com/suite")
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
