//! Distributed test-run coordination
//!
//! Fans one run request out to every configured machine concurrently and
//! gathers the per-machine outcomes into a single aggregate.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use url::Url;

use crate::config::RunnerConfig;
use crate::http::{RemoteHitter, RemoteWorkerClient};
use crate::models::{DistributedRunResult, WorkerResult};
use crate::parser::{ParseError, ReportParser, ResultBuilder};

use super::url::{build_runner_url, MalformedRequestError};

/// Failures that abort a distributed run
///
/// Per-machine network failures are not represented here; those are
/// recorded in the aggregate (or suppressed under the ignore flag) without
/// failing the run.
#[derive(Error, Debug)]
pub enum RunError {
    /// A machine's request URL could not be constructed. A configuration
    /// defect, surfaced even when unresponsive machines are ignored.
    #[error(transparent)]
    MalformedRequest(#[from] MalformedRequestError),

    /// A machine responded, but with a document the parser could not
    /// interpret.
    #[error("machine {endpoint} returned an unreadable report")]
    UnparseableResponse {
        endpoint: Url,
        #[source]
        source: ParseError,
    },

    /// Waiting for the worker tasks was itself interrupted.
    #[error("distributed run interrupted: {0}")]
    Interrupted(String),
}

/// Coordinates one distributed test run across the configured fleet
///
/// One manager drives one run; construct a fresh manager for the next run.
/// The run configuration is shared read-only, the aggregate is written
/// exclusively by the manager's worker tasks.
pub struct DistributedRunManager {
    hitter: Arc<dyn RemoteHitter>,
    builder: Arc<dyn ResultBuilder>,
    config: Arc<RunnerConfig>,
    override_url: Option<String>,
    result: Arc<DistributedRunResult>,
}

impl DistributedRunManager {
    /// Manager backed by the real HTTP client and report parser.
    pub fn new(config: Arc<RunnerConfig>) -> anyhow::Result<Self> {
        let client = RemoteWorkerClient::new(config.timeout_secs)?;
        Ok(Self::with_collaborators(
            Arc::new(client),
            Arc::new(ReportParser::new()),
            config,
        ))
    }

    /// Manager with injected collaborators, for tests and embedding.
    pub fn with_collaborators(
        hitter: Arc<dyn RemoteHitter>,
        builder: Arc<dyn ResultBuilder>,
        config: Arc<RunnerConfig>,
    ) -> Self {
        Self {
            hitter,
            builder,
            config,
            override_url: None,
            result: Arc::new(DistributedRunResult::new()),
        }
    }

    /// Target URL superseding the configured test URL for this run only.
    pub fn with_override_url(mut self, url: impl Into<String>) -> Self {
        self.override_url = Some(url.into());
        self
    }

    pub fn override_url(&self) -> Option<&str> {
        self.override_url.as_deref()
    }

    /// The aggregate. Stable once `run` has returned.
    pub fn result(&self) -> &DistributedRunResult {
        &self.result
    }

    /// Contact every machine concurrently and wait for all of them.
    ///
    /// Network failures stay per-machine: recorded as unresponsive, or only
    /// logged when `ignore_unresponsive` is set. A malformed request URL, an
    /// unreadable report, or an interrupted worker task fail the whole run,
    /// reported after every sibling has finished.
    pub async fn run(&self) -> Result<(), RunError> {
        let machines = &self.config.remote_machines;
        let permits = self
            .config
            .max_concurrent
            .unwrap_or_else(|| machines.len().max(1));
        let semaphore = Arc::new(Semaphore::new(permits));

        info!(
            "Starting distributed run across {} machines (max {} concurrent)",
            machines.len(),
            permits
        );
        let start = Instant::now();

        let mut handles = Vec::new();
        for endpoint in machines {
            let endpoint = endpoint.clone();
            let semaphore = semaphore.clone();
            let hitter = self.hitter.clone();
            let builder = self.builder.clone();
            let config = self.config.clone();
            let override_url = self.override_url.clone();
            let result = self.result.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                run_on_machine(endpoint, hitter, builder, config, override_url, result).await
            }));
        }

        let mut failure = None;
        for outcome in join_all(handles).await {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if failure.is_none() {
                        failure = Some(e);
                    } else {
                        warn!("Further run failure: {e}");
                    }
                }
                Err(e) => return Err(RunError::Interrupted(e.to_string())),
            }
        }

        info!(
            "Distributed run finished in {}ms with {} recorded results",
            start.elapsed().as_millis(),
            self.result.len()
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// One worker task: build the request, hit the machine, record the outcome.
async fn run_on_machine(
    endpoint: Url,
    hitter: Arc<dyn RemoteHitter>,
    builder: Arc<dyn ResultBuilder>,
    config: Arc<RunnerConfig>,
    override_url: Option<String>,
    result: Arc<DistributedRunResult>,
) -> Result<(), RunError> {
    let full_url = build_runner_url(
        &endpoint,
        override_url.as_deref(),
        config.test_url.as_deref(),
    )?;

    info!("Requesting run on remote machine {endpoint}");
    match hitter.hit(&full_url).await {
        Ok(document) => {
            info!("Received response from remote machine {endpoint}");
            let summary =
                builder
                    .build(&document, &config)
                    .map_err(|source| RunError::UnparseableResponse {
                        endpoint: endpoint.clone(),
                        source,
                    })?;
            result.add(WorkerResult::completed(endpoint, summary));
            Ok(())
        }
        Err(e) if config.ignore_unresponsive => {
            warn!("Ignoring unresponsive machine {endpoint}: {e}");
            Ok(())
        }
        Err(e) => {
            warn!("Remote machine {endpoint} is unresponsive: {e}");
            result.add(WorkerResult::unresponsive(endpoint));
            Ok(())
        }
    }
}
