//! Reqwest-backed remote worker client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{HitError, RemoteHitter};

/// HTTP client that triggers runs on remote worker machines
#[derive(Clone)]
pub struct RemoteWorkerClient {
    client: Client,
    timeout_secs: u64,
}

impl RemoteWorkerClient {
    /// Create a client with the configured per-request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl RemoteHitter for RemoteWorkerClient {
    async fn hit(&self, url: &Url) -> Result<Value, HitError> {
        debug!("Sending GET request to {url}");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                HitError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                HitError::ConnectionRefused(url.to_string())
            } else {
                HitError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HitError::BadStatus(status.as_u16(), url.to_string()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| HitError::InvalidDocument(e.to_string()))
    }
}
