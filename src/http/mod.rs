//! HTTP remote-call port
//!
//! The capability the coordinator uses to reach remote worker machines,
//! plus the reqwest-backed implementation.

mod client;

pub use client::RemoteWorkerClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors from hitting a remote worker
#[derive(Error, Debug)]
pub enum HitError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("timeout after {0} seconds")]
    Timeout(u64),

    #[error("connection refused to {0}")]
    ConnectionRefused(String),

    #[error("unexpected status {0} from {1}")]
    BadStatus(u16, String),

    #[error("response was not a structured report document: {0}")]
    InvalidDocument(String),
}

/// Capability for performing the remote runner request
///
/// Given a fully built request URL, either returns the worker's raw report
/// document or fails because the worker could not be reached. Pluggable so
/// tests can simulate success, timeout, and transport failure.
#[async_trait]
pub trait RemoteHitter: Send + Sync {
    async fn hit(&self, url: &Url) -> Result<Value, HitError>;
}
