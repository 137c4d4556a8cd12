//! Data models for distributed runs
//!
//! This module contains all data structures used throughout the application.

mod result;

pub use result::{DistributedRunResult, RunReport, RunSummary, WorkerResult, WorkerStatus};
