//! Worker result models
//!
//! Per-machine outcomes and the thread-safe aggregate built up during a
//! distributed run.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use url::Url;

/// How a remote machine concluded its part of the run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Completed,
    Unresponsive,
}

impl WorkerStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            WorkerStatus::Completed => "✓",
            WorkerStatus::Unresponsive => "✗",
        }
    }

    pub fn responded(&self) -> bool {
        matches!(self, WorkerStatus::Completed)
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Completed => write!(f, "COMPLETED"),
            WorkerStatus::Unresponsive => write!(f, "UNRESPONSIVE"),
        }
    }
}

/// Test counts reported by one worker machine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tests: u32,
    pub failures: u32,
    pub errors: u32,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn passed(&self) -> u32 {
        self.tests.saturating_sub(self.failures + self.errors)
    }

    pub fn is_clean(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }
}

/// Outcome for a single machine, tagged with its originating endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerResult {
    pub endpoint: Url,
    pub status: WorkerStatus,
    pub summary: Option<RunSummary>,
}

impl WorkerResult {
    pub fn completed(endpoint: Url, summary: RunSummary) -> Self {
        Self {
            endpoint,
            status: WorkerStatus::Completed,
            summary: Some(summary),
        }
    }

    pub fn unresponsive(endpoint: Url) -> Self {
        Self {
            endpoint,
            status: WorkerStatus::Unresponsive,
            summary: None,
        }
    }

    pub fn is_unresponsive(&self) -> bool {
        self.status == WorkerStatus::Unresponsive
    }

    /// The machine responded and reported no failures or errors.
    pub fn is_clean(&self) -> bool {
        self.summary.as_ref().map(RunSummary::is_clean).unwrap_or(false)
    }
}

impl fmt::Display for WorkerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.symbol(), self.endpoint)?;
        match &self.summary {
            Some(summary) => write!(
                f,
                " {} tests, {} failures, {} errors [{}ms]",
                summary.tests, summary.failures, summary.errors, summary.duration_ms
            ),
            None => write!(f, " unresponsive"),
        }
    }
}

/// Thread-safe aggregate of worker results for one distributed run
///
/// Writers serialize through an internal mutex. Entries appear in task
/// completion order, not fleet configuration order.
#[derive(Debug, Default)]
pub struct DistributedRunResult {
    results: Mutex<Vec<WorkerResult>>,
}

impl DistributedRunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one result. Safe to call concurrently from worker tasks.
    pub fn add(&self, result: WorkerResult) {
        self.results.lock().expect("result mutex poisoned").push(result);
    }

    /// Copy of the current contents. Stable once all writers have joined.
    pub fn snapshot(&self) -> Vec<WorkerResult> {
        self.results.lock().expect("result mutex poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.results.lock().expect("result mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every recorded machine responded with a clean summary.
    pub fn all_clean(&self) -> bool {
        self.results
            .lock()
            .expect("result mutex poisoned")
            .iter()
            .all(WorkerResult::is_clean)
    }

    /// Serializable roll-up of the current contents.
    pub fn report(&self) -> RunReport {
        RunReport::new(self.snapshot())
    }
}

/// Roll-up of a distributed run, ready for rendering or export
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub machines: usize,
    pub responded: usize,
    pub unresponsive: usize,
    pub tests: u32,
    pub failures: u32,
    pub errors: u32,
    pub results: Vec<WorkerResult>,
}

impl RunReport {
    pub fn new(results: Vec<WorkerResult>) -> Self {
        let machines = results.len();
        let responded = results.iter().filter(|r| r.status.responded()).count();
        let unresponsive = machines - responded;

        let mut tests = 0;
        let mut failures = 0;
        let mut errors = 0;
        for summary in results.iter().filter_map(|r| r.summary.as_ref()) {
            tests += summary.tests;
            failures += summary.failures;
            errors += summary.errors;
        }

        Self {
            generated_at: Utc::now(),
            machines,
            responded,
            unresponsive,
            tests,
            failures,
            errors,
            results,
        }
    }

    /// Every machine responded and no test failed or errored.
    pub fn is_successful(&self) -> bool {
        self.unresponsive == 0 && self.failures == 0 && self.errors == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distributed run across {} machines", self.machines)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Machines: {} | Responded: {} | Unresponsive: {}",
            self.machines, self.responded, self.unresponsive
        )?;
        writeln!(
            f,
            "Tests: {} | Failures: {} | Errors: {}",
            self.tests, self.failures, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn clean_summary() -> RunSummary {
        RunSummary {
            tests: 12,
            failures: 0,
            errors: 0,
            duration_ms: 1500,
        }
    }

    #[test]
    fn test_summary_passed() {
        let summary = RunSummary {
            tests: 10,
            failures: 2,
            errors: 1,
            duration_ms: 100,
        };
        assert_eq!(summary.passed(), 7);
        assert!(!summary.is_clean());
        assert!(clean_summary().is_clean());
    }

    #[test]
    fn test_result_constructors() {
        let ok = WorkerResult::completed(endpoint("http://a"), clean_summary());
        assert_eq!(ok.status, WorkerStatus::Completed);
        assert!(ok.is_clean());
        assert!(!ok.is_unresponsive());

        let down = WorkerResult::unresponsive(endpoint("http://b"));
        assert!(down.is_unresponsive());
        assert!(down.summary.is_none());
        assert!(!down.is_clean());
    }

    #[test]
    fn test_result_display() {
        let ok = WorkerResult::completed(endpoint("http://a"), clean_summary());
        assert_eq!(ok.to_string(), "✓ http://a/ 12 tests, 0 failures, 0 errors [1500ms]");

        let down = WorkerResult::unresponsive(endpoint("http://b"));
        assert_eq!(down.to_string(), "✗ http://b/ unresponsive");
    }

    #[test]
    fn test_aggregate_add_and_snapshot() {
        let aggregate = DistributedRunResult::new();
        assert!(aggregate.is_empty());

        aggregate.add(WorkerResult::completed(endpoint("http://a"), clean_summary()));
        aggregate.add(WorkerResult::unresponsive(endpoint("http://b")));

        assert_eq!(aggregate.len(), 2);
        assert!(!aggregate.all_clean());

        let snapshot = aggregate.snapshot();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_aggregate_concurrent_adds() {
        let aggregate = DistributedRunResult::new();

        std::thread::scope(|scope| {
            for i in 0..20 {
                let aggregate = &aggregate;
                scope.spawn(move || {
                    let machine = endpoint(&format!("http://worker{i:02}"));
                    aggregate.add(WorkerResult::completed(machine, clean_summary()));
                });
            }
        });

        let snapshot = aggregate.snapshot();
        assert_eq!(snapshot.len(), 20);

        let unique: std::collections::HashSet<_> =
            snapshot.iter().map(|r| r.endpoint.clone()).collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_report_totals() {
        let results = vec![
            WorkerResult::completed(
                endpoint("http://a"),
                RunSummary {
                    tests: 10,
                    failures: 1,
                    errors: 0,
                    duration_ms: 300,
                },
            ),
            WorkerResult::completed(
                endpoint("http://b"),
                RunSummary {
                    tests: 5,
                    failures: 0,
                    errors: 2,
                    duration_ms: 200,
                },
            ),
            WorkerResult::unresponsive(endpoint("http://c")),
        ];

        let report = RunReport::new(results);
        assert_eq!(report.machines, 3);
        assert_eq!(report.responded, 2);
        assert_eq!(report.unresponsive, 1);
        assert_eq!(report.tests, 15);
        assert_eq!(report.failures, 1);
        assert_eq!(report.errors, 2);
        assert!(!report.is_successful());
    }

    #[test]
    fn test_report_successful() {
        let report = RunReport::new(vec![WorkerResult::completed(
            endpoint("http://a"),
            clean_summary(),
        )]);
        assert!(report.is_successful());
    }
}
