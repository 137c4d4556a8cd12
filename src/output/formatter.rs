//! Output formatters for distributed run reports
//!
//! Provides JSON, Table, CSV, and summary output formats.

#![allow(dead_code)]

use crate::models::{RunReport, WorkerResult, WorkerStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format the full run report.
    pub fn format_report(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => self.format_csv(report),
            OutputFormat::Summary => self.format_summary(report),
        }
    }

    fn status_label(&self, result: &WorkerResult) -> String {
        let plain = match result.status {
            WorkerStatus::Completed => "✓ OK",
            WorkerStatus::Unresponsive => "✗ UNRESPONSIVE",
        };

        if !self.colorize {
            return plain.to_string();
        }

        match result.status {
            WorkerStatus::Completed if result.is_clean() => format!("\x1b[32m{plain}\x1b[0m"),
            WorkerStatus::Completed => format!("\x1b[33m{plain}\x1b[0m"),
            WorkerStatus::Unresponsive => format!("\x1b[31m{plain}\x1b[0m"),
        }
    }

    fn format_row(&self, result: &WorkerResult) -> String {
        match &result.summary {
            Some(summary) => format!(
                "{:40} {:16} {:>5} tests {:>3} failures {:>3} errors [{:>6}ms]",
                result.endpoint,
                self.status_label(result),
                summary.tests,
                summary.failures,
                summary.errors,
                summary.duration_ms
            ),
            None => format!("{:40} {}", result.endpoint, self.status_label(result)),
        }
    }

    fn format_table(&self, report: &RunReport) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Distributed run across {} machines\n",
            report.machines
        ));
        out.push_str("──────────────────────────────────────────────────────────────────────\n");
        for result in &report.results {
            out.push_str(&self.format_row(result));
            out.push('\n');
        }
        out.push_str("──────────────────────────────────────────────────────────────────────\n");
        out.push_str(&format!(
            "Machines: {} | Responded: {} | Unresponsive: {}\n",
            report.machines, report.responded, report.unresponsive
        ));
        out.push_str(&format!(
            "Tests: {} | Failures: {} | Errors: {}",
            report.tests, report.failures, report.errors
        ));
        out
    }

    fn format_csv(&self, report: &RunReport) -> String {
        let mut out = String::from("endpoint,status,tests,failures,errors,duration_ms\n");
        for result in &report.results {
            match &result.summary {
                Some(summary) => out.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    result.endpoint,
                    result.status,
                    summary.tests,
                    summary.failures,
                    summary.errors,
                    summary.duration_ms
                )),
                None => out.push_str(&format!("{},{},,,,\n", result.endpoint, result.status)),
            }
        }
        out
    }

    fn format_summary(&self, report: &RunReport) -> String {
        format!(
            "{}/{} machines responded | {} tests, {} failures, {} errors",
            report.responded, report.machines, report.tests, report.failures, report.errors
        )
    }
}
