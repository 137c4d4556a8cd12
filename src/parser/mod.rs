//! Result document parsing
//!
//! Turns the raw report document returned by a worker machine into a
//! per-machine summary.

use serde_json::Value;
use thiserror::Error;

use crate::config::RunnerConfig;
use crate::models::RunSummary;

/// Errors that can occur while interpreting a report document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("report document is not an object")]
    NotAnObject,

    #[error("missing field `{0}` in report document")]
    MissingField(&'static str),

    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
}

/// Builds a per-machine result from a raw report document
///
/// Implement this trait to support other report formats. Test doubles can
/// return canned summaries or parse failures.
pub trait ResultBuilder: Send + Sync {
    fn build(&self, document: &Value, config: &RunnerConfig) -> Result<RunSummary, ParseError>;
}

/// Parser for the worker JSON report format
///
/// Expects `tests`, `failures` and `errors` counts plus an optional
/// fractional `time` in seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportParser;

impl ReportParser {
    pub fn new() -> Self {
        Self
    }

    fn count(document: &Value, field: &'static str) -> Result<u32, ParseError> {
        match document.get(field) {
            None => Err(ParseError::MissingField(field)),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or(ParseError::WrongType(field)),
        }
    }
}

impl ResultBuilder for ReportParser {
    fn build(&self, document: &Value, _config: &RunnerConfig) -> Result<RunSummary, ParseError> {
        if !document.is_object() {
            return Err(ParseError::NotAnObject);
        }

        let tests = Self::count(document, "tests")?;
        let failures = Self::count(document, "failures")?;
        let errors = Self::count(document, "errors")?;

        let duration_ms = match document.get("time") {
            None => 0,
            Some(value) => value
                .as_f64()
                .map(|secs| (secs * 1000.0) as u64)
                .ok_or(ParseError::WrongType("time"))?,
        };

        Ok(RunSummary {
            tests,
            failures,
            errors,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    fn config() -> RunnerConfig {
        RunnerConfig::new(vec![Url::parse("http://a").unwrap()], 30)
    }

    #[test]
    fn test_parse_full_report() {
        let document = json!({"tests": 12, "failures": 1, "errors": 0, "time": 3.25});
        let summary = ReportParser::new().build(&document, &config()).unwrap();

        assert_eq!(summary.tests, 12);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.duration_ms, 3250);
    }

    #[test]
    fn test_time_is_optional() {
        let document = json!({"tests": 3, "failures": 0, "errors": 0});
        let summary = ReportParser::new().build(&document, &config()).unwrap();
        assert_eq!(summary.duration_ms, 0);
    }

    #[test]
    fn test_missing_count_field() {
        let document = json!({"tests": 3, "errors": 0});
        let err = ReportParser::new().build(&document, &config()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("failures")));
    }

    #[test]
    fn test_wrong_type() {
        let document = json!({"tests": "many", "failures": 0, "errors": 0});
        let err = ReportParser::new().build(&document, &config()).unwrap_err();
        assert!(matches!(err, ParseError::WrongType("tests")));
    }

    #[test]
    fn test_not_an_object() {
        let document = json!([1, 2, 3]);
        let err = ReportParser::new().build(&document, &config()).unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject));
    }
}
