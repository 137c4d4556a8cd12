//! Output formatting module
//!
//! Provides various output formats for distributed run reports.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
