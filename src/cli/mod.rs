//! CLI support for kpi-formula
//!
//! Provides programmatic access to the `kpif` commands so the same checks can
//! be embedded in other tools.

mod batch;
mod check;
mod docs;

pub use batch::{BatchEntry, BatchOptions, BatchOutput, execute_batch};
pub use check::{CheckOptions, CheckOutput, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// JSON serialization error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "JSON output error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No formula provided. Pass it as an argument or pipe it to stdin.")
            }
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'kpif docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    Ok(json)
}
