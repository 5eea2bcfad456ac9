//! Validate a file of formulas, one per line

use serde::Serialize;

use super::{CliError, to_json};
use crate::ValidationReport;

/// Options for the batch command
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub json: bool,
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// 1-based line number in the source
    pub line: usize,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub entries: Vec<BatchEntry>,
    pub text: String,
}

impl BatchOutput {
    pub fn all_valid(&self) -> bool {
        self.entries.iter().all(|e| e.report.valid)
    }
}

/// Blank lines and lines starting with `#` are skipped.
pub fn execute_batch(source: &str, options: &BatchOptions) -> Result<BatchOutput, CliError> {
    let entries: Vec<BatchEntry> = source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(idx, line)| BatchEntry {
            line: idx + 1,
            report: ValidationReport::from_formula(line),
        })
        .collect();

    tracing::info!(
        formulas = entries.len(),
        invalid = entries.iter().filter(|e| !e.report.valid).count(),
        "batch validated"
    );

    let text = if options.json {
        to_json(&entries, options.pretty)?
    } else {
        entries
            .iter()
            .map(|entry| match &entry.report.error {
                None => format!("line {}: ok", entry.line),
                Some(error) => format!("line {}: {}", entry.line, error.message),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(BatchOutput { entries, text })
}
