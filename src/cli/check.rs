//! Validate a single formula

use super::{CliError, to_json};
use crate::ValidationReport;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The formula to validate
    pub formula: Option<String>,
    /// Emit the report as JSON
    pub json: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Print the canonical form of a valid formula
    pub ast: bool,
}

/// Rendered result of a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutput {
    pub valid: bool,
    pub text: String,
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckOutput, CliError> {
    let formula = options.formula.as_deref().ok_or(CliError::NoInput)?;
    // Piped input usually carries a trailing newline
    let formula = formula.trim_end_matches(['\r', '\n']);

    let report = ValidationReport::from_formula(formula);

    let text = if options.json {
        to_json(&report, options.pretty)?
    } else {
        match (&report.error, &report.canonical) {
            (Some(error), _) => error.message.clone(),
            (None, Some(canonical)) if options.ast => canonical.clone(),
            (None, _) => "Formula is valid".to_string(),
        }
    };

    Ok(CheckOutput {
        valid: report.valid,
        text,
    })
}
