//! Serializable validation outcome for machine-readable output.

use serde::{Deserialize, Serialize};

use crate::validator::{ErrorKind, ValidationError, parse_formula};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl From<&ValidationError> for ErrorReport {
    fn from(e: &ValidationError) -> Self {
        ErrorReport {
            kind: e.kind(),
            message: e.to_string(),
            position: e.position(),
        }
    }
}

/// Outcome of validating one formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub formula: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    /// Field names referenced by a valid formula, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Canonical rendering of a valid formula
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

impl ValidationReport {
    pub fn from_formula(formula: &str) -> Self {
        match parse_formula(formula) {
            Ok(expr) => ValidationReport {
                formula: formula.to_string(),
                valid: true,
                error: None,
                fields: expr
                    .referenced_fields()
                    .into_iter()
                    .map(String::from)
                    .collect(),
                canonical: Some(expr.to_string()),
            },
            Err(e) => ValidationReport {
                formula: formula.to_string(),
                valid: false,
                error: Some(ErrorReport::from(&e)),
                fields: Vec::new(),
                canonical: None,
            },
        }
    }
}
