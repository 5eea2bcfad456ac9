//! Formula validation entry points.
//!
//! A formula is accepted when it is non-empty, lexes, parses completely, and
//! passes the static checks in [`check_semantics`]. Field names are not
//! resolved here; any identifier is accepted.

use serde::{Deserialize, Serialize};

use crate::{
    ast::{BinOp, Expr},
    lexer::{LexError, Lexer, Position},
    parser::{ParseError, Parser},
};

/// Stable classification of validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Blank or whitespace-only input
    EmptyExpression,
    /// Character outside the formula alphabet
    UnexpectedCharacter,
    /// Numeric literal too large to represent
    InvalidNumber,
    /// `(` never closed
    MismatchedParentheses,
    /// Token that cannot start an operand, such as a stray `)`
    UnexpectedToken,
    /// Tokens left over after a complete expression
    UnexpectedTokens,
    /// Missing operand or empty argument list
    InvalidFormula,
    /// `SUM`/`AVG` not followed by `(`
    MissingOpenParenAfterAggregation,
    /// Aggregation or group left open before another token
    MissingCloseParen,
    /// Parentheses or aggregations nested past the parser limit
    NestingTooDeep,
    /// Literal zero divisor
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Formula expression cannot be empty")]
    Empty,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Division by zero")]
    DivisionByZero,
}

impl From<LexError> for ValidationError {
    fn from(e: LexError) -> Self {
        ValidationError::Parse(ParseError::Lex(e))
    }
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Empty => ErrorKind::EmptyExpression,
            ValidationError::DivisionByZero => ErrorKind::DivisionByZero,
            ValidationError::Parse(e) => match e {
                ParseError::Lex(LexError::UnexpectedCharacter { .. }) => {
                    ErrorKind::UnexpectedCharacter
                }
                ParseError::Lex(LexError::InvalidNumber { .. }) => ErrorKind::InvalidNumber,
                ParseError::MismatchedParentheses { .. } => ErrorKind::MismatchedParentheses,
                ParseError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
                ParseError::UnexpectedTokens { .. } => ErrorKind::UnexpectedTokens,
                ParseError::InvalidFormula { .. }
                | ParseError::EmptyArgument { .. }
                | ParseError::EmptyGroup { .. } => ErrorKind::InvalidFormula,
                ParseError::MissingOpenParen { .. } => {
                    ErrorKind::MissingOpenParenAfterAggregation
                }
                ParseError::MissingCloseParen { .. } | ParseError::UnclosedAggregate { .. } => {
                    ErrorKind::MissingCloseParen
                }
                ParseError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            },
        }
    }

    /// Character offset of the offending token, when one exists.
    pub fn position(&self) -> Option<Position> {
        match self {
            ValidationError::Parse(e) => Some(e.position()),
            ValidationError::Empty | ValidationError::DivisionByZero => None,
        }
    }
}

/// Accept or reject a formula. Nothing is retained between calls.
pub fn validate_formula(expression: &str) -> Result<(), ValidationError> {
    parse_formula(expression).map(|_| ())
}

/// Like [`validate_formula`] but hands back the validated tree.
#[tracing::instrument(level = "debug", skip_all, fields(len = expression.len()))]
pub fn parse_formula(expression: &str) -> Result<Expr, ValidationError> {
    let result = parse_and_check(expression);
    match &result {
        Ok(expr) => tracing::debug!(depth = expr.depth(), "formula accepted"),
        Err(e) => tracing::debug!(kind = ?e.kind(), error = %e, "formula rejected"),
    }
    result
}

fn parse_and_check(expression: &str) -> Result<Expr, ValidationError> {
    if expression.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut parser = Parser::new(Lexer::new(expression))?;
    let expr = parser.parse()?;
    check_semantics(&expr)?;
    Ok(expr)
}

/// Static checks on an already parsed tree.
///
/// Only a literal zero divisor is rejected; `x / (5 - 5)` passes.
pub fn check_semantics(expr: &Expr) -> Result<(), ValidationError> {
    // Long operator chains build left-deep trees, so walk with an explicit stack.
    let mut pending = vec![expr];

    while let Some(node) = pending.pop() {
        match node {
            Expr::Literal(_) | Expr::Field(_) => {}
            Expr::BinaryOp { op, left, right } => {
                if *op == BinOp::Divide && matches!(right.as_ref(), Expr::Literal(n) if n.is_zero())
                {
                    return Err(ValidationError::DivisionByZero);
                }
                pending.push(right);
                pending.push(left);
            }
            Expr::Aggregate { arg, .. } => pending.push(arg),
        }
    }
    Ok(())
}

#[test]
fn test_kind_mapping() {
    assert_eq!(validate_formula("").unwrap_err().kind(), ErrorKind::EmptyExpression);
    assert_eq!(
        validate_formula("SUM()").unwrap_err().kind(),
        ErrorKind::InvalidFormula
    );
    assert_eq!(
        validate_formula("SUM(x").unwrap_err().kind(),
        ErrorKind::MissingCloseParen
    );
}
