//! Documentation content for kpif CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Aggregations,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "aggregations" | "aggregation" | "aggregates" => Some(Self::Aggregations),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"KPI FORMULA DOCUMENTATION

A KPI formula describes how a metric is computed from data fields. Formulas
combine field names and numbers with arithmetic and the SUM/AVG aggregations.
They are checked before a metric is saved; field names are resolved later.

DOCUMENTATION CATEGORIES

  syntax            Numbers, field names, whitespace and grouping
  operators         Arithmetic operators, precedence and associativity
  aggregations      SUM and AVG
  errors            Every rejection reason with an example

QUICK REFERENCE

  price             Field reference
  0.15              Number
  + - * /           Arithmetic
  ( ... )           Grouping
  SUM(expr)         Total of expr
  AVG(expr)         Mean of expr

Run 'kpif docs <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Aggregations) => Ok(AGGREGATIONS_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Formula Building Blocks

NUMBERS
  42   0.15   100.00
    Digits with an optional fractional part. A leading or trailing dot is
    not part of a number: '.5' and '5.' are rejected.
    There is no unary minus; write '0 - x' instead of '-x'.

FIELD NAMES
  price   unit_cost   _q4_total
    A letter or underscore followed by letters, digits or underscores.
    Names are not checked against any dataset at this stage.

GROUPING
  (revenue - cost) / revenue
    Parentheses override precedence and may be nested.

WHITESPACE
    Spaces, tabs and newlines between tokens are ignored.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Arithmetic

  a + b     Addition
  a - b     Subtraction
  a * b     Multiplication
  a / b     Division

PRECEDENCE
    '*' and '/' bind tighter than '+' and '-'.

      1 + 2 * 3        is  1 + (2 * 3)

ASSOCIATIVITY
    All operators group left to right.

      a - b - c        is  (a - b) - c
      a / b / c        is  (a / b) / c

DIVISION BY ZERO
    A literal zero divisor is rejected anywhere in the formula:

      revenue / 0              rejected
      SUM(x / 0.0)             rejected
      revenue / (5 - 5)        accepted (not a literal)
"#;

const AGGREGATIONS_DOC: &str = r#"AGGREGATIONS - SUM and AVG

  SUM(expr)
    Total of expr over all rows.

  AVG(expr)
    Mean of expr over all rows.

    Both take exactly one argument expression, which may itself be any
    formula:

      SUM(price * quantity) / AVG(cost)
      SUM(revenue - cost)

    Keywords are case-sensitive. 'sum' and 'Avg' are field names, so
    'sum(x)' is rejected as a field followed by stray tokens.

    Rejected forms:
      SUM()          no argument
      SUM revenue    missing '('
      SUM(revenue    missing ')'
"#;

const ERRORS_DOC: &str = r#"ERRORS - Rejection Reasons

  empty_expression                      ''  or  '   '
    Formula expression cannot be empty

  unexpected_character                  1 + @
    Unexpected character '@' at position 4

  invalid_number                        a 29+ digit integer literal
    Invalid number '...' at position N

  mismatched_parentheses                (1 + 2
    Mismatched parentheses: '(' at position 0 is never closed

  unexpected_token                      )
    Unexpected token ')' at position 0

  unexpected_tokens                     1 + 2)
    Unexpected tokens after end of expression, starting with ')' ...

  invalid_formula                       1 +    + 1    SUM()
    Invalid formula: ...

  missing_open_paren_after_aggregation  SUM revenue
    Expected '(' after SUM

  missing_close_paren                   SUM(revenue
    Expected ')' to close SUM at position 11, found end of input

  nesting_too_deep                      more than 256 nested groups
    Formula nesting exceeds the maximum depth of 256 ...

  division_by_zero                      10 / 0
    Division by zero
"#;
