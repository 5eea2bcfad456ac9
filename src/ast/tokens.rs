use std::fmt;

use rust_decimal::Decimal;

/// A lexical token together with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Token { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal, integer or decimal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0.15
    /// ```
    Number(Decimal),

    /// Field name
    ///
    /// Must start with a letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// price
    /// unit_cost
    /// _q4
    /// ```
    Identifier(String),

    // Aggregations
    /// `SUM` keyword (exact casing only)
    Sum,

    /// `AVG` keyword (exact casing only)
    Avg,

    // Arithmetic
    /// Addition
    Plus,

    /// Subtraction
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    // Delimiters
    /// Left parenthesis for grouping or aggregation arguments
    LParen,

    /// Right parenthesis
    RParen,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Discriminant-only comparison, ignoring literal payloads.
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "'{}'", n),
            TokenKind::Identifier(name) => write!(f, "'{}'", name),
            TokenKind::Sum => write!(f, "'SUM'"),
            TokenKind::Avg => write!(f, "'AVG'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
