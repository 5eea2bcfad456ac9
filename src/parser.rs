use crate::{
    ast::{AggregateFn, BinOp, Expr, Token, TokenKind},
    lexer::{LexError, Lexer, Position},
};

/// Maximum nesting of parentheses and aggregations accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Mismatched parentheses: '(' at position {open} is never closed")]
    MismatchedParentheses { open: Position },

    #[error("Unexpected token {found} at position {position}")]
    UnexpectedToken { found: TokenKind, position: Position },

    #[error("Unexpected tokens after end of expression, starting with {found} at position {position}")]
    UnexpectedTokens { found: TokenKind, position: Position },

    #[error(
        "Invalid formula: expected a number, field, aggregation or '(' at position {position}, found {found}"
    )]
    InvalidFormula { found: TokenKind, position: Position },

    #[error("Invalid formula: {func} requires exactly one argument expression")]
    EmptyArgument { func: AggregateFn, position: Position },

    #[error("Invalid formula: empty parentheses at position {position}")]
    EmptyGroup { position: Position },

    #[error("Expected '(' after {func}")]
    MissingOpenParen { func: AggregateFn, position: Position },

    #[error("Expected ')' at position {position}, found {found}")]
    MissingCloseParen { found: TokenKind, position: Position },

    #[error("Expected ')' to close {func} at position {position}, found {found}")]
    UnclosedAggregate {
        func: AggregateFn,
        found: TokenKind,
        position: Position,
    },

    #[error("Formula nesting exceeds the maximum depth of {limit} at position {position}")]
    NestingTooDeep { limit: usize, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::MismatchedParentheses { open } => *open,
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedTokens { position, .. }
            | ParseError::InvalidFormula { position, .. }
            | ParseError::EmptyArgument { position, .. }
            | ParseError::EmptyGroup { position }
            | ParseError::MissingOpenParen { position, .. }
            | ParseError::MissingCloseParen { position, .. }
            | ParseError::UnclosedAggregate { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }
}

/// Recursive-descent parser over a fully lexed token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Lex the whole input up front; a lexing failure fails construction.
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        let tokens = lexer.tokenize()?;
        Ok(Parser {
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    // `tokenize` always ends the stream with `Eof` and `advance` never moves past it.
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if self.current().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current().kind.same_kind(kind)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                position: self.current().position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse factors: numbers, fields, aggregations and parenthesised groups
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let Token { kind, position } = self.current().clone();

        match kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Literal(n))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Field(name))
            }
            TokenKind::Sum => self.parse_aggregate(AggregateFn::Sum),
            TokenKind::Avg => self.parse_aggregate(AggregateFn::Avg),
            TokenKind::LParen => self.parse_group(position),

            // A ')' with nothing to close
            found @ TokenKind::RParen => Err(ParseError::UnexpectedToken { found, position }),

            // Operator or end of input where an operand is required
            found => Err(ParseError::InvalidFormula { found, position }),
        }
    }

    fn parse_group(&mut self, open: Position) -> Result<Expr, ParseError> {
        self.advance(); // consume '('
        self.enter()?;

        match &self.current().kind {
            TokenKind::RParen => {
                return Err(ParseError::EmptyGroup { position: open });
            }
            TokenKind::Eof => return Err(ParseError::MismatchedParentheses { open }),
            _ => {}
        }

        let expr = self.parse_expression()?;

        let Token { kind, position } = self.current().clone();
        match kind {
            TokenKind::RParen => {
                self.advance();
                self.leave();
                Ok(expr)
            }
            TokenKind::Eof => Err(ParseError::MismatchedParentheses { open }),
            found => Err(ParseError::MissingCloseParen { found, position }),
        }
    }

    fn parse_aggregate(&mut self, func: AggregateFn) -> Result<Expr, ParseError> {
        let keyword_position = self.current().position;
        self.advance(); // consume keyword

        // `SUM` is only ever an aggregation; a bare keyword is not a field name
        if !self.check(&TokenKind::LParen) {
            return Err(ParseError::MissingOpenParen {
                func,
                position: keyword_position,
            });
        }
        self.advance();
        self.enter()?;

        if self.check(&TokenKind::RParen) {
            return Err(ParseError::EmptyArgument {
                func,
                position: self.current().position,
            });
        }

        let arg = self.parse_expression()?;

        let Token { kind, position } = self.current().clone();
        if kind != TokenKind::RParen {
            return Err(ParseError::UnclosedAggregate {
                func,
                found: kind,
                position,
            });
        }
        self.advance();
        self.leave();

        Ok(Expr::aggregate(func, arg))
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match &self.current().kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_factor()?;

            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;

            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_additive()
    }

    /// Parse a complete formula; anything left after the top-level
    /// expression is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;

        let Token { kind, position } = self.current().clone();
        if kind != TokenKind::Eof {
            return Err(ParseError::UnexpectedTokens {
                found: kind,
                position,
            });
        }
        Ok(expr)
    }
}
