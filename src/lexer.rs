use rust_decimal::Decimal;

use crate::ast::{Token, TokenKind};

/// Character offset into the formula source.
pub type Position = usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: Position },

    #[error("Invalid number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_decimal = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Rounding would turn a tiny non-zero literal into zero
        Decimal::from_str_exact(&number)
            .map(TokenKind::Number)
            .map_err(|_| LexError::InvalidNumber {
                literal: number,
                position: start,
            })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('+') => self.single(TokenKind::Plus),
            Some('-') => self.single(TokenKind::Minus),
            Some('*') => self.single(TokenKind::Star),
            Some('/') => self.single(TokenKind::Slash),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "SUM" => TokenKind::Sum,
                    "AVG" => TokenKind::Avg,
                    _ => TokenKind::Identifier(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => {
                return Err(LexError::UnexpectedCharacter {
                    ch,
                    position: self.position,
                });
            }
        };

        Ok(Token::new(kind, start))
    }

    /// Lex the whole input, ending with a single `Eof` token.
    ///
    /// Fails on the first bad character; no partial stream is returned.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::trace!(count = tokens.len(), "tokenized formula");
        Ok(tokens)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("SUM AVG sum Avg");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Sum);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Avg);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("sum".to_string())
    );
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("Avg".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_aggregation_call() {
    let mut lexer = Lexer::new("SUM(price * 2)");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Sum);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LParen);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("price".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Star);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number(Decimal::from(2)));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RParen);
}
