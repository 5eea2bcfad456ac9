pub mod ast;
pub mod cli;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod validator;

pub use ast::{AggregateFn, BinOp, Expr, Token, TokenKind};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{MAX_NESTING_DEPTH, ParseError, Parser};
pub use report::{ErrorReport, ValidationReport};
pub use validator::{ErrorKind, ValidationError, check_semantics, parse_formula, validate_formula};
