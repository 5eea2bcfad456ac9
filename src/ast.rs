//! # KPI Formula Language - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree for KPI metric formulas:
//! arithmetic over data fields and numeric literals, with `SUM`/`AVG`
//! aggregations.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, fields, operations, aggregations)
//! - **[operators]** - Arithmetic operators and aggregation functions
//!
//! ## Grammar
//!
//! ```text
//! expression   := term (('+' | '-') term)*
//! term         := factor (('*' | '/') factor)*
//! factor       := number | identifier | aggregation | '(' expression ')'
//! aggregation  := ('SUM' | 'AVG') '(' expression ')'
//! ```
//!
//! Multiplication and division bind tighter than addition and subtraction;
//! all four are left-associative.
//!
//! ## Examples
//!
//! ```text
//! SUM(price * quantity) / AVG(cost)
//! (revenue - cost) / revenue * 100
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{AggregateFn, BinOp};
pub use tokens::{Token, TokenKind};
