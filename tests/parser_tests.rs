// tests/parser_tests.rs

use kpi_formula::ast::{AggregateFn, BinOp, Expr, TokenKind};
use kpi_formula::lexer::{LexError, Lexer};
use kpi_formula::parser::{MAX_NESTING_DEPTH, ParseError, Parser};
use rust_decimal::Decimal;

fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(Lexer::new(input))?;
    parser.parse()
}

fn num(n: i64) -> Expr {
    Expr::Literal(Decimal::from(n))
}

fn field(name: &str) -> Expr {
    Expr::Field(name.to_string())
}

// ============================================================================
// Simple tests
// ============================================================================

#[test]
fn test_single_operands() {
    assert_eq!(parse("42").unwrap(), num(42));
    assert_eq!(parse("revenue").unwrap(), field("revenue"));
    assert_eq!(parse("(revenue)").unwrap(), field("revenue"));
}

#[test]
fn test_arithmetic() {
    // Should be: Add(1, Multiply(2, 3))
    let expr = parse("1 + 2 * 3").unwrap();
    assert_eq!(
        expr,
        Expr::binary(BinOp::Add, num(1), Expr::binary(BinOp::Multiply, num(2), num(3)))
    );
}

#[test]
fn test_parentheses() {
    // Should be: Multiply(Add(1, 2), 3)
    let expr = parse("(1 + 2) * 3").unwrap();
    match &expr {
        Expr::BinaryOp {
            op: BinOp::Multiply,
            left,
            right,
        } => {
            assert!(matches!(**left, Expr::BinaryOp { op: BinOp::Add, .. }));
            assert_eq!(**right, num(3));
        }
        _ => panic!("Expected multiplication"),
    }
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        parse("a - b - c").unwrap(),
        Expr::binary(
            BinOp::Subtract,
            Expr::binary(BinOp::Subtract, field("a"), field("b")),
            field("c")
        )
    );
    assert_eq!(
        parse("a / b * c").unwrap(),
        Expr::binary(
            BinOp::Multiply,
            Expr::binary(BinOp::Divide, field("a"), field("b")),
            field("c")
        )
    );
}

#[test]
fn test_deeply_nested_parentheses() {
    let input = format!("{}x{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(parse(&input).unwrap(), field("x"));
}

// ============================================================================
// Aggregations
// ============================================================================

#[test]
fn test_aggregations() {
    let expr = parse("SUM(price * quantity) / AVG(cost)").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinOp::Divide,
            Expr::aggregate(
                AggregateFn::Sum,
                Expr::binary(BinOp::Multiply, field("price"), field("quantity"))
            ),
            Expr::aggregate(AggregateFn::Avg, field("cost"))
        )
    );
}

#[test]
fn test_nested_aggregation() {
    let expr = parse("SUM(AVG(x) + 1)").unwrap();
    assert_eq!(
        expr,
        Expr::aggregate(
            AggregateFn::Sum,
            Expr::binary(BinOp::Add, Expr::aggregate(AggregateFn::Avg, field("x")), num(1))
        )
    );
}

#[test]
fn test_bare_keyword_is_not_a_field() {
    let err = parse("SUM revenue").unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingOpenParen {
            func: AggregateFn::Sum,
            position: 0
        }
    );
    assert_eq!(err.to_string(), "Expected '(' after SUM");

    let err = parse("1 + AVG").unwrap_err();
    assert_eq!(err.to_string(), "Expected '(' after AVG");
}

#[test]
fn test_empty_aggregation() {
    let err = parse("SUM()").unwrap_err();
    assert!(matches!(
        err,
        ParseError::EmptyArgument {
            func: AggregateFn::Sum,
            position: 4
        }
    ));
    assert!(err.to_string().starts_with("Invalid formula"));
}

#[test]
fn test_unclosed_aggregation() {
    let err = parse("SUM(revenue").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnclosedAggregate {
            func: AggregateFn::Sum,
            found: TokenKind::Eof,
            position: 11
        }
    );
    assert!(err.to_string().starts_with("Expected ')'"));

    let err = parse("AVG(a b)").unwrap_err();
    assert!(matches!(err, ParseError::UnclosedAggregate { position: 6, .. }));
}

#[test]
fn test_lowercase_keyword_is_a_field() {
    // `sum` parses as a field, leaving `(x)` behind
    let err = parse("sum(x)").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedTokens {
            found: TokenKind::LParen,
            position: 3
        }
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_mismatched_parentheses() {
    let test_cases = vec![("(1 + 2", 0), ("((1 + 2)", 0), ("a * (b - (c)", 4), ("(", 0)];

    for (input, open) in test_cases {
        assert_eq!(
            parse(input).unwrap_err(),
            ParseError::MismatchedParentheses { open },
            "Failed for input: {}",
            input
        );
    }
    assert!(parse("(1 + 2").unwrap_err().to_string().starts_with("Mismatched parentheses"));
}

#[test]
fn test_group_closed_by_wrong_token() {
    let err = parse("(1 + 2 3)").unwrap_err();
    assert!(matches!(err, ParseError::MissingCloseParen { position: 7, .. }));
}

#[test]
fn test_stray_closing_paren() {
    assert_eq!(
        parse(")").unwrap_err(),
        ParseError::UnexpectedToken {
            found: TokenKind::RParen,
            position: 0
        }
    );
    assert_eq!(
        parse("1 + )").unwrap_err(),
        ParseError::UnexpectedToken {
            found: TokenKind::RParen,
            position: 4
        }
    );
}

#[test]
fn test_trailing_tokens() {
    let test_cases = vec![("1 + 2)", 5), ("1 2", 2), ("price quantity", 6), ("(a) (b)", 4)];

    for (input, position) in test_cases {
        match parse(input).unwrap_err() {
            ParseError::UnexpectedTokens { position: p, .. } => {
                assert_eq!(p, position, "Failed for input: {}", input)
            }
            other => panic!("Expected UnexpectedTokens, got {:?} for input: {}", other, input),
        }
    }
}

#[test]
fn test_incomplete_expressions() {
    let test_cases = vec![
        ("1 +", TokenKind::Eof, 3),
        ("+ 1", TokenKind::Plus, 0),
        ("-5", TokenKind::Minus, 0),
        ("a * / b", TokenKind::Slash, 4),
        ("SUM(", TokenKind::Eof, 4),
    ];

    for (input, found, position) in test_cases {
        assert_eq!(
            parse(input).unwrap_err(),
            ParseError::InvalidFormula { found, position },
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_empty_group() {
    assert_eq!(parse("()").unwrap_err(), ParseError::EmptyGroup { position: 0 });
}

#[test]
fn test_lex_error_fails_construction() {
    let err = Parser::new(Lexer::new("1 + @")).err().unwrap();
    assert_eq!(
        err,
        ParseError::Lex(LexError::UnexpectedCharacter {
            ch: '@',
            position: 4
        })
    );
}

#[test]
fn test_nesting_limit() {
    let at_limit = format!(
        "{}x{}",
        "(".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );
    assert!(parse(&at_limit).is_ok());

    let too_deep = format!(
        "{}x{}",
        "(".repeat(MAX_NESTING_DEPTH + 1),
        ")".repeat(MAX_NESTING_DEPTH + 1)
    );
    assert!(matches!(
        parse(&too_deep).unwrap_err(),
        ParseError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
            ..
        }
    ));

    let aggregates = format!(
        "{}x{}",
        "SUM(".repeat(MAX_NESTING_DEPTH + 1),
        ")".repeat(MAX_NESTING_DEPTH + 1)
    );
    assert!(matches!(
        parse(&aggregates).unwrap_err(),
        ParseError::NestingTooDeep { .. }
    ));
}

// ============================================================================
// Tree helpers
// ============================================================================

#[test]
fn test_referenced_fields() {
    let expr = parse("SUM(price * quantity) / AVG(price) + tax").unwrap();
    assert_eq!(expr.referenced_fields(), vec!["price", "quantity", "tax"]);
    assert!(expr.contains_aggregate());
    assert!(!parse("a + 1").unwrap().contains_aggregate());
}

#[test]
fn test_tree_helpers_on_long_chain() {
    let expr = parse(&vec!["a * b"; 200_000].join(" + ")).unwrap();
    assert_eq!(expr.depth(), 200_001);
    assert_eq!(expr.referenced_fields(), vec!["a", "b"]);
    assert!(!expr.contains_aggregate());
}

#[test]
fn test_depth() {
    assert_eq!(parse("x").unwrap().depth(), 1);
    assert_eq!(parse("a + b * c").unwrap().depth(), 3);
    assert_eq!(parse("SUM(a)").unwrap().depth(), 2);
}

#[test]
fn test_canonical_display() {
    let expr = parse("SUM(price * quantity) / AVG(cost) - 1.50").unwrap();
    assert_eq!(
        expr.to_string(),
        "SUM(price * quantity) / AVG(cost) - 1.50"
    );
}

#[test]
fn test_canonical_display_keeps_required_groups() {
    let test_cases = vec![
        ("((a + b))", "a + b"),
        ("(a + b) * c", "(a + b) * c"),
        ("a * (b + c)", "a * (b + c)"),
        ("(a - b) - c", "a - b - c"),
        ("a - (b - c)", "a - (b - c)"),
        ("a / (b * c)", "a / (b * c)"),
        ("(a * b) + c", "a * b + c"),
        ("SUM((x))", "SUM(x)"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse(input).unwrap().to_string(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_canonical_display_reparses() {
    let inputs = vec![
        "1 + 2 * 3",
        "a - (b - c)",
        "SUM(x + y) / AVG(z * 2)",
        "((revenue))",
        "(a * (b / (c - d))) / e",
        "SUM(AVG(x) - (y - z)) * 2",
    ];

    for input in inputs {
        let expr = parse(input).unwrap();
        let reparsed = parse(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed, "Failed for input: {}", input);
    }

    // A chain longer than the nesting limit renders flat
    let chain = vec!["x"; MAX_NESTING_DEPTH + 44].join(" - ");
    let expr = parse(&chain).unwrap();
    assert_eq!(expr.to_string(), chain);
    assert_eq!(parse(&expr.to_string()).unwrap(), expr);

    // Groups at the limit stay within it
    let nested = format!(
        "{}x{}",
        "(a - ".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );
    let expr = parse(&nested).unwrap();
    assert_eq!(parse(&expr.to_string()).unwrap(), expr);
}
