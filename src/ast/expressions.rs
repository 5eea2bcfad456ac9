use std::{fmt, mem};

use rust_decimal::Decimal;

use crate::ast::{AggregateFn, BinOp};

/// Abstract Syntax Tree node representing a parsed formula.
///
/// Every `BinaryOp` and `Aggregate` owns fully formed children; the parser
/// never produces a partial node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    ///
    /// # Example
    /// ```text
    /// 100
    /// 0.25
    /// ```
    Literal(Decimal),

    /// Reference to a data column, resolved downstream
    ///
    /// # Example
    /// ```text
    /// revenue
    /// ```
    Field(String),

    /// Arithmetic on two operands
    ///
    /// # Examples
    /// ```text
    /// price * quantity
    /// revenue - cost
    /// ```
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Aggregation over exactly one argument expression
    ///
    /// # Examples
    /// ```text
    /// SUM(price * quantity)
    /// AVG(cost)
    /// ```
    Aggregate { func: AggregateFn, arg: Box<Expr> },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn aggregate(func: AggregateFn, arg: Expr) -> Self {
        Expr::Aggregate {
            func,
            arg: Box::new(arg),
        }
    }

    /// Distinct field names in the order they first appear.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            match node {
                Expr::Literal(_) => {}
                Expr::Field(name) => {
                    if !fields.contains(&name.as_str()) {
                        fields.push(name);
                    }
                }
                Expr::BinaryOp { left, right, .. } => {
                    pending.push(right.as_ref());
                    pending.push(left.as_ref());
                }
                Expr::Aggregate { arg, .. } => pending.push(arg.as_ref()),
            }
        }
        fields
    }

    /// Height of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            match node {
                Expr::Literal(_) | Expr::Field(_) => {}
                Expr::BinaryOp { left, right, .. } => {
                    pending.push((left.as_ref(), level + 1));
                    pending.push((right.as_ref(), level + 1));
                }
                Expr::Aggregate { arg, .. } => pending.push((arg.as_ref(), level + 1)),
            }
        }
        deepest
    }

    pub fn contains_aggregate(&self) -> bool {
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            match node {
                Expr::Literal(_) | Expr::Field(_) => {}
                Expr::BinaryOp { left, right, .. } => {
                    pending.push(left.as_ref());
                    pending.push(right.as_ref());
                }
                Expr::Aggregate { .. } => return true,
            }
        }
        false
    }

    fn take_subtrees(&mut self, pending: &mut Vec<Expr>) {
        let mut take = |child: &mut Box<Expr>| {
            if matches!(**child, Expr::BinaryOp { .. } | Expr::Aggregate { .. }) {
                pending.push(mem::replace(&mut **child, Expr::Literal(Decimal::ZERO)));
            }
        };
        match self {
            Expr::Literal(_) | Expr::Field(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                take(left);
                take(right);
            }
            Expr::Aggregate { arg, .. } => take(arg),
        }
    }
}

// Operator chains parse into left-deep trees of arbitrary height; unlink
// subtrees onto a heap stack so dropping never recurses more than one level.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_subtrees(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_subtrees(&mut pending);
        }
    }
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Subtract => 1,
        BinOp::Multiply | BinOp::Divide => 2,
    }
}

/// Whether `child` must be grouped to keep its place under `parent`.
///
/// All operators are left-associative, so a right operand of equal
/// precedence keeps its parentheses and a left one does not.
fn needs_group(parent: BinOp, child: &Expr, is_right: bool) -> bool {
    match child {
        Expr::BinaryOp { op, .. } => {
            let (inner, outer) = (precedence(*op), precedence(parent));
            inner < outer || (is_right && inner == outer)
        }
        _ => false,
    }
}

enum Piece<'a> {
    Node(&'a Expr),
    Op(BinOp),
    Text(&'static str),
}

/// Canonical form: only the parentheses the tree shape requires, so the
/// output re-parses to the same tree and never nests deeper than the source.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];

        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Op(op) => write!(f, " {} ", op)?,
                Piece::Node(Expr::Literal(n)) => write!(f, "{}", n)?,
                Piece::Node(Expr::Field(name)) => f.write_str(name)?,
                Piece::Node(Expr::Aggregate { func, arg }) => {
                    write!(f, "{}(", func)?;
                    pending.push(Piece::Text(")"));
                    pending.push(Piece::Node(arg));
                }
                Piece::Node(Expr::BinaryOp { op, left, right }) => {
                    // Pushed in reverse of output order
                    let group_right = needs_group(*op, right, true);
                    if group_right {
                        pending.push(Piece::Text(")"));
                    }
                    pending.push(Piece::Node(right));
                    if group_right {
                        pending.push(Piece::Text("("));
                    }
                    pending.push(Piece::Op(*op));

                    let group_left = needs_group(*op, left, false);
                    if group_left {
                        pending.push(Piece::Text(")"));
                    }
                    pending.push(Piece::Node(left));
                    if group_left {
                        pending.push(Piece::Text("("));
                    }
                }
            }
        }
        Ok(())
    }
}
