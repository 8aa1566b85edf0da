//! Folding resolved columns into SUM / AVG expressions

use crate::nodes::{binary, nested, number};
use sqlparser::ast::{BinaryOperator, Expr};

/// Sum of all expressions, left-associative and parenthesized
///
/// `[]` is `0`, `[a]` is `a`, `[a, b, c]` is `((a + b) + c)`.
pub fn sum(exprs: Vec<Expr>) -> Expr {
    let mut exprs = exprs.into_iter();

    let Some(first) = exprs.next() else {
        return number(0);
    };

    exprs.fold(first, |acc, next| nested(binary(acc, BinaryOperator::Plus, next)))
}

/// Average as `(sum / count)`
///
/// The count is the number of inputs, fixed at rewrite time, so NULL
/// columns still count towards it. `[]` is `0`.
pub fn avg(exprs: Vec<Expr>) -> Expr {
    if exprs.is_empty() {
        return number(0);
    }

    let count = exprs.len();
    nested(binary(sum(exprs), BinaryOperator::Divide, number(count)))
}
