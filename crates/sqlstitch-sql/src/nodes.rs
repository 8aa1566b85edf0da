//! AST node constructors shared by the rewrite stages
//!
//! Every node built here is a shape sqlparser prints itself: literals,
//! identifiers, binary operations and parentheses.

use regex::Regex;
use sqlparser::ast::{BinaryOperator, Expr, Ident, Value};
use std::fmt::Display;
use std::sync::LazyLock;

/// Bare word or double-quoted name, as returned by resolvers
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[A-Za-z0-9_]+$|^"[^"]+"$"#).expect("valid identifier pattern"));

/// Names that print safely without quotes
static PLAIN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name pattern"));

/// Numeric literal
pub fn number(value: impl Display) -> Expr {
    Expr::Value(Value::Number(value.to_string(), false))
}

/// Boolean literal
pub fn boolean(value: bool) -> Expr {
    Expr::Value(Value::Boolean(value))
}

/// NULL literal
pub fn null() -> Expr {
    Expr::Value(Value::Null)
}

/// Single-quoted string literal
pub fn string(value: impl Into<String>) -> Expr {
    Expr::Value(Value::SingleQuotedString(value.into()))
}

/// `left op right`
pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// `(expr)`
pub fn nested(expr: Expr) -> Expr {
    Expr::Nested(Box::new(expr))
}

/// Identifier for a name, quoted only when it would not print as a plain word
pub fn name_ident(name: &str) -> Ident {
    if PLAIN_NAME.is_match(name) {
        Ident::new(name)
    } else {
        Ident::with_quote('"', name)
    }
}

/// Identifier that is always double-quoted (aliases built from free text)
pub fn quoted_ident(name: impl Into<String>) -> Ident {
    Ident::with_quote('"', name)
}

/// Recognize resolver text that names an identifier
///
/// A bare word keeps its spelling; a double-quoted name has its quotes
/// stripped and is quoted again on output.
pub fn parse_identifier(raw: &str) -> Option<Ident> {
    if !IDENTIFIER.is_match(raw) {
        return None;
    }

    match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => Some(quoted_ident(inner)),
        None => Some(name_ident(raw)),
    }
}

/// Name of a column reference, if `expr` is one
pub fn column_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.as_str()),
        Expr::CompoundIdentifier(idents) => idents.last().map(|i| i.value.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_print() {
        assert_eq!(number(0).to_string(), "0");
        assert_eq!(number(2.5).to_string(), "2.5");
        assert_eq!(boolean(true).to_string(), "true");
        assert_eq!(null().to_string(), "NULL");
        assert_eq!(string("a").to_string(), "'a'");
    }

    #[test]
    fn binary_and_nested() {
        let expr = nested(binary(number(1), BinaryOperator::Plus, number(2)));
        assert_eq!(expr.to_string(), "(1 + 2)");
    }

    #[test]
    fn bare_and_quoted_identifiers() {
        let bare = parse_identifier("users").unwrap();
        assert_eq!(bare.value, "users");
        assert_eq!(bare.quote_style, None);

        let quoted = parse_identifier("\"My Col\"").unwrap();
        assert_eq!(quoted.value, "My Col");
        assert_eq!(quoted.to_string(), "\"My Col\"");
    }

    #[test]
    fn digit_leading_words_are_quoted() {
        let ident = parse_identifier("42").unwrap();
        assert_eq!(ident.value, "42");
        assert_eq!(ident.to_string(), "\"42\"");
    }

    #[test]
    fn non_identifiers() {
        assert!(parse_identifier("age > 18").is_none());
        assert!(parse_identifier("'a'").is_none());
        assert!(parse_identifier("a.b").is_none());
        assert!(parse_identifier("").is_none());
        assert!(parse_identifier("\"\"").is_none());
    }

    #[test]
    fn quoted_ident_doubles_quotes_on_output() {
        assert_eq!(quoted_ident("say \"hi\"").to_string(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn column_names() {
        let expr = Expr::CompoundIdentifier(vec![Ident::new("t"), Ident::new("a")]);
        assert_eq!(column_name(&expr), Some("a"));
        assert_eq!(column_name(&Expr::Identifier(Ident::new("b"))), Some("b"));
        assert_eq!(column_name(&number(1)), None);
    }
}
