//! Classification of raw resolver values into AST nodes
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. `null` (any case) becomes a NULL literal
//! 2. `true` / `false` (any case) become boolean literals
//! 3. numeric text becomes a number literal
//! 4. a single-quoted one-character string becomes a string literal
//! 5. a bare word or double-quoted name becomes a column reference
//! 6. anything else is parsed as a SQL expression
//!
//! Step 3 only accepts a single character drawn from digits, `.`, `-` and `e`
//! unless [`ClassifierOptions::full_numeric_literals`] is set. Multi-digit
//! text such as `42` therefore reaches step 5 by default.

use crate::nodes;
use crate::parser::{ParseError, SqlParser};
use crate::sanitize::escape_operators;
use regex::Regex;
use sqlparser::ast::Expr;
use sqlstitch_core::ClassifierOptions;
use std::sync::LazyLock;

static NULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^null$").expect("valid pattern"));
static BOOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(true|false)$").expect("valid pattern"));
static SINGLE_CHAR_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9.\-e]$").expect("valid pattern"));
static FULL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-?([0-9]+\.?[0-9]*|\.[0-9]+)(e[-+]?[0-9]+)?$").expect("valid pattern")
});
static STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'[^']'$").expect("valid pattern"));

/// Turns raw resolver strings into expressions
pub struct ValueClassifier<'a> {
    parser: &'a SqlParser,
    options: ClassifierOptions,
}

impl<'a> ValueClassifier<'a> {
    pub fn new(parser: &'a SqlParser, options: ClassifierOptions) -> Self {
        Self { parser, options }
    }

    /// Classify one raw value
    ///
    /// Only the expression fallback can fail, with the parser's error.
    pub fn classify(&self, raw: &str) -> Result<Expr, ParseError> {
        let value = raw.trim();

        let expr = if NULL.is_match(value) {
            nodes::null()
        } else if BOOL.is_match(value) {
            nodes::boolean(value.eq_ignore_ascii_case("true"))
        } else if let Some(n) = self.numeric(value) {
            nodes::number(n)
        } else if STRING.is_match(value) {
            nodes::string(&value[1..value.len() - 1])
        } else if let Some(ident) = nodes::parse_identifier(value) {
            Expr::Identifier(ident)
        } else {
            self.parser.parse_condition(&escape_operators(value))?
        };

        tracing::trace!(raw, %expr, "classified resolver value");
        Ok(expr)
    }

    fn numeric(&self, value: &str) -> Option<f64> {
        let pattern = if self.options.full_numeric_literals {
            &FULL_NUMBER
        } else {
            &SINGLE_CHAR_NUMBER
        };

        if !pattern.is_match(value) {
            return None;
        }

        // `.`, `-` and `e` pass the single-character pattern but are not numbers
        value.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}
