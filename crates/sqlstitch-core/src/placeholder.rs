//! Placeholder vocabulary
//!
//! A placeholder is a bare identifier in a query template whose meaning is
//! supplied at rewrite time. Its text may start with a hint prefix such as
//! `sum:` or `all:` that selects how multiple resolved values are combined.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// What a placeholder stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    /// A column (or column expression) in SELECT, WHERE, HAVING, GROUP BY, ORDER BY
    Column,

    /// A table in FROM
    Table,
}

impl PlaceholderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution hint carried by a placeholder prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hint {
    /// Expand into every resolved value (`all:`, `each:`, `every:`)
    All,

    /// Fold resolved values into a sum (`sum:`, `total:`, ...)
    Sum,

    /// Fold resolved values into an average (`avg:`, `mean:`, ...)
    Avg,
}

impl Hint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Sum => "sum",
            Self::Avg => "avg",
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hint prefixes in priority order. First match wins.
static HINT_PREFIXES: LazyLock<Vec<(Regex, Hint)>> = LazyLock::new(|| {
    [
        (r"(?i)^(all|each|every):", Hint::All),
        (r"(?i)^(sum|gross|total|whole|aggregate):", Hint::Sum),
        (r"(?i)^(avg|mid|par|mean|norm|center|centre|average|midpoint):", Hint::Avg),
    ]
    .into_iter()
    .map(|(pattern, hint)| (Regex::new(pattern).expect("valid hint pattern"), hint))
    .collect()
});

/// A placeholder split into its name and optional hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Name passed to the resolver, prefix stripped
    pub name: &'a str,

    /// Hint derived from the prefix, if any
    pub hint: Option<Hint>,
}

impl<'a> Placeholder<'a> {
    /// Split placeholder text into hint and name
    ///
    /// When a hint prefix matches, everything up to and including the first
    /// `:` is removed. Text without a recognized prefix is returned as-is,
    /// even if it contains a colon.
    pub fn parse(text: &'a str) -> Self {
        let hint = HINT_PREFIXES
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map(|(_, hint)| *hint);

        let name = match hint {
            Some(_) => text.split_once(':').map(|(_, rest)| rest).unwrap_or(text),
            None => text,
        };

        Self { name, hint }
    }
}
