//! Placeholder rewriting for SQL SELECT statements
//!
//! This crate handles:
//! - Cleaning and parsing query text using datafusion-sqlparser-rs
//! - Resolving table placeholders in FROM into tables and extra filters
//! - Classifying resolver values into literals, columns or expressions
//! - Expanding column placeholders in SELECT, WHERE, HAVING, GROUP BY, ORDER BY
//! - Folding SUM/AVG hinted placeholders into arithmetic
//! - Splicing extra filters into WHERE and clamping LIMIT

pub mod parser;
pub mod sanitize;
pub mod nodes;
pub mod classify;
pub mod aggregate;
pub mod columns;
pub mod walker;
pub mod clauses;
pub mod from;
pub mod limit;
pub mod error;
pub mod rewrite;

pub use parser::{SqlParser, ParseError};
pub use classify::ValueClassifier;
pub use columns::ColumnResolver;
pub use from::ResolvedFrom;
pub use error::RewriteError;
pub use rewrite::{rewrite, Rewriter};
pub use sqlstitch_core::{RewriteOptions, DialectConfig, ClassifierOptions, PlaceholderKind, Hint};
pub use sqlstitch_resolver::{PlaceholderResolver, ResolveRequest, ResolveError, FnResolver, MemoryResolver};
