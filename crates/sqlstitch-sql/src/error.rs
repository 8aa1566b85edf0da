//! Rewrite errors

use crate::parser::ParseError;
use sqlstitch_resolver::ResolveError;

/// Anything that stops a rewrite
///
/// There is no partial success: the first error aborts the whole rewrite
/// and nothing resolved so far is returned.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Input is not a single SELECT, or FROM holds something other than tables
    #[error("Unsupported statement, only SELECT can be rewritten: {0}")]
    UnsupportedStatement(String),

    /// The query, a resolved expression or an extra predicate failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The caller's resolver failed
    #[error("Placeholder resolution failed: {0}")]
    Resolver(#[from] ResolveError),
}
