//! Resolver trait for looking up placeholder values

use sqlstitch_core::{Hint, PlaceholderKind};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// One placeholder lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Placeholder name with any hint prefix removed
    pub name: String,

    /// Whether a column or a table is wanted
    pub kind: PlaceholderKind,

    /// Hint taken from the placeholder prefix
    pub hint: Option<Hint>,

    /// Tables the statement resolved to. `None` for table lookups.
    pub from: Option<Vec<String>>,
}

impl ResolveRequest {
    /// Create a table lookup (no hint, no FROM context)
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlaceholderKind::Table,
            hint: None,
            from: None,
        }
    }

    /// Create a column lookup against the resolved FROM tables
    pub fn column(name: impl Into<String>, hint: Option<Hint>, from: &[String]) -> Self {
        Self {
            name: name.into(),
            kind: PlaceholderKind::Column,
            hint,
            from: Some(from.to_vec()),
        }
    }
}

impl fmt::Display for ResolveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hint {
            Some(hint) => write!(f, "{} {}:{}", self.kind, hint, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Errors a resolver can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Unknown placeholder: {0}")]
    UnknownPlaceholder(String),

    #[error("Resolver backend failed: {0}")]
    Backend(String),
}

/// Trait for anything that can resolve placeholders
///
/// For `PlaceholderKind::Table` every returned string is either an
/// identifier (bare word or double-quoted name) that becomes a table, or any
/// other text, which is treated as an extra filter predicate. For
/// `PlaceholderKind::Column` each string is a literal, an identifier or a
/// SQL expression. An empty result means "nothing to substitute".
#[async_trait::async_trait]
pub trait PlaceholderResolver: Send + Sync {
    async fn resolve(&self, request: ResolveRequest) -> Result<Vec<String>, ResolveError>;
}

#[async_trait::async_trait]
impl<T: PlaceholderResolver + ?Sized> PlaceholderResolver for Arc<T> {
    async fn resolve(&self, request: ResolveRequest) -> Result<Vec<String>, ResolveError> {
        (**self).resolve(request).await
    }
}

/// Resolver backed by an async closure
pub struct FnResolver<F> {
    f: F,
}

impl<F, Fut> FnResolver<F>
where
    F: Fn(ResolveRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>, ResolveError>> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait::async_trait]
impl<F, Fut> PlaceholderResolver for FnResolver<F>
where
    F: Fn(ResolveRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>, ResolveError>> + Send,
{
    async fn resolve(&self, request: ResolveRequest) -> Result<Vec<String>, ResolveError> {
        (self.f)(request).await
    }
}
