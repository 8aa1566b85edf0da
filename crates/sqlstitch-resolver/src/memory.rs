//! In-memory placeholder resolver
//!
//! Holds a fixed mapping from placeholders to raw values without touching
//! any external store. It's useful for:
//! - Unit and integration testing of the rewrite engine
//! - Demos with a small, hand-written vocabulary
//! - Simulating resolver failures and slow lookups
//!
//! Every request is recorded, so tests can assert how often and with which
//! arguments the engine called back.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlstitch_resolver::{MemoryResolver, PlaceholderKind};
//!
//! let resolver = MemoryResolver::builder()
//!     .with_table("sales", ["sales_2024", "region = 'EU'"])
//!     .with_column("revenue", ["q1", "q2", "q3"])
//!     .build();
//! ```

use crate::resolver::{PlaceholderResolver, ResolveError, ResolveRequest};
use sqlstitch_core::PlaceholderKind;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Key = (PlaceholderKind, String);

/// In-memory resolver for testing
///
/// Unknown placeholders resolve to an empty list, which the engine treats
/// as "leave it alone".
pub struct MemoryResolver {
    /// Raw values by kind and name
    values: Arc<RwLock<HashMap<Key, Vec<String>>>>,

    /// Errors to return for specific placeholders
    errors: Arc<RwLock<HashMap<Key, ResolveError>>>,

    /// Every request seen, in arrival order
    requests: Arc<RwLock<Vec<ResolveRequest>>>,

    /// Simulated lookup latency (milliseconds)
    latency_ms: u64,
}

impl MemoryResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::from_parts(HashMap::new(), HashMap::new(), 0)
    }

    /// Start building a resolver with predefined values
    pub fn builder() -> MemoryResolverBuilder {
        MemoryResolverBuilder::new()
    }

    fn from_parts(
        values: HashMap<Key, Vec<String>>,
        errors: HashMap<Key, ResolveError>,
        latency_ms: u64,
    ) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
            errors: Arc::new(RwLock::new(errors)),
            requests: Arc::new(RwLock::new(Vec::new())),
            latency_ms,
        }
    }

    /// Set the raw values for a placeholder
    pub async fn insert<I, S>(&self, kind: PlaceholderKind, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.values.write().await.insert((kind, name.to_string()), values);
    }

    /// Make lookups of a placeholder fail with `error`
    pub async fn insert_error(&self, kind: PlaceholderKind, name: &str, error: ResolveError) {
        self.errors.write().await.insert((kind, name.to_string()), error);
    }

    /// Configure simulated latency for every lookup
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// All requests received so far
    pub async fn requests(&self) -> Vec<ResolveRequest> {
        self.requests.read().await.clone()
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Forget recorded requests
    pub async fn clear_requests(&self) {
        self.requests.write().await.clear();
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MemoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryResolver {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            errors: Arc::clone(&self.errors),
            requests: Arc::clone(&self.requests),
            latency_ms: self.latency_ms,
        }
    }
}

#[async_trait::async_trait]
impl PlaceholderResolver for MemoryResolver {
    async fn resolve(&self, request: ResolveRequest) -> Result<Vec<String>, ResolveError> {
        tracing::trace!(%request, "memory resolver lookup");
        self.requests.write().await.push(request.clone());
        self.simulate_latency().await;

        let key = (request.kind, request.name);

        if let Some(error) = self.errors.read().await.get(&key) {
            return Err(error.clone());
        }

        Ok(self.values.read().await.get(&key).cloned().unwrap_or_default())
    }
}

/// Builder for creating a MemoryResolver with many placeholders
///
/// # Example
///
/// ```rust,ignore
/// let resolver = MemoryResolverBuilder::new()
///     .with_table("t", ["users"])
///     .with_column("who", ["first_name", "last_name"])
///     .with_error(PlaceholderKind::Column, "secret", ResolveError::Backend("denied".into()))
///     .with_latency(5)
///     .build();
/// ```
pub struct MemoryResolverBuilder {
    values: HashMap<Key, Vec<String>>,
    errors: HashMap<Key, ResolveError>,
    latency_ms: u64,
}

impl MemoryResolverBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            errors: HashMap::new(),
            latency_ms: 0,
        }
    }

    /// Add raw values for a table placeholder
    pub fn with_table<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_values(PlaceholderKind::Table, name, values)
    }

    /// Add raw values for a column placeholder
    pub fn with_column<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_values(PlaceholderKind::Column, name, values)
    }

    /// Add raw values for any placeholder kind
    pub fn with_values<I, S>(mut self, kind: PlaceholderKind, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.insert(
            (kind, name.to_string()),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Make lookups of a placeholder fail
    pub fn with_error(mut self, kind: PlaceholderKind, name: &str, error: ResolveError) -> Self {
        self.errors.insert((kind, name.to_string()), error);
        self
    }

    /// Configure simulated latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the resolver
    pub fn build(self) -> MemoryResolver {
        MemoryResolver::from_parts(self.values, self.errors, self.latency_ms)
    }
}

impl Default for MemoryResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
