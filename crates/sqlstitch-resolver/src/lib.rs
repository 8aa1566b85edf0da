//! Placeholder resolvers
//!
//! A resolver turns a placeholder name into raw replacement strings. The
//! rewrite engine calls it once per placeholder occurrence group, possibly
//! many times concurrently for one statement, so implementations must be
//! safe to share.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlstitch_resolver::{FnResolver, ResolveRequest, PlaceholderKind};
//!
//! let resolver = FnResolver::new(|request: ResolveRequest| async move {
//!     match (request.kind, request.name.as_str()) {
//!         (PlaceholderKind::Table, "sales") => Ok(vec!["sales_2024".to_string()]),
//!         (PlaceholderKind::Column, "revenue") => Ok(vec!["q1".into(), "q2".into()]),
//!         _ => Ok(vec![]),
//!     }
//! });
//! ```

pub mod resolver;
pub mod memory;

pub use resolver::{PlaceholderResolver, ResolveRequest, ResolveError, FnResolver};
pub use memory::{MemoryResolver, MemoryResolverBuilder};
pub use sqlstitch_core::{PlaceholderKind, Hint};
