//! SQLStitch Core
//!
//! Shared vocabulary for placeholder rewriting: what kind of thing a
//! placeholder stands for, which aggregation hint it carries, and the
//! options that steer a rewrite.

pub mod placeholder;
pub mod config;

pub use placeholder::{PlaceholderKind, Hint, Placeholder};
pub use config::{RewriteOptions, DialectConfig, ClassifierOptions, ConfigError};
