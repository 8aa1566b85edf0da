//! Rewrite configuration (sqlstitch.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// SQL dialect configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// BigQuery SQL dialect
    BigQuery,

    /// Snowflake SQL dialect
    Snowflake,

    /// PostgreSQL SQL dialect
    Postgres,

    /// Generic ANSI SQL
    Ansi,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::Ansi
    }
}

/// How raw resolver values are classified into literals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Recognize multi-character numeric literals such as `42` or `-1.5e3`.
    ///
    /// When off, only a single character drawn from digits, `.`, `-` and `e`
    /// is treated as a number; longer numeric text like `42` is classified
    /// as an identifier.
    #[serde(default)]
    pub full_numeric_literals: bool,
}

/// Options for a single rewrite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewriteOptions {
    /// Table used when FROM resolves to nothing
    #[serde(default)]
    pub from: Option<String>,

    /// Global maximum row count
    #[serde(default)]
    pub limit: Option<u64>,

    /// Maximum row count per table, keyed by the first resolved table.
    /// Takes precedence over `limit` when present.
    #[serde(default)]
    pub limits: Option<HashMap<String, u64>>,

    /// SQL dialect used to parse queries and resolved expressions
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Value classification settings
    #[serde(default)]
    pub classifier: ClassifierOptions,
}

impl RewriteOptions {
    /// Create options with no defaults, limits or overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback table
    pub fn with_from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Set the global maximum row count
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set a maximum row count for one table
    pub fn with_table_limit(mut self, table: impl Into<String>, limit: u64) -> Self {
        self.limits
            .get_or_insert_with(HashMap::new)
            .insert(table.into(), limit);
        self
    }

    /// Set the SQL dialect
    pub fn with_dialect(mut self, dialect: DialectConfig) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enable or disable full numeric literal classification
    pub fn with_full_numeric_literals(mut self, enabled: bool) -> Self {
        self.classifier.full_numeric_literals = enabled;
        self
    }

    /// Effective row limit for a query whose first FROM table is `table`
    ///
    /// A per-table map, when configured, is the only source consulted. Zero
    /// means "no clamping" and is reported as `None`.
    pub fn max_rows_for(&self, table: &str) -> Option<u64> {
        let limit = match &self.limits {
            Some(limits) => limits.get(table).copied(),
            None => self.limit,
        };

        limit.filter(|&n| n > 0)
    }

    /// Load options from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load options from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
