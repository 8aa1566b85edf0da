//! SQL parsing using datafusion-sqlparser-rs
//!
//! Parses query text into AST, and the small synthetic statements the
//! rewriter uses to turn loose text (a resolved expression, a filter
//! predicate, a table list) into AST fragments.

use crate::sanitize;
use sqlparser::ast::{Expr, Query, Select, SetExpr, Statement, TableWithJoins};
use sqlparser::dialect::{BigQueryDialect, Dialect, GenericDialect, PostgreSqlDialect, SnowflakeDialect};
use sqlparser::parser::{Parser, ParserError};
use sqlstitch_core::DialectConfig;

/// SQL parser with configurable dialect
pub struct SqlParser {
    dialect: Box<dyn Dialect + Send + Sync>,
}

impl SqlParser {
    /// Create a new SQL parser with the default (generic) dialect
    pub fn new() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a SQL parser for BigQuery
    pub fn bigquery() -> Self {
        Self {
            dialect: Box::new(BigQueryDialect {}),
        }
    }

    /// Create a SQL parser for PostgreSQL
    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgreSqlDialect {}),
        }
    }

    /// Create a SQL parser for Snowflake
    pub fn snowflake() -> Self {
        Self {
            dialect: Box::new(SnowflakeDialect {}),
        }
    }

    /// Create a parser from a dialect config
    pub fn from_dialect(dialect: DialectConfig) -> Self {
        match dialect {
            DialectConfig::BigQuery => Self::bigquery(),
            DialectConfig::Snowflake => Self::snowflake(),
            DialectConfig::Postgres => Self::postgres(),
            DialectConfig::Ansi => Self::new(),
        }
    }

    /// Strip comments and one trailing semicolon using this dialect's tokenizer
    pub fn sanitize(&self, sql: &str) -> Result<String, ParseError> {
        sanitize::sanitize(&*self.dialect, sql).map_err(|error| ParseError {
            sql: sql.to_string(),
            error: ParserError::from(error),
        })
    }

    /// Parse SQL string into statements
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, ParseError> {
        Parser::parse_sql(&*self.dialect, sql).map_err(|error| ParseError {
            sql: sql.to_string(),
            error,
        })
    }

    /// Parse a single plain SELECT
    ///
    /// Returns `None` when the text parses but is not exactly one statement
    /// whose body is a SELECT (UPDATE, UNION, VALUES, several statements...).
    pub fn parse_select(&self, sql: &str) -> Result<Option<Query>, ParseError> {
        let mut statements = self.parse(sql)?.into_iter();

        match (statements.next(), statements.next()) {
            (Some(Statement::Query(query)), None) if matches!(*query.body, SetExpr::Select(_)) => {
                Ok(Some(*query))
            }
            _ => Ok(None),
        }
    }

    /// Parse a boolean or scalar expression
    ///
    /// The text is parenthesized and placed in the WHERE clause of a
    /// throwaway `SELECT * FROM T`, so the result is always an
    /// `Expr::Nested` and the whole text must be consumed.
    pub fn parse_condition(&self, text: &str) -> Result<Expr, ParseError> {
        let sql = format!("SELECT * FROM T WHERE ({text})");
        self.synthetic_select(&sql)?
            .selection
            .ok_or_else(|| ParseError::unexpected(&sql, "expected a WHERE clause"))
    }

    /// Parse `n` placeholder table references `t0, t1, ...`
    ///
    /// Callers overwrite the names afterwards, which keeps the FROM shape
    /// owned by the parser rather than built by hand.
    pub fn parse_table_list(&self, n: usize) -> Result<Vec<TableWithJoins>, ParseError> {
        let tables: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
        let sql = format!("SELECT * FROM {}", tables.join(", "));
        Ok(self.synthetic_select(&sql)?.from)
    }

    fn synthetic_select(&self, sql: &str) -> Result<Select, ParseError> {
        match self.parse_select(sql)? {
            Some(Query { body, .. }) => match *body {
                SetExpr::Select(select) => Ok(*select),
                _ => Err(ParseError::unexpected(sql, "expected a SELECT")),
            },
            None => Err(ParseError::unexpected(sql, "expected a single SELECT")),
        }
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// SQL parsing error
#[derive(Debug)]
pub struct ParseError {
    /// Text that failed to parse
    pub sql: String,

    /// Parser error from sqlparser
    pub error: ParserError,
}

impl ParseError {
    fn unexpected(sql: &str, message: &str) -> Self {
        Self {
            sql: sql.to_string(),
            error: ParserError::ParserError(message.to_string()),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SQL parse error: {} <<{}>>", self.error, self.sql)
    }
}

impl std::error::Error for ParseError {}
