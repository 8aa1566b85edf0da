//! FROM clause resolution and WHERE splicing
//!
//! Every table placeholder in FROM is resolved first. Each value a resolver
//! returns is either a table name or an extra filter predicate. Tables are
//! deduplicated into the new FROM list; predicates are OR'd together and
//! AND'd onto the statement's WHERE once all other clauses are rewritten.

use crate::error::RewriteError;
use crate::nodes::{binary, boolean, nested, parse_identifier};
use crate::parser::{ParseError, SqlParser};
use crate::sanitize::escape_operators;
use futures::future::try_join_all;
use sqlparser::ast::{BinaryOperator, Expr, Ident, ObjectName, TableFactor, TableWithJoins};
use sqlstitch_resolver::{PlaceholderResolver, ResolveRequest};
use std::iter;

/// Outcome of resolving every table placeholder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFrom {
    /// Distinct tables in first-seen order
    pub tables: Vec<Ident>,

    /// Raw predicate text to merge into WHERE
    pub predicates: Vec<String>,
}

impl ResolvedFrom {
    /// Sort one raw resolver value into tables or predicates
    fn push(&mut self, raw: &str) {
        let value = raw.trim();
        match parse_identifier(value) {
            Some(table) => {
                if !self.tables.iter().any(|t| t.value == table.value) {
                    self.tables.push(table);
                }
            }
            None => self.predicates.push(value.to_string()),
        }
    }

    /// Table names as passed to column resolvers
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.value.clone()).collect()
    }

    /// Parse every predicate into an expression
    pub fn parse_predicates(&self, parser: &SqlParser) -> Result<Vec<Expr>, ParseError> {
        self.predicates
            .iter()
            .map(|text| parser.parse_condition(&escape_operators(text)))
            .collect()
    }
}

/// Placeholder names of every table in FROM, joined relations included
///
/// Derived tables, table functions and other non-table relations cannot be
/// resolved and are rejected.
pub fn table_placeholders(from: &[TableWithJoins]) -> Result<Vec<String>, RewriteError> {
    from.iter()
        .flat_map(|table| iter::once(&table.relation).chain(table.joins.iter().map(|j| &j.relation)))
        .map(|relation| match relation {
            TableFactor::Table { name, .. } => Ok(name
                .0
                .iter()
                .map(|part| part.value.as_str())
                .collect::<Vec<_>>()
                .join(".")),
            other => Err(RewriteError::UnsupportedStatement(format!(
                "FROM entry is not a table reference: {other}"
            ))),
        })
        .collect()
}

/// Resolve every FROM table placeholder concurrently
pub async fn resolve_from(
    resolver: &dyn PlaceholderResolver,
    from: &[TableWithJoins],
) -> Result<ResolvedFrom, RewriteError> {
    let names = table_placeholders(from)?;

    let results = try_join_all(
        names
            .into_iter()
            .map(|name| resolver.resolve(ResolveRequest::table(name))),
    )
    .await?;

    let mut resolved = ResolvedFrom::default();
    for raw in results.iter().flatten() {
        resolved.push(raw);
    }

    tracing::debug!(
        tables = ?resolved.table_names(),
        predicates = ?resolved.predicates,
        "resolved FROM placeholders"
    );
    Ok(resolved)
}

/// Build a flat, alias-free FROM list
pub fn build_from(parser: &SqlParser, tables: &[Ident]) -> Result<Vec<TableWithJoins>, ParseError> {
    if tables.is_empty() {
        return Ok(Vec::new());
    }

    let mut from = parser.parse_table_list(tables.len())?;
    for (entry, table) in from.iter_mut().zip(tables) {
        if let TableFactor::Table { name, .. } = &mut entry.relation {
            *name = ObjectName(vec![table.clone()]);
        }
    }

    Ok(from)
}

/// Merge extra predicates into WHERE
///
/// Produces `(where) AND (p1 OR p2 OR ...)`. A missing WHERE and an empty
/// predicate list are both `TRUE`, so the result is always a well-formed
/// conjunction and never weakens the original condition.
pub fn splice_where(selection: Option<Expr>, predicates: Vec<Expr>) -> Expr {
    let left = match selection {
        Some(expr @ Expr::Nested(_)) => expr,
        Some(expr) => nested(expr),
        None => boolean(true),
    };

    let count = predicates.len();
    let chain = predicates
        .into_iter()
        .rev()
        .reduce(|rest, predicate| binary(predicate, BinaryOperator::Or, rest));

    let right = match chain {
        None => boolean(true),
        Some(chain) if count > 1 => nested(chain),
        Some(single) => single,
    };

    binary(left, BinaryOperator::And, right)
}
