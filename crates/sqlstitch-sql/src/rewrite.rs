//! Rewrite entry point
//!
//! Runs the pipeline over one SELECT:
//!
//! 1. sanitize and parse, rejecting anything but a single SELECT
//! 2. resolve every FROM table placeholder
//! 3. rewrite the SELECT list, WHERE, HAVING, GROUP BY and ORDER BY
//!    concurrently against the resolved tables
//! 4. splice the new FROM list and extra predicates into the statement
//! 5. clamp LIMIT and serialize

use crate::classify::ValueClassifier;
use crate::clauses;
use crate::columns::ColumnResolver;
use crate::error::RewriteError;
use crate::from::{build_from, resolve_from, splice_where};
use crate::limit::clamp_limit;
use crate::nodes::name_ident;
use crate::parser::SqlParser;
use sqlparser::ast::{GroupByExpr, Ident, Query, SetExpr};
use sqlstitch_core::RewriteOptions;
use sqlstitch_resolver::PlaceholderResolver;

/// Pseudo-table used when FROM resolves to nothing and no default is set
const NULL_TABLE: &str = "null";

/// Rewrite a SELECT with placeholders into concrete SQL
///
/// # Example
///
/// ```rust,ignore
/// let resolver = MemoryResolver::builder()
///     .with_table("t1", ["users", "age > 18"])
///     .with_column("who", ["first_name", "last_name"])
///     .build();
///
/// let sql = rewrite("SELECT who FROM t1", &resolver, &RewriteOptions::default()).await?;
/// assert_eq!(sql, "SELECT first_name, last_name FROM users WHERE true AND (age > 18)");
/// ```
pub async fn rewrite(
    sql: &str,
    resolver: &dyn PlaceholderResolver,
    options: &RewriteOptions,
) -> Result<String, RewriteError> {
    Rewriter::new(options).rewrite(sql, resolver).await
}

/// Reusable rewriter bound to one set of options
pub struct Rewriter<'a> {
    options: &'a RewriteOptions,
    parser: SqlParser,
}

impl<'a> Rewriter<'a> {
    pub fn new(options: &'a RewriteOptions) -> Self {
        Self {
            options,
            parser: SqlParser::from_dialect(options.dialect),
        }
    }

    /// Parse `sql` and require a single plain SELECT
    fn parse(&self, sql: &str) -> Result<Query, RewriteError> {
        let cleaned = self.parser.sanitize(sql)?;
        tracing::debug!(sql = %cleaned, "sanitized query");

        self.parser
            .parse_select(&cleaned)?
            .ok_or_else(|| RewriteError::UnsupportedStatement(sql.to_string()))
    }

    /// Rewrite one query
    pub async fn rewrite(
        &self,
        sql: &str,
        resolver: &dyn PlaceholderResolver,
    ) -> Result<String, RewriteError> {
        let mut query = self.parse(sql)?;
        let SetExpr::Select(select) = query.body.as_mut() else {
            return Err(RewriteError::UnsupportedStatement(sql.to_string()));
        };

        let resolved = resolve_from(resolver, &select.from).await?;

        let mut tables: Vec<Ident> = resolved.tables.clone();
        if tables.is_empty() {
            if let Some(default) = &self.options.from {
                tables.push(name_ident(default));
            }
        }
        let table_names: Vec<String> = tables.iter().map(|t| t.value.clone()).collect();

        let classifier = ValueClassifier::new(&self.parser, self.options.classifier);
        let columns = ColumnResolver::new(resolver, &classifier, &table_names);

        let projection = std::mem::take(&mut select.projection);
        let selection = select.selection.take();
        let having = select.having.take();
        let group_by = std::mem::replace(
            &mut select.group_by,
            GroupByExpr::Expressions(Vec::new(), Vec::new()),
        );
        let order_by = query.order_by.take();

        let (projection, selection, having, group_by, order_by) = tokio::try_join!(
            clauses::rewrite_projection(&columns, projection),
            clauses::rewrite_condition(&columns, selection),
            clauses::rewrite_condition(&columns, having),
            clauses::rewrite_group_by(&columns, group_by),
            clauses::rewrite_order_by(&columns, order_by),
        )?;

        let predicates = resolved.parse_predicates(&self.parser)?;

        if tables.is_empty() {
            tables.push(Ident::new(NULL_TABLE));
        }

        select.projection = projection;
        select.selection = Some(splice_where(selection, predicates));
        select.having = having;
        select.group_by = group_by;
        select.from = build_from(&self.parser, &tables)?;
        query.order_by = order_by;

        if let Some(max) = self.options.max_rows_for(&tables[0].value) {
            clamp_limit(&mut query, max);
        }

        let output = query.to_string();
        tracing::debug!(sql = %output, "rewrote query");
        Ok(output)
    }
}
