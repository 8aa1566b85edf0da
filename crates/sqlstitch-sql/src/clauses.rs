//! Per-clause placeholder rewriting
//!
//! Each function takes ownership of one clause and returns its rewritten
//! form, so the orchestrator can run all of them concurrently against the
//! same statement.

use crate::columns::ColumnResolver;
use crate::error::RewriteError;
use crate::nodes::{column_name, quoted_ident};
use crate::walker;
use futures::future::try_join_all;
use sqlparser::ast::{Expr, GroupByExpr, Ident, OrderBy, OrderByExpr, SelectItem};

/// A select item after expansion
enum Projected {
    /// Placeholder or expression that was resolved
    Expanded { exprs: Vec<Expr>, alias: Option<Ident> },

    /// Wildcards, passed through as written
    Kept(SelectItem),
}

async fn project(columns: &ColumnResolver<'_>, item: SelectItem) -> Result<Projected, RewriteError> {
    match item {
        SelectItem::UnnamedExpr(expr) => Ok(Projected::Expanded {
            exprs: columns.expand(expr).await?,
            alias: None,
        }),
        SelectItem::ExprWithAlias { expr, alias } => Ok(Projected::Expanded {
            exprs: columns.expand(expr).await?,
            alias: Some(alias),
        }),
        other => Ok(Projected::Kept(other)),
    }
}

/// Output alias for one expanded select item
///
/// Column references keep the original alias, or get `"<alias>: <name>"`
/// when one aliased item fanned out into several. Other expressions keep
/// the original alias or are named after their own SQL text.
fn alias_for(expr: &Expr, count: usize, alias: Option<&Ident>) -> Option<Ident> {
    match (column_name(expr), alias) {
        (Some(name), Some(alias)) if count > 1 => {
            Some(quoted_ident(format!("{}: {}", alias.value, name)))
        }
        (Some(_), alias) => alias.cloned(),
        (None, Some(alias)) => Some(alias.clone()),
        (None, None) => Some(quoted_ident(expr.to_string())),
    }
}

/// Rewrite the SELECT list
///
/// One placeholder may become any number of output columns, including none.
pub async fn rewrite_projection(
    columns: &ColumnResolver<'_>,
    projection: Vec<SelectItem>,
) -> Result<Vec<SelectItem>, RewriteError> {
    let projected = try_join_all(projection.into_iter().map(|item| project(columns, item))).await?;

    let mut items = Vec::new();
    for entry in projected {
        match entry {
            Projected::Kept(item) => items.push(item),
            Projected::Expanded { exprs, alias } => {
                let count = exprs.len();
                for expr in exprs {
                    let item = match alias_for(&expr, count, alias.as_ref()) {
                        Some(alias) => SelectItem::ExprWithAlias { expr, alias },
                        None => SelectItem::UnnamedExpr(expr),
                    };
                    items.push(item);
                }
            }
        }
    }

    Ok(items)
}

/// Rewrite a WHERE or HAVING condition
pub async fn rewrite_condition(
    columns: &ColumnResolver<'_>,
    condition: Option<Expr>,
) -> Result<Option<Expr>, RewriteError> {
    match condition {
        Some(expr) => Ok(Some(walker::substitute(columns, expr).await?)),
        None => Ok(None),
    }
}

/// Rewrite GROUP BY, fanning each placeholder out in place
pub async fn rewrite_group_by(
    columns: &ColumnResolver<'_>,
    group_by: GroupByExpr,
) -> Result<GroupByExpr, RewriteError> {
    match group_by {
        GroupByExpr::Expressions(exprs, modifiers) => {
            let expanded = try_join_all(exprs.into_iter().map(|expr| columns.expand(expr))).await?;
            Ok(GroupByExpr::Expressions(expanded.into_iter().flatten().collect(), modifiers))
        }
        all => Ok(all),
    }
}

/// Rewrite ORDER BY, copying each entry's direction to its fanned-out terms
pub async fn rewrite_order_by(
    columns: &ColumnResolver<'_>,
    order_by: Option<OrderBy>,
) -> Result<Option<OrderBy>, RewriteError> {
    let Some(mut order_by) = order_by else {
        return Ok(None);
    };

    let entries = std::mem::take(&mut order_by.exprs);
    let expanded = try_join_all(entries.into_iter().map(|entry| async move {
        let exprs = columns.expand(entry.expr.clone()).await?;
        Ok::<_, RewriteError>(
            exprs
                .into_iter()
                .map(|expr| OrderByExpr { expr, ..entry.clone() })
                .collect::<Vec<_>>(),
        )
    }))
    .await?;

    order_by.exprs = expanded.into_iter().flatten().collect();
    Ok(Some(order_by))
}
