//! Placeholder substitution inside arbitrary expression trees
//!
//! WHERE, HAVING and non-placeholder select items can hold placeholders at
//! any depth: inside function arguments, CASE arms, IN lists, subqueries.
//! sqlparser's derived visitor reaches every `Expr` in the tree, whatever
//! node shape contains it, so substitution is done in two passes: collect
//! the placeholder names, resolve them concurrently, then replace.

use crate::columns::ColumnResolver;
use crate::error::RewriteError;
use crate::nodes::column_name;
use futures::future::try_join_all;
use sqlparser::ast::{Expr, Visit, VisitMut, Visitor, VisitorMut};
use std::collections::HashMap;
use std::convert::Infallible;
use std::ops::ControlFlow;

/// Collects distinct placeholder names in visit order
///
/// A qualified reference `t.a` is the placeholder `a`.
#[derive(Default)]
struct PlaceholderCollector {
    names: Vec<String>,
}

impl Visitor for PlaceholderCollector {
    type Break = Infallible;

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if let Some(name) = column_name(expr) {
            if !self.names.iter().any(|n| n == name) {
                self.names.push(name.to_string());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Replaces placeholders with their resolved expression
///
/// The whole reference is replaced, qualifier included. Runs after children
/// are visited, so a substituted expression is never walked again.
struct Substitution<'a> {
    resolved: &'a HashMap<String, Expr>,
}

impl VisitorMut for Substitution<'_> {
    type Break = Infallible;

    fn post_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        let resolved = self.resolved;
        if let Some(replacement) = column_name(expr).and_then(|name| resolved.get(name)) {
            *expr = replacement.clone();
        }
        ControlFlow::Continue(())
    }
}

/// Placeholder names appearing anywhere in `expr`
pub fn placeholders(expr: &Expr) -> Vec<String> {
    let mut collector = PlaceholderCollector::default();
    let _ = Visit::visit(expr, &mut collector);
    collector.names
}

/// Substitute every placeholder in `expr`
///
/// Each distinct name is resolved once and only its first resolved value is
/// used; expressions cannot fan out here. A placeholder that resolves to
/// nothing is left as written.
pub async fn substitute(columns: &ColumnResolver<'_>, mut expr: Expr) -> Result<Expr, RewriteError> {
    let names = placeholders(&expr);
    if names.is_empty() {
        return Ok(expr);
    }

    let resolved = try_join_all(names.into_iter().map(|name| async move {
        let first = columns.resolve(&name).await?.into_iter().next();
        Ok::<_, RewriteError>(first.map(|expr| (name, expr)))
    }))
    .await?;

    let resolved: HashMap<String, Expr> = resolved.into_iter().flatten().collect();
    let _ = VisitMut::visit(&mut expr, &mut Substitution { resolved: &resolved });

    Ok(expr)
}
