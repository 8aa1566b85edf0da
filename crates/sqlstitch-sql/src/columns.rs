//! Column placeholder resolution
//!
//! Turns a placeholder's text into zero or more expressions: the hint prefix
//! is split off, the caller's resolver is asked for raw values, each value
//! is classified, and SUM/AVG hints fold the results into one expression.

use crate::aggregate;
use crate::classify::ValueClassifier;
use crate::error::RewriteError;
use crate::nodes::column_name;
use crate::walker;
use sqlparser::ast::Expr;
use sqlstitch_core::{Hint, Placeholder};
use sqlstitch_resolver::{PlaceholderResolver, ResolveRequest};

/// Resolves column placeholders against an already-resolved FROM list
pub struct ColumnResolver<'a> {
    resolver: &'a dyn PlaceholderResolver,
    classifier: &'a ValueClassifier<'a>,
    from: &'a [String],
}

impl<'a> ColumnResolver<'a> {
    pub fn new(
        resolver: &'a dyn PlaceholderResolver,
        classifier: &'a ValueClassifier<'a>,
        from: &'a [String],
    ) -> Self {
        Self { resolver, classifier, from }
    }

    /// Resolve placeholder text such as `price` or `sum:price`
    pub async fn resolve(&self, text: &str) -> Result<Vec<Expr>, RewriteError> {
        let placeholder = Placeholder::parse(text);
        let request = ResolveRequest::column(placeholder.name, placeholder.hint, self.from);

        tracing::trace!(%request, "resolving column placeholder");
        let raw = self.resolver.resolve(request).await?;

        let exprs = raw
            .iter()
            .map(|value| self.classifier.classify(value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match placeholder.hint {
            Some(Hint::Sum) => vec![aggregate::sum(exprs)],
            Some(Hint::Avg) => vec![aggregate::avg(exprs)],
            Some(Hint::All) | None => exprs,
        })
    }

    /// Expand one clause entry
    ///
    /// A column reference, bare or qualified, is a placeholder and may fan
    /// out into any number of expressions; a qualifier is dropped with the
    /// reference. Anything else stays a single expression with the
    /// placeholders inside it substituted.
    pub async fn expand(&self, expr: Expr) -> Result<Vec<Expr>, RewriteError> {
        if let Some(name) = column_name(&expr) {
            return self.resolve(name).await;
        }
        Ok(vec![walker::substitute(self, expr).await?])
    }
}
