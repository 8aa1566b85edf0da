//! Row limit clamping

use crate::nodes::number;
use sqlparser::ast::{Expr, Query, Value};

/// Cap the query's LIMIT at `max`
///
/// A numeric LIMIT is lowered to `max` if larger; a missing or non-numeric
/// LIMIT becomes exactly `max`. OFFSET is left alone.
pub fn clamp_limit(query: &mut Query, max: u64) {
    let current = match &query.limit {
        Some(Expr::Value(Value::Number(n, _))) => n.parse::<u64>().ok(),
        _ => None,
    };

    let value = current.map_or(max, |n| n.min(max));
    tracing::debug!(?current, value, "clamped row limit");
    query.limit = Some(number(value));
}
