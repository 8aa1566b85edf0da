//! End-to-end tests for placeholder rewriting

use pretty_assertions::assert_eq;
use sqlstitch_core::{DialectConfig, PlaceholderKind, RewriteOptions};
use sqlstitch_resolver::{FnResolver, MemoryResolver, ResolveError, ResolveRequest};
use sqlstitch_sql::{rewrite, RewriteError, Rewriter};
use std::time::{Duration, Instant};

// =============================================================================
// Helper Functions
// =============================================================================

/// Resolver that maps every placeholder to itself
fn identity() -> FnResolver<impl Fn(ResolveRequest) -> std::future::Ready<Result<Vec<String>, ResolveError>> + Send + Sync> {
    FnResolver::new(|request: ResolveRequest| std::future::ready(Ok(vec![request.name])))
}

async fn rewrite_with(sql: &str, resolver: &MemoryResolver) -> String {
    rewrite(sql, resolver, &RewriteOptions::default()).await.unwrap()
}

// =============================================================================
// Pass-through
// =============================================================================

#[tokio::test]
async fn identity_resolution_keeps_query() {
    let sql = rewrite(
        "SELECT a, b FROM t WHERE a > 1 ORDER BY b",
        &identity(),
        &RewriteOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(sql, "SELECT a, b FROM t WHERE (a > 1) AND true ORDER BY b");
}

#[tokio::test]
async fn comments_and_semicolon_are_stripped() {
    let sql = rewrite(
        "SELECT a -- first column\nFROM t /* the table */;",
        &identity(),
        &RewriteOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(sql, "SELECT a FROM t WHERE true AND true");
}

#[tokio::test]
async fn qualified_columns_lose_their_qualifier() {
    let sql = rewrite("SELECT t.a FROM t", &identity(), &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE true AND true");
}

#[tokio::test]
async fn qualified_columns_resolve_against_renamed_tables() {
    let resolver = MemoryResolver::builder()
        .with_table("t1", ["users"])
        .with_column("a", ["age"])
        .build();

    let sql = rewrite_with("SELECT t1.a FROM t1 WHERE t1.a > 1 ORDER BY t1.a", &resolver).await;
    assert_eq!(sql, "SELECT age FROM users WHERE (age > 1) AND true ORDER BY age");
}

#[tokio::test]
async fn backslash_escaped_string_survives_comment_stripping() {
    let options = RewriteOptions::default().with_dialect(DialectConfig::BigQuery);
    let sql = rewrite(
        r"SELECT a FROM t WHERE a = 'it\'s -- x' -- trailing",
        &identity(),
        &options,
    )
    .await
    .unwrap();

    assert!(sql.starts_with("SELECT a FROM t WHERE (a = "), "{sql}");
    assert!(sql.contains("-- x"), "{sql}");
}

// =============================================================================
// Aggregation hints
// =============================================================================

#[tokio::test]
async fn sum_hint_folds_values() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("price", ["1", "2", "3"])
        .build();

    let sql = rewrite_with("SELECT \"sum:price\" AS total FROM t", &resolver).await;
    assert_eq!(sql, "SELECT ((1 + 2) + 3) AS total FROM t WHERE true AND true");
}

#[tokio::test]
async fn sum_of_nothing_is_zero() {
    let resolver = MemoryResolver::builder().with_table("t", ["t"]).build();

    let sql = rewrite_with("SELECT \"sum:price\" AS total FROM t", &resolver).await;
    assert_eq!(sql, "SELECT 0 AS total FROM t WHERE true AND true");
}

#[tokio::test]
async fn avg_hint_divides_by_count() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("score", ["2", "4"])
        .build();

    let sql = rewrite_with("SELECT \"avg:score\" AS mean FROM t", &resolver).await;
    assert_eq!(sql, "SELECT ((2 + 4) / 2) AS mean FROM t WHERE true AND true");
}

// =============================================================================
// Fan-out
// =============================================================================

#[tokio::test]
async fn select_fan_out_with_alias() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("m", ["a", "b"])
        .build();

    let sql = rewrite_with("SELECT m AS total FROM t", &resolver).await;
    assert_eq!(
        sql,
        "SELECT a AS \"total: a\", b AS \"total: b\" FROM t WHERE true AND true"
    );
}

#[tokio::test]
async fn all_clauses_together() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["sales"])
        .with_column("g", ["region", "country"])
        .with_column("v", ["q1", "q2"])
        .build();

    let sql = rewrite_with(
        "SELECT g, \"sum:v\" AS s FROM t GROUP BY g HAVING \"sum:v\" > 10 ORDER BY g DESC",
        &resolver,
    )
    .await;

    assert_eq!(
        sql,
        "SELECT region, country, (q1 + q2) AS s FROM sales WHERE true AND true \
         GROUP BY region, country HAVING (q1 + q2) > 10 ORDER BY region DESC, country DESC"
    );
}

#[tokio::test]
async fn placeholders_inside_functions() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("x", ["id"])
        .build();

    let sql = rewrite_with("SELECT COUNT(x) AS n FROM t", &resolver).await;
    assert_eq!(sql, "SELECT COUNT(id) AS n FROM t WHERE true AND true");
}

// =============================================================================
// FROM resolution and WHERE splicing
// =============================================================================

#[tokio::test]
async fn table_predicate_is_anded_with_where() {
    let resolver = MemoryResolver::builder()
        .with_table("t1", ["users", "age > 18"])
        .with_column("x", ["x"])
        .build();

    let sql = rewrite_with("SELECT x FROM t1 WHERE x > 0", &resolver).await;
    assert_eq!(sql, "SELECT x FROM users WHERE (x > 0) AND (age > 18)");
}

#[tokio::test]
async fn predicates_from_several_tables_are_ored() {
    let resolver = MemoryResolver::builder()
        .with_table("t1", ["users", "age > 18"])
        .with_table("t2", ["users", "active = true"])
        .with_column("x", ["x"])
        .build();

    let sql = rewrite_with("SELECT x FROM t1, t2", &resolver).await;
    assert_eq!(
        sql,
        "SELECT x FROM users WHERE true AND ((age > 18) OR (active = true))"
    );
}

#[tokio::test]
async fn predicate_operator_escape() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["logs", "level @@ 'debug'"])
        .with_column("x", ["x"])
        .build();

    let sql = rewrite_with("SELECT x FROM t", &resolver).await;
    assert_eq!(sql, "SELECT x FROM logs WHERE true AND (level <> 'debug')");
}

#[tokio::test]
async fn quoted_table_names() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["\"Order Items\""])
        .with_column("x", ["x"])
        .build();

    let sql = rewrite_with("SELECT x FROM t", &resolver).await;
    assert_eq!(sql, "SELECT x FROM \"Order Items\" WHERE true AND true");
}

#[tokio::test]
async fn default_and_null_tables() {
    let resolver = MemoryResolver::builder().with_column("x", ["x"]).build();

    let sql = rewrite("SELECT x FROM t", &resolver, &RewriteOptions::new().with_from("events"))
        .await
        .unwrap();
    assert_eq!(sql, "SELECT x FROM events WHERE true AND true");

    let sql = rewrite_with("SELECT x FROM t", &resolver).await;
    assert_eq!(sql, "SELECT x FROM null WHERE true AND true");
}

#[tokio::test]
async fn joins_collapse_into_table_list() {
    let resolver = MemoryResolver::builder()
        .with_table("a", ["users"])
        .with_table("b", ["orders"])
        .with_column("x", ["x"])
        .build();

    let sql = rewrite_with("SELECT x FROM a JOIN b ON a.id = b.user_id", &resolver).await;
    assert_eq!(sql, "SELECT x FROM users, orders WHERE true AND true");
}

// =============================================================================
// Limits
// =============================================================================

#[tokio::test]
async fn global_limit_clamps() {
    let options = RewriteOptions::new().with_limit(100);

    let sql = rewrite("SELECT a FROM t LIMIT 500", &identity(), &options).await.unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE true AND true LIMIT 100");

    let options = RewriteOptions::new().with_limit(50);
    let sql = rewrite("SELECT a FROM t", &identity(), &options).await.unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE true AND true LIMIT 50");
}

#[tokio::test]
async fn per_table_limit_uses_first_table() {
    let options = RewriteOptions::new()
        .with_limit(5)
        .with_table_limit("t", 20);

    let sql = rewrite("SELECT a FROM t LIMIT 500", &identity(), &options).await.unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE true AND true LIMIT 20");

    // Tables missing from the map are not clamped, even with a global limit
    let sql = rewrite("SELECT a FROM u LIMIT 500", &identity(), &options).await.unwrap();
    assert_eq!(sql, "SELECT a FROM u WHERE true AND true LIMIT 500");
}

#[tokio::test]
async fn zero_limit_disables_clamping() {
    let options = RewriteOptions::new().with_limit(0);
    let sql = rewrite("SELECT a FROM t", &identity(), &options).await.unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE true AND true");
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn options_from_toml() {
    let options = RewriteOptions::from_toml(
        r#"
            limit = 10
            dialect = "postgres"

            [classifier]
            full_numeric_literals = true
        "#,
    )
    .unwrap();
    assert_eq!(options.dialect, DialectConfig::Postgres);

    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("n", ["42"])
        .build();

    let sql = Rewriter::new(&options)
        .rewrite("SELECT n AS answer FROM t", &resolver)
        .await
        .unwrap();
    assert_eq!(sql, "SELECT 42 AS answer FROM t WHERE true AND true LIMIT 10");
}

#[tokio::test]
async fn multi_digit_numbers_are_identifiers_by_default() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("n", ["42"])
        .build();

    let sql = rewrite_with("SELECT n AS answer FROM t", &resolver).await;
    assert_eq!(sql, "SELECT \"42\" AS answer FROM t WHERE true AND true");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn non_select_fails_before_resolving() {
    let resolver = MemoryResolver::new();

    for sql in [
        "UPDATE t SET a = 1",
        "DELETE FROM t",
        "INSERT INTO t VALUES (1)",
        "SELECT 1 UNION SELECT 2",
    ] {
        let err = rewrite(sql, &resolver, &RewriteOptions::default()).await.unwrap_err();
        assert!(
            matches!(err, RewriteError::UnsupportedStatement(_)),
            "{sql} should be unsupported"
        );
    }

    assert_eq!(resolver.request_count().await, 0);
}

#[tokio::test]
async fn malformed_query_is_parse_error() {
    let err = rewrite("SELEC a FRM t", &identity(), &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::Parse(_)));
}

#[tokio::test]
async fn malformed_resolved_values_are_parse_errors() {
    let bad_column = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("x", ["a +"])
        .build();
    let err = rewrite("SELECT x FROM t", &bad_column, &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::Parse(_)));

    let bad_predicate = MemoryResolver::builder()
        .with_table("t", ["t", "age >"])
        .with_column("x", ["x"])
        .build();
    let err = rewrite("SELECT x FROM t", &bad_predicate, &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::Parse(_)));
}

#[tokio::test]
async fn resolver_failure_aborts_rewrite() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("ok", ["a"])
        .with_error(
            PlaceholderKind::Column,
            "secret",
            ResolveError::Backend("permission denied".to_string()),
        )
        .build();

    let err = rewrite("SELECT ok FROM t WHERE secret = 1", &resolver, &RewriteOptions::default())
        .await
        .unwrap_err();

    match err {
        RewriteError::Resolver(ResolveError::Backend(message)) => {
            assert_eq!(message, "permission denied")
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Scheduling
// =============================================================================

#[tokio::test]
async fn tables_resolve_before_columns() {
    let resolver = MemoryResolver::builder()
        .with_table("t1", ["users"])
        .with_table("t2", ["orders"])
        .with_column("a", ["a"])
        .with_column("b", ["b"])
        .build();

    rewrite_with("SELECT a FROM t1, t2 WHERE b > 1 ORDER BY a", &resolver).await;

    let requests = resolver.requests().await;
    let first_column = requests
        .iter()
        .position(|r| r.kind == PlaceholderKind::Column)
        .unwrap();
    assert!(requests[..first_column].iter().all(|r| r.kind == PlaceholderKind::Table));
    assert!(requests[first_column..].iter().all(|r| r.kind == PlaceholderKind::Column));
    assert_eq!(first_column, 2);

    let context = vec!["users".to_string(), "orders".to_string()];
    assert!(requests[first_column..]
        .iter()
        .all(|r| r.from.as_deref() == Some(context.as_slice())));
}

#[tokio::test]
async fn clause_resolution_runs_concurrently() {
    let resolver = MemoryResolver::builder()
        .with_table("t", ["t"])
        .with_column("a", ["a"])
        .with_column("b", ["b"])
        .with_column("c", ["c"])
        .with_column("d", ["d"])
        .build()
        .with_latency(100);

    let start = Instant::now();
    let sql = rewrite_with(
        "SELECT a FROM t WHERE b > 1 GROUP BY c ORDER BY d",
        &resolver,
    )
    .await;
    let elapsed = start.elapsed();

    assert_eq!(sql, "SELECT a FROM t WHERE (b > 1) AND true GROUP BY c ORDER BY d");
    // One round for FROM, one for all column clauses; sequential would be five
    assert!(elapsed < Duration::from_millis(400), "took {elapsed:?}");
}
