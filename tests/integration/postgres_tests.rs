//! Integration tests for PostgresProvider
//!
//! These tests require a running PostgreSQL server (see `tests/integration.rs`).
//! They only use literal selects and temporary tables, so any empty
//! database works.

use crate::common::{connect, test_connection_config};
use sqlview::config::ConnectionConfig;
use sqlview::db::bind::translate;
use sqlview::db::materialize::execute;
use sqlview::db::postgres::PostgresProvider;
use sqlview::db::{Database, PlaceholderStyle, SqlValue};
use sqlview::error::DbError;

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_execute_simple_query() {
    let Some(provider) = connect().await else {
        return;
    };

    let raw = provider
        .query("SELECT 1::int4 AS num, 'hello'::text AS msg", &[])
        .await
        .expect("query should succeed");
    assert_eq!(raw.columns, vec!["num", "msg"]);
    assert_eq!(raw.rows.len(), 1);
    assert_eq!(raw.rows[0][0], SqlValue::Integer(1));
    assert_eq!(raw.rows[0][1], SqlValue::Text("hello".to_string()));
}

#[tokio::test]
async fn test_string_arguments_are_coerced() {
    let Some(provider) = connect().await else {
        return;
    };

    let raw = provider
        .query("SELECT $1::int4 + 1 AS n, $2::bool AS b", &args(&["41", "yes"]))
        .await
        .expect("query should succeed");
    assert_eq!(raw.rows[0][0], SqlValue::Integer(42));
    assert_eq!(raw.rows[0][1], SqlValue::Boolean(true));
}

#[tokio::test]
async fn test_empty_string_binds_null_for_non_text() {
    let Some(provider) = connect().await else {
        return;
    };

    let raw = provider
        .query("SELECT $1::int4 IS NULL AS a, $2::text IS NULL AS b", &args(&["", ""]))
        .await
        .expect("query should succeed");
    assert_eq!(raw.rows[0][0], SqlValue::Boolean(true));
    // text keeps the empty string
    assert_eq!(raw.rows[0][1], SqlValue::Boolean(false));
}

#[tokio::test]
async fn test_bad_argument_is_conversion_error() {
    let Some(provider) = connect().await else {
        return;
    };

    let err = provider
        .query("SELECT $1::int4 AS n", &args(&["forty-two"]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, DbError::TypeConversion { index: 1, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_argument_count_mismatch() {
    let Some(provider) = connect().await else {
        return;
    };

    let err = provider.query("SELECT $1::text", &[]).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::ParameterCount {
            expected: 1,
            found: 0
        }
    ));
}

#[tokio::test]
async fn test_null_values() {
    let Some(provider) = connect().await else {
        return;
    };

    let raw = provider
        .query("SELECT NULL::int4 AS a, NULL::text AS b", &[])
        .await
        .unwrap();
    assert!(raw.rows[0][0].is_null());
    assert!(raw.rows[0][1].is_null());
}

#[tokio::test]
async fn test_temporal_display() {
    let Some(provider) = connect().await else {
        return;
    };

    let stmt = translate(
        "SELECT DATE '2024-03-01' AS d, TIME '12:30:05' AS t, \
         TIMESTAMP '2024-03-01 12:30:05' AS ts, TIMESTAMP '2024-03-01 00:00:00' AS midnight",
        &[],
        PlaceholderStyle::Numbered,
    )
    .unwrap();
    let result = execute(&provider, &stmt).await.unwrap();
    assert_eq!(
        result.rows[0],
        vec!["2024-03-01", "12:30:05", "2024-03-01 12:30:05", "2024-03-01"]
    );
}

#[tokio::test]
async fn test_numeric_json_uuid_as_text() {
    let Some(provider) = connect().await else {
        return;
    };

    let raw = provider
        .query(
            "SELECT 12.50::numeric AS amount, '{\"role\":\"admin\"}'::jsonb AS meta, \
             'a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11'::uuid AS id",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(raw.rows[0][0], SqlValue::Text("12.50".to_string()));
    assert_eq!(raw.rows[0][1], SqlValue::Text("{\"role\":\"admin\"}".to_string()));
    assert_eq!(
        raw.rows[0][2],
        SqlValue::Text("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11".to_string())
    );
}

#[tokio::test]
async fn test_text_array_rows_are_expanded() {
    let Some(provider) = connect().await else {
        return;
    };

    let stmt = translate(
        "SELECT 'x'::text AS id, ARRAY['a', NULL, 'c']::text[] AS tags, ARRAY['p']::varchar[] AS one",
        &[],
        PlaceholderStyle::Numbered,
    )
    .unwrap();
    let result = execute(&provider, &stmt).await.unwrap();
    assert_eq!(result.source_count(), 1);
    assert_eq!(
        result.rows,
        vec![
            vec!["x".to_string(), "a".to_string(), "p".to_string()],
            vec!["x".to_string(), String::new(), String::new()],
            vec!["x".to_string(), "c".to_string(), String::new()],
        ]
    );
    assert_eq!(
        result.values[0][1],
        SqlValue::TextArray(args(&["a", "", "c"]))
    );
}

#[tokio::test]
async fn test_array_argument_round_trip() {
    let Some(provider) = connect().await else {
        return;
    };

    let raw = provider
        .query(
            "SELECT array_length($1::text[], 1) AS n, $1::text[] AS items",
            &args(&[r#"{"a b","c\"d"}"#]),
        )
        .await
        .unwrap();
    assert_eq!(raw.rows[0][0], SqlValue::Integer(2));
    assert_eq!(raw.rows[0][1], SqlValue::TextArray(args(&["a b", "c\"d"])));
}

#[tokio::test]
async fn test_invalid_query() {
    let Some(provider) = connect().await else {
        return;
    };

    let stmt = translate(
        "SELECT * FROM sqlview_nonexistent_table WHERE id = $1",
        &args(&["7"]),
        PlaceholderStyle::Numbered,
    )
    .unwrap();
    let err = execute(&provider, &stmt).await.unwrap_err();
    assert!(err.query.contains("sqlview_nonexistent_table"));
    assert_eq!(err.args, args(&["7"]));
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test]
async fn test_execute_reports_affected_rows() {
    let Some(provider) = connect().await else {
        return;
    };

    provider
        .execute("CREATE TEMP TABLE affected (id int4)", &[])
        .await
        .unwrap();
    let inserted = provider
        .execute(
            "INSERT INTO affected SELECT generate_series(1, $1::int4)",
            &args(&["3"]),
        )
        .await
        .unwrap();
    assert_eq!(inserted, 3);
}

#[tokio::test]
async fn test_connection_failure() {
    let config = ConnectionConfig::parse(
        "host=invalid-host-that-does-not-exist.local port=59999 user=x dbname=y sslmode=disable",
    )
    .unwrap();

    let result = PostgresProvider::connect(&config).await;
    assert!(result.is_err(), "Should fail to connect to invalid host");
}

#[test]
fn test_display_name_has_no_password() {
    let config = test_connection_config();
    let password =
        std::env::var("TEST_DB_PASSWORD").unwrap_or_else(|_| "test_password".to_string());
    assert!(!config.display_name.contains(&password));
}
