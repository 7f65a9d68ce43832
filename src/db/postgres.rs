//! PostgreSQL database provider
//!
//! Concrete implementation using tokio-postgres.

use crate::config::connections::{ConnectionConfig, SslMode};
use crate::db::Database;
use crate::db::params::{BoxedParam, coerce_all};
use crate::db::types::{RawResult, SqlValue, zero_date};
use crate::error::{DbError, DbResult};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{Client, Row, Statement};

/// PostgreSQL database provider
pub struct PostgresProvider {
    /// The tokio-postgres client
    client: Client,
}

impl PostgresProvider {
    /// Connect to a PostgreSQL database.
    ///
    /// Returns the provider and a receiver that fires if the background
    /// connection is lost (e.g. server restart, idle timeout).
    pub async fn connect(
        config: &ConnectionConfig,
    ) -> DbResult<(Self, mpsc::UnboundedReceiver<String>)> {
        let (conn_err_tx, conn_err_rx) = mpsc::unbounded_channel();

        let client = match config.ssl_mode {
            SslMode::Disable => {
                let (client, connection) =
                    tokio_postgres::connect(&config.conn_string, tokio_postgres::NoTls)
                        .await
                        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        let _ = conn_err_tx.send(format!("Connection lost: {}", e));
                    }
                });
                client
            }
            SslMode::Prefer | SslMode::Require => {
                let tls_config = make_tls_config();
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
                let (client, connection) = tokio_postgres::connect(&config.conn_string, tls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        let _ = conn_err_tx.send(format!("Connection lost: {}", e));
                    }
                });
                client
            }
        };

        tracing::info!(conn = %config.display_name, "connected");
        Ok((Self { client }, conn_err_rx))
    }

    /// Prepare `sql` and convert `args` to the parameter types the server inferred
    async fn prepare(&self, sql: &str, args: &[String]) -> DbResult<(Statement, Vec<BoxedParam>)> {
        let stmt = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| DbError::QueryFailed(describe(&e)))?;
        let params = coerce_all(args, stmt.params())?;
        Ok((stmt, params))
    }
}

fn param_refs(params: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Server-side message when available, driver message otherwise
fn describe(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{}: {} ({})", db.severity(), db.message(), detail),
            None => format!("{}: {}", db.severity(), db.message()),
        },
        None => e.to_string(),
    }
}

impl Database for PostgresProvider {
    async fn query(&self, sql: &str, args: &[String]) -> DbResult<RawResult> {
        let (stmt, params) = self.prepare(sql, args).await?;

        let columns: Vec<String> = stmt
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();
        let types: Vec<Type> = stmt.columns().iter().map(|c| c.type_().clone()).collect();

        let pg_rows = self
            .client
            .query(&stmt, &param_refs(&params))
            .await
            .map_err(|e| DbError::QueryFailed(describe(&e)))?;

        let rows = pg_rows
            .iter()
            .map(|pg_row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(i, ty)| extract_value(pg_row, i, ty))
                    .collect()
            })
            .collect();

        Ok(RawResult { columns, rows })
    }

    async fn execute(&self, sql: &str, args: &[String]) -> DbResult<u64> {
        let (stmt, params) = self.prepare(sql, args).await?;
        self.client
            .execute(&stmt, &param_refs(&params))
            .await
            .map_err(|e| DbError::QueryFailed(describe(&e)))
    }
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        tracing::debug!("no native root certificates, using webpki roots");
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Whether a column type is captured as a whole array
pub fn is_text_array(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY
    )
}

/// Read column `idx` as `T`, mapping NULL to `SqlValue::Null` and
/// falling back to text when the type doesn't match.
fn typed<'a, T: FromSql<'a>>(
    row: &'a Row,
    idx: usize,
    convert: impl FnOnce(T) -> SqlValue,
) -> SqlValue {
    match row.try_get::<_, Option<T>>(idx) {
        Ok(Some(v)) => convert(v),
        Ok(None) => SqlValue::Null,
        Err(_) => try_as_string(row, idx),
    }
}

/// Extract a cell value from a tokio_postgres Row based on the column's type.
fn extract_value(row: &Row, idx: usize, ty: &Type) -> SqlValue {
    if is_text_array(ty) {
        return match row.try_get::<_, Option<Vec<Option<String>>>>(idx) {
            Ok(items) => SqlValue::TextArray(
                items
                    .unwrap_or_default()
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            ),
            Err(_) => try_as_string(row, idx),
        };
    }

    match *ty {
        Type::INT2 => typed(row, idx, |v: i16| SqlValue::Integer(v.into())),
        Type::INT4 => typed(row, idx, |v: i32| SqlValue::Integer(v.into())),
        Type::INT8 => typed(row, idx, SqlValue::Integer),
        Type::OID => typed(row, idx, |v: u32| SqlValue::Integer(v.into())),
        Type::FLOAT4 => typed(row, idx, |v: f32| SqlValue::Float(v.into())),
        Type::FLOAT8 => typed(row, idx, SqlValue::Float),
        Type::BOOL => typed(row, idx, SqlValue::Boolean),
        Type::NUMERIC => typed(row, idx, |v: Decimal| SqlValue::Text(v.to_string())),
        Type::UUID => typed(row, idx, |v: uuid::Uuid| SqlValue::Text(v.to_string())),
        Type::JSON | Type::JSONB => {
            typed(row, idx, |v: serde_json::Value| SqlValue::Text(v.to_string()))
        }
        Type::BYTEA => typed(row, idx, SqlValue::Bytes),
        Type::TIMESTAMP => typed(row, idx, SqlValue::Timestamp),
        Type::TIMESTAMPTZ => typed(row, idx, |v: chrono::DateTime<chrono::Utc>| {
            SqlValue::Timestamp(v.naive_utc())
        }),
        Type::DATE => typed(row, idx, |v: chrono::NaiveDate| {
            SqlValue::Timestamp(v.and_time(chrono::NaiveTime::MIN))
        }),
        Type::TIME => typed(row, idx, |v: chrono::NaiveTime| {
            SqlValue::Timestamp(zero_date().and_time(v))
        }),
        // Text types and fallback for unknown types
        _ => try_as_string(row, idx),
    }
}

/// Try to extract a value as a string (fallback for type mismatches).
///
/// When even the string fallback fails, includes the postgres type name
/// in the message so the user knows what type couldn't be displayed.
fn try_as_string(row: &Row, idx: usize) -> SqlValue {
    match row.try_get::<_, Option<String>>(idx) {
        Ok(Some(v)) => SqlValue::Text(v),
        Ok(None) => SqlValue::Null,
        Err(_) => {
            let type_name = row
                .columns()
                .get(idx)
                .map_or("unknown", |c| c.type_().name());
            SqlValue::Text(format!("<unable to display: {}>", type_name))
        }
    }
}
