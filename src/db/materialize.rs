//! Result materialization
//!
//! Turns raw driver rows into a [`QueryResult`]: every cell gets a display
//! string, and text-array cells are spread over stacked display rows so the
//! table never shows nested values.

use crate::db::Database;
use crate::db::bind::Statement;
use crate::db::types::{QueryResult, RawResult, RowOrigin, SqlValue};
use crate::error::QueryError;
use std::time::{Duration, Instant};

/// Run `statement` and materialize its rows.
///
/// The error carries the statement text and arguments for diagnosis.
pub async fn execute<D: Database>(db: &D, statement: &Statement) -> Result<QueryResult, QueryError> {
    let start = Instant::now();
    tracing::debug!(sql = %statement.sql, args = ?statement.args, "select");
    let raw = db
        .query(&statement.sql, &statement.args)
        .await
        .map_err(|e| QueryError::new(statement.sql.as_str(), &statement.args, e))?;
    let result = materialize(raw, start.elapsed());
    tracing::debug!(
        rows = result.source_count(),
        display_rows = result.rows.len(),
        "select finished"
    );
    Ok(result)
}

/// Build display rows from raw rows.
///
/// A row whose array cells hold N > 1 elements becomes N display rows. The
/// extra rows repeat the scalar cells and show the next array element (or an
/// empty cell once an array runs out).
pub fn materialize(raw: RawResult, execution_time: Duration) -> QueryResult {
    let width = raw.columns.len();
    let mut rows = Vec::with_capacity(raw.rows.len());
    let mut origins = Vec::with_capacity(raw.rows.len());
    let mut values = Vec::with_capacity(raw.rows.len());

    for (source, mut cells) in raw.rows.into_iter().enumerate() {
        cells.resize(width, SqlValue::Null);

        let scalars: Vec<String> = cells
            .iter()
            .map(|cell| match cell {
                SqlValue::TextArray(items) => items.first().cloned().unwrap_or_default(),
                other => other.display_string(),
            })
            .collect();
        let depth = cells
            .iter()
            .filter_map(SqlValue::as_array)
            .map(<[String]>::len)
            .max()
            .unwrap_or(0);

        rows.push(scalars.clone());
        origins.push(RowOrigin { source, offset: 0 });

        for offset in 1..depth {
            let row = cells
                .iter()
                .zip(&scalars)
                .map(|(cell, scalar)| match cell {
                    SqlValue::TextArray(items) => items.get(offset).cloned().unwrap_or_default(),
                    _ => scalar.clone(),
                })
                .collect();
            rows.push(row);
            origins.push(RowOrigin { source, offset });
        }

        values.push(cells);
    }

    QueryResult {
        columns: raw.columns,
        values,
        rows,
        origins,
        execution_time,
    }
}
