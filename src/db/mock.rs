//! In-memory database for unit tests

use crate::db::Database;
use crate::db::types::{RawResult, SqlValue};
use crate::error::{DbError, DbResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// Answers selects from canned results keyed by statement text and records
/// every statement it receives.
#[derive(Default)]
pub struct MockDatabase {
    results: HashMap<String, RawResult>,
    failing: RefCell<Vec<String>>,
    pub log: RefCell<Vec<(String, Vec<String>)>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned result for `sql`
    pub fn with_result(mut self, sql: &str, columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        self.results.insert(
            sql.to_string(),
            RawResult {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
        self
    }

    /// Make every statement containing `fragment` fail
    pub fn failing_on(self, fragment: &str) -> Self {
        self.fail_on(fragment);
        self
    }

    /// Like [`MockDatabase::failing_on`], for a database already in use
    pub fn fail_on(&self, fragment: &str) {
        self.failing.borrow_mut().push(fragment.to_string());
    }

    fn record(&self, sql: &str, args: &[String]) -> DbResult<()> {
        self.log.borrow_mut().push((sql.to_string(), args.to_vec()));
        if self.failing.borrow().iter().any(|f| sql.contains(f.as_str())) {
            return Err(DbError::QueryFailed("mock failure".to_string()));
        }
        Ok(())
    }

    /// Statements received so far
    pub fn statements(&self) -> Vec<(String, Vec<String>)> {
        self.log.borrow().clone()
    }
}

impl Database for MockDatabase {
    async fn query(&self, sql: &str, args: &[String]) -> DbResult<RawResult> {
        self.record(sql, args)?;
        Ok(self.results.get(sql).cloned().unwrap_or_default())
    }

    async fn execute(&self, sql: &str, args: &[String]) -> DbResult<u64> {
        self.record(sql, args)?;
        Ok(1)
    }
}
