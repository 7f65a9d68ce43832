//! Database provider trait
//!
//! Defines the interface the page pipeline needs from a backend.
//! This abstraction allows for:
//! - Easy testing with mock implementations
//! - Driver-specific placeholder syntax
//!
//! Arguments are passed as strings; each backend converts them to its own
//! parameter types.

use crate::db::bind::PlaceholderStyle;
use crate::db::types::RawResult;
use crate::error::DbResult;

/// Main database trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the application.
#[allow(async_fn_in_trait)]
pub trait Database {
    /// Run a row-returning statement
    ///
    /// # Arguments
    /// * `sql` - Statement text in the backend's placeholder syntax
    /// * `args` - One string per placeholder, in emission order
    ///
    /// # Errors
    /// Returns `DbError::QueryFailed` if preparation or execution fails,
    /// `DbError::TypeConversion` if an argument does not fit its parameter
    async fn query(&self, sql: &str, args: &[String]) -> DbResult<RawResult>;

    /// Run a statement that returns no rows (insert/update/delete)
    ///
    /// Returns the number of affected rows.
    async fn execute(&self, sql: &str, args: &[String]) -> DbResult<u64>;

    /// Placeholder syntax this backend expects
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Numbered
    }
}
