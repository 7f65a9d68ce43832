//! Database abstraction layer
//!
//! This module provides a trait-based abstraction over statement execution,
//! placeholder translation and result materialization, allowing easy
//! testing with mocks.

pub mod bind;
pub mod materialize;
#[cfg(test)]
pub mod mock;
pub mod params;
pub mod postgres;
pub mod provider;
pub mod types;

// Re-export main types
pub use bind::{PlaceholderStyle, Statement};
pub use provider::Database;
pub use types::{QueryResult, RawResult, RowOrigin, SqlValue};
