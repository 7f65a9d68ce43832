//! Configuration management
//!
//! Handles loading the config file, compiling its pages and parsing the
//! connection string.

pub mod catalog;
pub mod connections;
pub mod settings;

pub use catalog::{Catalog, Page, StatementKind, Transition};
pub use connections::{ConnectionConfig, SslMode};
pub use settings::{EditFormat, ErrorPolicy, Settings, load_settings};
