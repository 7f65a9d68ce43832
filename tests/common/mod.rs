//! Common test utilities and helpers
//!
//! Shared test infrastructure for integration tests.

use sqlview::config::ConnectionConfig;
use sqlview::db::postgres::PostgresProvider;

/// Connection string built from the `TEST_DB_*` environment variables
pub fn test_conn_string() -> String {
    let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
    format!(
        "host={} port={} dbname={} user={} password={} sslmode=disable",
        var("TEST_DB_HOST", "localhost"),
        var("TEST_DB_PORT", "5433"),
        var("TEST_DB_NAME", "test_db"),
        var("TEST_DB_USER", "test_user"),
        var("TEST_DB_PASSWORD", "test_password"),
    )
}

/// Create a test connection configuration
pub fn test_connection_config() -> ConnectionConfig {
    ConnectionConfig::parse(&test_conn_string()).expect("test connection string parses")
}

/// Connect to the test database, or `None` (after a note) when it is not running
pub async fn connect() -> Option<PostgresProvider> {
    let config = test_connection_config();
    match PostgresProvider::connect(&config).await {
        Ok((provider, _)) => Some(provider),
        Err(e) => {
            eprintln!(
                "Skipping test: Database not available at {} - {}",
                config.display_name, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_creation() {
        let config = test_connection_config();
        assert!(!config.display_name.contains("password"));
        assert_eq!(config.ssl_mode, sqlview::config::SslMode::Disable);
    }
}
