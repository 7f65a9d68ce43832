//! Logging setup
//!
//! The table view owns the terminal, so interactive sessions log to a file
//! only: `~/.sqlview/logs/sqlview.log.YYYY-MM-DD` with daily rotation.
//! `--dump` runs also log warnings to stderr.
//!
//! # Filtering
//!
//! `RUST_LOG` overrides the defaults:
//! - `RUST_LOG=debug` - statements and bound arguments
//! - `RUST_LOG=sqlview::session=info` - page transitions only

use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// `~/.sqlview/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sqlview").join("logs"))
}

fn ensure_logs_dir() -> std::io::Result<PathBuf> {
    let dir = logs_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory")
    })?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default file filter directive
fn file_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Initialize the tracing subscriber.
///
/// `debug` raises the file default to `debug`; `to_stderr` adds a console
/// layer (warnings by default) for non-interactive runs.
pub fn init(debug: bool, to_stderr: bool) {
    let file_layer = match ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "sqlview.log");
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(file_directive(debug)));
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(filter),
            )
        }
        Err(e) => {
            if to_stderr {
                eprintln!("Warning: Could not initialize file logging: {}", e);
            }
            None
        }
    };

    let console_layer = to_stderr.then(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter)
    });

    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();
}
