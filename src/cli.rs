//! Command-line argument parsing
//!
//! Values given here override the config file.

use crate::codec::Format;
use crate::config::Settings;
use crate::error::{ConfigError, ConfigResult};
use clap::Parser;
use std::path::PathBuf;

/// Browse and edit PostgreSQL rows through configured pages
#[derive(Parser, Debug)]
#[command(name = "sqlview", version, about)]
pub struct CliArgs {
    /// Page to open (defaults to the config file's `default`)
    #[arg(value_name = "PAGE")]
    pub page: Option<String>,

    /// Arguments for the page's select ($1, $2, ...)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Config file [default: ~/.sqlview.yaml]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Connection string (postgres:// URL or key=value pairs)
    #[arg(long, value_name = "URL")]
    pub connect: Option<String>,

    /// Editor used for row editing
    #[arg(long, value_name = "BIN")]
    pub editor: Option<String>,

    /// Format for --dump and page copy
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    /// Print the page to stdout and exit
    #[arg(long)]
    pub dump: bool,
}

impl CliArgs {
    /// Config file to read
    pub fn config_path(&self) -> ConfigResult<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Settings::default_path(),
        }
    }

    /// Apply command-line overrides to `settings`
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(connect) = &self.connect {
            settings.connect = Some(connect.clone());
        }
        if let Some(editor) = &self.editor {
            settings.editor = Some(editor.clone());
        }
        if let Some(format) = self.format {
            settings.format = Some(format);
        }
    }
}

/// The connection string, which must come from somewhere
pub fn connection_string(settings: &Settings) -> ConfigResult<&str> {
    settings
        .connect
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            ConfigError::Invalid("no connection string (set `connect` or pass --connect)".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_and_args() {
        let cli = CliArgs::parse_from(["sqlview", "cities", "42", "-1"]);
        assert_eq!(cli.page.as_deref(), Some("cities"));
        assert_eq!(cli.args, vec!["42", "-1"]);
        assert!(!cli.dump);
    }

    #[test]
    fn test_no_page() {
        let cli = CliArgs::parse_from(["sqlview", "--dump", "--format", "ini"]);
        assert!(cli.page.is_none());
        assert!(cli.args.is_empty());
        assert!(cli.dump);
        assert_eq!(cli.format, Some(Format::Ini));
    }

    #[test]
    fn test_overrides() {
        let cli = CliArgs::parse_from([
            "sqlview",
            "--connect",
            "postgres://a@b/c",
            "--editor",
            "nano",
            "p",
        ]);
        let mut settings = Settings::from_yaml("editor: vim\nconnect: postgres://x@y/z").unwrap();
        cli.apply(&mut settings);
        assert_eq!(settings.editor.as_deref(), Some("nano"));
        assert_eq!(connection_string(&settings).unwrap(), "postgres://a@b/c");
    }

    #[test]
    fn test_missing_connection_string() {
        assert!(connection_string(&Settings::default()).is_err());
    }

    #[test]
    fn test_explicit_config_path() {
        let cli = CliArgs::parse_from(["sqlview", "-c", "/tmp/pages.yaml"]);
        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/pages.yaml"));
    }
}
