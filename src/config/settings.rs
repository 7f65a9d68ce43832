//! User settings and page definitions
//!
//! Loaded from `~/.sqlview.yaml` (or `--config`). A missing file yields
//! empty settings; anything unparsable is fatal.

use crate::codec::Format;
use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Application settings as written in the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Settings {
    /// First editor candidate
    pub editor: Option<String>,

    /// Page shown when the command line names none
    pub default: Option<String>,

    /// Format for `--dump` and page copy
    pub format: Option<Format>,

    /// Format of the row editor document
    pub edit_format: Option<EditFormat>,

    /// What a failed page transition does
    pub on_error: ErrorPolicy,

    /// Connection string
    pub connect: Option<String>,

    /// Page definitions by name
    pub pages: BTreeMap<String, PageDef>,
}

/// One page as written in the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PageDef {
    pub select: Option<String>,
    pub insert: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,

    /// Key specifier -> destination invocation
    pub keys: BTreeMap<String, String>,

    /// Key specifier -> first-column value -> destination invocation
    pub switch_keys: BTreeMap<String, BTreeMap<String, String>>,
}

/// Failed page-transition policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Report the error and end the session
    #[default]
    Quit,
    /// Stay on the previous page and show the error
    Keep,
}

/// Document format handed to the external editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditFormat {
    #[default]
    Yaml,
    Org,
    Ini,
    Flat,
}

impl EditFormat {
    /// The table codec behind this format, if any
    pub fn table_format(self) -> Option<Format> {
        match self {
            EditFormat::Yaml => None,
            EditFormat::Org => Some(Format::Org),
            EditFormat::Ini => Some(Format::Ini),
            EditFormat::Flat => Some(Format::Flat),
        }
    }

    /// Temp file suffix, so editors pick a sensible mode
    pub fn suffix(self) -> &'static str {
        match self {
            EditFormat::Yaml => ".yaml",
            EditFormat::Org => ".org",
            EditFormat::Ini => ".ini",
            EditFormat::Flat => ".txt",
        }
    }
}

impl Settings {
    /// Default config file path (`~/.sqlview.yaml`)
    pub fn default_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".sqlview.yaml"))
    }

    /// Parse settings from YAML text
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Load settings from a config file; a missing file gives empty settings
pub fn load_settings(path: &Path) -> ConfigResult<Settings> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using empty settings");
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            });
        }
    };
    tracing::debug!(path = %path.display(), "reading config file");
    Settings::from_yaml(&content)
}
