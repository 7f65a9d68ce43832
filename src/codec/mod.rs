//! Plain-text table codecs
//!
//! Three symmetric writer/reader pairs turn `(columns, rows)` into text and
//! back: an org-mode style markup table, an ini-style section per record,
//! and flat `key: value` records. They are used to export a page and to
//! read back a row after it was edited by the user.
//!
//! Values are written verbatim. Text containing the format's own delimiters
//! (`|` for org, `=` in keys or a leading `[` for ini, `:` in keys for flat),
//! line breaks, or significant surrounding whitespace does not survive a
//! round trip.

mod flat;
mod ini;
mod org;

pub use flat::Flat;
pub use ini::Ini;
pub use org::Org;

use crate::error::{CodecError, CodecResult};
use serde::Deserialize;

/// A reader/writer pair for one text format
pub trait TableCodec {
    /// Render rows. Each row is expected to have one entry per column.
    fn encode(&self, columns: &[String], rows: &[Vec<String>]) -> String;

    /// Parse rows back. Every returned row has exactly one entry per column.
    fn decode(&self, text: &str, columns: &[String]) -> CodecResult<Vec<Vec<String>>>;
}

/// Selectable output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Org,
    Ini,
    Flat,
}

impl Format {
    fn codec(self) -> &'static dyn TableCodec {
        match self {
            Format::Org => &Org,
            Format::Ini => &Ini,
            Format::Flat => &Flat,
        }
    }

    pub fn encode(self, columns: &[String], rows: &[Vec<String>]) -> String {
        self.codec().encode(columns, rows)
    }

    pub fn decode(self, text: &str, columns: &[String]) -> CodecResult<Vec<Vec<String>>> {
        self.codec().decode(text, columns)
    }

    /// Decode text that must hold exactly one record
    pub fn decode_one(self, text: &str, columns: &[String]) -> CodecResult<Vec<String>> {
        let mut rows = self.decode(text, columns)?;
        if rows.len() != 1 {
            return Err(CodecError::RecordCount {
                line: text.lines().count(),
                found: rows.len(),
            });
        }
        Ok(rows.remove(0))
    }
}

/// Numbered lines, 1-based
fn numbered(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().map(|(i, line)| (i + 1, line))
}

/// Split `line` at the first `sep` into a trimmed key and value
fn split_pair(line: &str, sep: char) -> Option<(&str, &str)> {
    line.split_once(sep).map(|(k, v)| (k.trim(), v.trim()))
}
