//! Flat `key: value` records, one line per column, blank line between records.

use super::{TableCodec, numbered, split_pair};
use crate::error::{CodecError, CodecResult};

/// Flat key-value codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Flat;

impl TableCodec for Flat {
    fn encode(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let mut out = String::new();
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for (j, column) in columns.iter().enumerate() {
                let value = row.get(j).map_or("", String::as_str);
                out.push_str(&format!("{}: {}\n", column, value));
            }
        }
        out
    }

    fn decode(&self, text: &str, columns: &[String]) -> CodecResult<Vec<Vec<String>>> {
        if columns.is_empty() {
            return Err(CodecError::NoColumns);
        }

        let mut rows = Vec::new();
        let mut current: Option<Vec<String>> = None;

        for (n, line) in numbered(text) {
            let line = line.trim();
            if line.is_empty() {
                rows.extend(current.take());
                continue;
            }

            let (key, value) = split_pair(line, ':').ok_or(CodecError::Syntax { line: n })?;
            let index = columns
                .iter()
                .position(|c| c == key)
                .ok_or_else(|| CodecError::UnknownKey {
                    line: n,
                    key: key.to_string(),
                })?;
            current.get_or_insert_with(|| vec![String::new(); columns.len()])[index] =
                value.to_string();
        }
        rows.extend(current);
        Ok(rows)
    }
}
