//! Ini-style records
//!
//! The first column becomes the section name, the remaining columns
//! `key = value` lines. Records are separated by a blank line.

use super::{TableCodec, numbered, split_pair};
use crate::error::{CodecError, CodecResult};

/// Section codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Ini;

impl TableCodec for Ini {
    fn encode(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let mut out = String::new();
        if columns.is_empty() {
            return out;
        }
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let value = |j: usize| row.get(j).map_or("", String::as_str);
            out.push_str(&format!("[{}]\n", value(0)));
            for (j, column) in columns.iter().enumerate().skip(1) {
                out.push_str(&format!("{} = {}\n", column, value(j)));
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

            let Some(record) = current.as_mut() else {
                let name = line
                    .strip_prefix('[')
                    .and_then(|l| l.strip_suffix(']'))
                    .ok_or(CodecError::SectionHeader { line: n })?;
                let mut record = vec![String::new(); columns.len()];
                record[0] = name.to_string();
                current = Some(record);
                continue;
            };

            let (key, value) = split_pair(line, '=').ok_or(CodecError::Syntax { line: n })?;
            let index = columns
                .iter()
                .skip(1)
                .position(|c| c == key)
                .ok_or_else(|| CodecError::UnknownKey {
                    line: n,
                    key: key.to_string(),
                })?;
            record[index + 1] = value.to_string();
        }
        rows.extend(current);
        Ok(rows)
    }
}
