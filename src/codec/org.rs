//! Org-mode style markup table
//!
//! ```text
//! |----+---------|
//! | id | country |
//! |----+---------|
//! | 1  | Spain   |
//! |----+---------|
//! ```

use super::{TableCodec, numbered};
use crate::error::{CodecError, CodecResult};

/// Markup-table codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Org;

const RULE_MARK: &str = "|---";

fn glyphs(s: &str) -> usize {
    s.chars().count()
}

fn is_rule(line: &str) -> bool {
    line.contains(RULE_MARK)
}

/// Trimmed cells of a `| a | b |` line; empty when the line has no cells
fn cells(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.trim().split('|').collect();
    if parts.len() < 3 {
        return Vec::new();
    }
    parts[1..parts.len() - 1]
        .iter()
        .map(|s| s.trim().to_string())
        .collect()
}

fn push_row<'a>(out: &mut String, widths: &[usize], values: impl Iterator<Item = &'a str>) {
    out.push('|');
    for (value, width) in values.zip(widths) {
        out.push_str(&format!(" {:<width$} |", value, width = *width));
    }
    out.push('\n');
}

impl TableCodec for Org {
    fn encode(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        if columns.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = columns.iter().map(|c| glyphs(c)).collect();
        for row in rows {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(glyphs(value));
            }
        }

        let rule = format!(
            "|{}|\n",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );

        let mut out = String::new();
        out.push_str(&rule);
        push_row(&mut out, &widths, columns.iter().map(String::as_str));
        out.push_str(&rule);
        for row in rows {
            let values = (0..columns.len()).map(|i| row.get(i).map_or("", String::as_str));
            push_row(&mut out, &widths, values);
        }
        out.push_str(&rule);
        out
    }

    fn decode(&self, text: &str, columns: &[String]) -> CodecResult<Vec<Vec<String>>> {
        let mut lines = numbered(text);

        let mut read = 0;
        for (n, line) in lines.by_ref() {
            read = n;
            if is_rule(line) {
                break;
            }
        }
        let (header_line, header) = lines
            .next()
            .ok_or(CodecError::NoTable { line: read })?;
        if cells(header).len() != columns.len() {
            return Err(CodecError::BadHeader { line: header_line });
        }

        match lines.next() {
            Some((_, line)) if is_rule(line) => {}
            Some((n, _)) => return Err(CodecError::MissingRule { line: n }),
            None => return Err(CodecError::MissingRule { line: header_line }),
        }

        let mut rows = Vec::new();
        for (n, line) in lines {
            if is_rule(line) {
                break;
            }
            let row = cells(line);
            if row.len() != columns.len() {
                return Err(CodecError::ColumnCount {
                    line: n,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            rows.push(row);
        }
        Ok(rows)
    }
}
