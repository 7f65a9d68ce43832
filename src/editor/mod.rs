//! Row editing through an external editor
//!
//! A row is copied into an [`EditBuffer`], rendered as a small document,
//! edited by the user in their editor of choice and parsed back into the
//! same columns.

pub mod launch;

use crate::config::EditFormat;
use crate::db::SqlValue;
use crate::db::params::{array_literal, parse_array_literal};
use crate::error::{EditorError, EditorResult};
use serde_yaml::Value;

/// One column value in an edit buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditValue {
    Scalar(String),
    List(Vec<String>),
}

impl EditValue {
    fn blank_like(&self) -> Self {
        match self {
            EditValue::Scalar(_) => EditValue::Scalar(String::new()),
            EditValue::List(_) => EditValue::List(Vec::new()),
        }
    }

    /// String form used as a statement argument
    pub fn to_arg(&self) -> String {
        match self {
            EditValue::Scalar(s) => s.clone(),
            EditValue::List(items) => array_literal(items),
        }
    }
}

/// Column names paired with editable values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub columns: Vec<String>,
    pub values: Vec<EditValue>,
}

impl EditBuffer {
    /// Buffer holding a database row; array cells become lists
    pub fn from_row(columns: &[String], row: &[SqlValue]) -> Self {
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, _)| match row.get(i) {
                Some(SqlValue::TextArray(items)) => EditValue::List(items.clone()),
                Some(value) => EditValue::Scalar(value.display_string()),
                None => EditValue::Scalar(String::new()),
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    /// Empty buffer for a new row, shaped like `sample` when one is given
    pub fn blank(columns: &[String], sample: Option<&[SqlValue]>) -> Self {
        let mut buffer = Self::from_row(columns, sample.unwrap_or_default());
        for value in &mut buffer.values {
            *value = value.blank_like();
        }
        buffer
    }

    /// Statement arguments in column order
    pub fn to_args(&self) -> Vec<String> {
        self.values.iter().map(EditValue::to_arg).collect()
    }

    /// Render the buffer as an editable document
    pub fn render(&self, format: EditFormat) -> String {
        match format.table_format() {
            Some(codec) => codec.encode(&self.columns, &[self.to_args()]),
            None => self.render_yaml(),
        }
    }

    /// Parse an edited document back into a buffer with the same columns
    pub fn parse(&self, format: EditFormat, text: &str) -> EditorResult<Self> {
        match format.table_format() {
            Some(codec) => self.parse_record(codec.decode_one(text, &self.columns)?),
            None => self.parse_yaml(text),
        }
    }

    fn render_yaml(&self) -> String {
        let mut out = String::new();
        for (column, value) in self.columns.iter().zip(&self.values) {
            let key = yaml_scalar(column);
            match value {
                EditValue::Scalar(s) if s.is_empty() => out.push_str(&format!("{}: \n", key)),
                EditValue::Scalar(s) => out.push_str(&format!("{}: {}\n", key, yaml_scalar(s))),
                EditValue::List(items) => {
                    out.push_str(&format!("{}:\n", key));
                    for item in items {
                        out.push_str(&format!("- {}\n", yaml_scalar(item)));
                    }
                    if items.is_empty() {
                        out.push_str("- \n");
                    }
                }
            }
        }
        out
    }

    fn parse_yaml(&self, text: &str) -> EditorResult<Self> {
        let doc: Value = serde_yaml::from_str(text)?;
        let map = match doc {
            Value::Mapping(map) => map,
            Value::Null => {
                return Err(EditorError::Document("document is empty".to_string()));
            }
            _ => {
                return Err(EditorError::Document(
                    "expected one `column: value` line per column".to_string(),
                ));
            }
        };

        let mut values: Vec<EditValue> = self.values.iter().map(EditValue::blank_like).collect();
        for (key, value) in map {
            let key = scalar_string(&key)
                .ok_or_else(|| EditorError::Document("column names must be plain text".into()))?;
            let index = self
                .columns
                .iter()
                .position(|c| *c == key)
                .ok_or_else(|| EditorError::Document(format!("unexpected key {}", key)))?;
            values[index] = match value {
                Value::Sequence(items) => EditValue::List(
                    items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(|item| {
                            scalar_string(item).ok_or_else(|| {
                                EditorError::Document(format!("{}: nested values are not supported", key))
                            })
                        })
                        .collect::<EditorResult<_>>()?,
                ),
                other => EditValue::Scalar(scalar_string(&other).ok_or_else(|| {
                    EditorError::Document(format!("{}: expected a value or a list", key))
                })?),
            };
        }

        Ok(Self {
            columns: self.columns.clone(),
            values,
        })
    }

    fn parse_record(&self, record: Vec<String>) -> EditorResult<Self> {
        let values = self
            .values
            .iter()
            .zip(record)
            .zip(&self.columns)
            .map(|((shape, text), column)| match shape {
                EditValue::List(_) if text.is_empty() => Ok(EditValue::List(Vec::new())),
                EditValue::List(_) => parse_array_literal(&text)
                    .map(EditValue::List)
                    .map_err(|e| EditorError::Document(format!("{}: {}", column, e))),
                EditValue::Scalar(_) => Ok(EditValue::Scalar(text)),
            })
            .collect::<EditorResult<_>>()?;
        Ok(Self {
            columns: self.columns.clone(),
            values,
        })
    }
}

/// Plain YAML scalar text, quoted only when YAML would read it differently
fn yaml_scalar(s: &str) -> String {
    match serde_yaml::to_string(s) {
        Ok(text) => text.trim_end_matches('\n').to_string(),
        Err(_) => format!("{:?}", s),
    }
}

/// String form of a YAML scalar; `None` for collections
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Run the edit loop: open the editor, parse, and on a parse error ask
/// whether to edit again. Returns `None` when the user discards the edit.
pub fn edit_buffer(
    buffer: &EditBuffer,
    format: EditFormat,
    candidates: &[String],
    mut ask_again: impl FnMut(&EditorError) -> std::io::Result<bool>,
) -> EditorResult<Option<EditBuffer>> {
    let mut text = buffer.render(format);
    loop {
        text = launch::edit_text(candidates, &text, format.suffix())?;
        match buffer.parse(format, &text) {
            Ok(edited) => return Ok(Some(edited)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "edited document rejected");
                if !ask_again(&e)? {
                    return Ok(None);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn buffer() -> EditBuffer {
        EditBuffer::from_row(
            &strings(&["id", "name", "tags"]),
            &[
                SqlValue::Integer(7),
                SqlValue::Text("Madrid".into()),
                SqlValue::TextArray(strings(&["a", "b c"])),
            ],
        )
    }

    #[test]
    fn test_from_row_keeps_arrays_whole() {
        let b = buffer();
        assert_eq!(b.values[0], EditValue::Scalar("7".into()));
        assert_eq!(b.values[2], EditValue::List(strings(&["a", "b c"])));
        assert_eq!(b.to_args(), strings(&["7", "Madrid", r#"{"a","b c"}"#]));
    }

    #[test]
    fn test_render_yaml() {
        assert_eq!(
            buffer().render(EditFormat::Yaml),
            "id: '7'\nname: Madrid\ntags:\n- a\n- b c\n"
        );
    }

    #[test]
    fn test_render_yaml_blank() {
        let b = EditBuffer::blank(
            &strings(&["id", "tags"]),
            Some(&[SqlValue::Integer(1), SqlValue::TextArray(vec![])]),
        );
        assert_eq!(b.render(EditFormat::Yaml), "id: \ntags:\n- \n");
        let parsed = b.parse(EditFormat::Yaml, &b.render(EditFormat::Yaml)).unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn test_yaml_round_trip() {
        let b = buffer();
        let parsed = b.parse(EditFormat::Yaml, &b.render(EditFormat::Yaml)).unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn test_yaml_quotes_ambiguous_values() {
        let b = EditBuffer::from_row(
            &strings(&["a", "b", "c"]),
            &[
                SqlValue::Text("yes: no".into()),
                SqlValue::Text("1.50".into()),
                SqlValue::Text("null".into()),
            ],
        );
        let parsed = b.parse(EditFormat::Yaml, &b.render(EditFormat::Yaml)).unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn test_parse_yaml_user_edits() {
        let b = buffer();
        let edited = b
            .parse(EditFormat::Yaml, "id: 7\nname:\ntags: [x]\n")
            .unwrap();
        assert_eq!(edited.values[0], EditValue::Scalar("7".into()));
        assert_eq!(edited.values[1], EditValue::Scalar(String::new()));
        assert_eq!(edited.values[2], EditValue::List(strings(&["x"])));
    }

    #[test]
    fn test_parse_yaml_missing_column_is_blank() {
        let edited = buffer().parse(EditFormat::Yaml, "name: Rome\n").unwrap();
        assert_eq!(edited.values[0], EditValue::Scalar(String::new()));
        assert_eq!(edited.values[2], EditValue::List(vec![]));
    }

    #[test]
    fn test_parse_yaml_errors_are_recoverable() {
        let b = buffer();
        for text in ["colour: red\n", "- a\n- b\n", "", "name: [1, [2]]\n", "name: {a: 1}\n", "id: [unclosed\n"] {
            let err = b.parse(EditFormat::Yaml, text).unwrap_err();
            assert!(err.is_recoverable(), "{text:?}: {err}");
        }
    }

    #[test]
    fn test_table_formats_round_trip() {
        let b = buffer();
        for format in [EditFormat::Org, EditFormat::Ini, EditFormat::Flat] {
            let parsed = b.parse(format, &b.render(format)).unwrap();
            assert_eq!(parsed, b, "{format:?}");
        }
    }

    #[test]
    fn test_table_format_bad_array_literal() {
        let b = buffer();
        let err = b
            .parse(EditFormat::Flat, "id: 7\nname: x\ntags: a,b\n")
            .unwrap_err();
        assert!(matches!(err, EditorError::Document(_)));
        assert!(err.is_recoverable());
    }
}
