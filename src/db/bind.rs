//! Placeholder translation
//!
//! Page templates use positional `$n` placeholders. Before execution they
//! are rewritten into the driver's placeholder syntax, and the referenced
//! arguments are flattened into emission order. An argument referenced
//! twice is sent twice; references may appear in any order.

use crate::error::{BindError, BindResult};

/// Placeholder syntax understood by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... numbered in emission order (PostgreSQL)
    #[default]
    Numbered,
    /// `?` for every parameter
    Question,
}

/// A statement ready for the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<String>,
}

/// One `$n` occurrence in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder {
    /// Byte offset of the `$`
    offset: usize,
    /// Byte length including the `$`
    len: usize,
    /// Parsed index; `None` when no digits follow the `$`
    index: Option<usize>,
}

fn scan(template: &str) -> Vec<Placeholder> {
    let bytes = template.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let digits = bytes[i + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let index = if digits == 0 {
            None
        } else {
            // Saturate absurdly long indices; they are out of range anyway
            Some(
                template[i + 1..i + 1 + digits]
                    .parse::<usize>()
                    .unwrap_or(usize::MAX),
            )
        };
        found.push(Placeholder {
            offset: i,
            len: 1 + digits,
            index,
        });
        i += 1 + digits;
    }
    found
}

fn resolve<'a, T>(placeholder: &Placeholder, args: &'a [T]) -> BindResult<&'a T> {
    let index = placeholder.index.ok_or(BindError::MissingIndex {
        offset: placeholder.offset,
    })?;
    index
        .checked_sub(1)
        .and_then(|i| args.get(i))
        .ok_or(BindError::OutOfRange {
            index,
            available: args.len(),
            offset: placeholder.offset,
        })
}

/// Rewrite `template` for the driver and collect its arguments.
pub fn translate(
    template: &str,
    args: &[String],
    style: PlaceholderStyle,
) -> BindResult<Statement> {
    let mut sql = String::with_capacity(template.len());
    let mut out_args = Vec::new();
    let mut last = 0;

    for placeholder in scan(template) {
        let value = resolve(&placeholder, args)?;
        sql.push_str(&template[last..placeholder.offset]);
        out_args.push(value.clone());
        match style {
            PlaceholderStyle::Numbered => {
                sql.push('$');
                sql.push_str(&out_args.len().to_string());
            }
            PlaceholderStyle::Question => sql.push('?'),
        }
        last = placeholder.offset + placeholder.len;
    }
    sql.push_str(&template[last..]);

    Ok(Statement {
        sql,
        args: out_args,
    })
}

/// Replace every `$n` in `target` with the n-th value of `row`.
///
/// This is the row-value pass used by key bindings, independent of
/// [`translate`].
pub fn substitute(target: &str, row: &[String]) -> BindResult<String> {
    let mut out = String::with_capacity(target.len());
    let mut last = 0;
    for placeholder in scan(target) {
        let value = resolve(&placeholder, row)?;
        out.push_str(&target[last..placeholder.offset]);
        out.push_str(value);
        last = placeholder.offset + placeholder.len;
    }
    out.push_str(&target[last..]);
    Ok(out)
}

/// Check that `template` can be bound with `available` arguments.
pub fn check_arity(template: &str, available: usize) -> BindResult<()> {
    for placeholder in scan(template) {
        let index = placeholder.index.ok_or(BindError::MissingIndex {
            offset: placeholder.offset,
        })?;
        if index == 0 || index > available {
            return Err(BindError::OutOfRange {
                index,
                available,
                offset: placeholder.offset,
            });
        }
    }
    Ok(())
}
