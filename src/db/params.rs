//! Statement parameters
//!
//! Arguments always travel as strings (page arguments, row values, edited
//! text). Right before execution each one is converted into the Rust type
//! matching the parameter type the server inferred for the statement.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::types::{ToSql, Type};

/// A parameter ready to hand to tokio-postgres
pub type BoxedParam = Box<dyn ToSql + Sync + Send>;

/// Render a list of strings as a PostgreSQL array literal (`{"a","b"}`).
pub fn array_literal(items: &[String]) -> String {
    let mut out = String::from("{");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        for c in item.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out.push('}');
    out
}

/// Parse a one-dimensional PostgreSQL array literal.
///
/// Elements may be quoted (with `\` escapes) or bare; bare elements are
/// trimmed and a bare `NULL` becomes an empty string.
pub fn parse_array_literal(text: &str) -> Result<Vec<String>, String> {
    let inner = text
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| "array literal must be enclosed in braces".to_string())?;

    let mut items = Vec::new();
    if inner.trim().is_empty() {
        return Ok(items);
    }

    let mut chars = inner.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut item = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(c) => item.push(c),
                        None => return Err("unterminated escape".to_string()),
                    },
                    Some('"') => break,
                    Some(c) => item.push(c),
                    None => return Err("unterminated quoted element".to_string()),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                item.push(c);
            }
            let bare = item.trim();
            item = if bare.eq_ignore_ascii_case("NULL") {
                String::new()
            } else {
                bare.to_string()
            };
        }
        items.push(item);

        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(c) => return Err(format!("unexpected '{}' after element", c)),
        }
    }
    Ok(items)
}

fn is_text_type(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A time of day. Timestamp text is accepted for its time part, so the
/// table rendering of midnight (`0000-01-01`) reads back as `00:00:00`.
fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
        .or_else(|| parse_timestamp(value).map(|ts| ts.time()))
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Convert string argument `index` (1-based, for messages) to a parameter of type `ty`.
///
/// An empty string binds NULL for every non-text type.
pub fn coerce(index: usize, value: &str, ty: &Type) -> DbResult<BoxedParam> {
    let fail = |reason: &str| DbError::TypeConversion {
        index,
        type_name: ty.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if is_text_type(ty) {
        return Ok(Box::new(value.to_string()));
    }

    let trimmed = value.trim();
    let empty = trimmed.is_empty();

    let param: BoxedParam = match *ty {
        Type::INT2 if empty => Box::new(None::<i16>),
        Type::INT2 => Box::new(trimmed.parse::<i16>().map_err(|e| fail(&e.to_string()))?),
        Type::INT4 if empty => Box::new(None::<i32>),
        Type::INT4 => Box::new(trimmed.parse::<i32>().map_err(|e| fail(&e.to_string()))?),
        Type::INT8 if empty => Box::new(None::<i64>),
        Type::INT8 => Box::new(trimmed.parse::<i64>().map_err(|e| fail(&e.to_string()))?),
        Type::OID if empty => Box::new(None::<u32>),
        Type::OID => Box::new(trimmed.parse::<u32>().map_err(|e| fail(&e.to_string()))?),
        Type::FLOAT4 if empty => Box::new(None::<f32>),
        Type::FLOAT4 => Box::new(trimmed.parse::<f32>().map_err(|e| fail(&e.to_string()))?),
        Type::FLOAT8 if empty => Box::new(None::<f64>),
        Type::FLOAT8 => Box::new(trimmed.parse::<f64>().map_err(|e| fail(&e.to_string()))?),
        Type::NUMERIC if empty => Box::new(None::<Decimal>),
        Type::NUMERIC => {
            Box::new(Decimal::from_str(trimmed).map_err(|e| fail(&e.to_string()))?)
        }
        Type::BOOL if empty => Box::new(None::<bool>),
        Type::BOOL => Box::new(parse_bool(trimmed).ok_or_else(|| fail("not a boolean"))?),
        Type::UUID if empty => Box::new(None::<uuid::Uuid>),
        Type::UUID => {
            Box::new(uuid::Uuid::parse_str(trimmed).map_err(|e| fail(&e.to_string()))?)
        }
        Type::JSON | Type::JSONB if empty => Box::new(None::<serde_json::Value>),
        Type::JSON | Type::JSONB => Box::new(
            serde_json::from_str::<serde_json::Value>(trimmed)
                .map_err(|e| fail(&e.to_string()))?,
        ),
        Type::DATE if empty => Box::new(None::<NaiveDate>),
        Type::DATE => Box::new(
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| fail(&e.to_string()))?,
        ),
        Type::TIME if empty => Box::new(None::<NaiveTime>),
        Type::TIME => Box::new(parse_time(trimmed).ok_or_else(|| fail("not a time"))?),
        Type::TIMESTAMP if empty => Box::new(None::<NaiveDateTime>),
        Type::TIMESTAMP => {
            Box::new(parse_timestamp(trimmed).ok_or_else(|| fail("not a timestamp"))?)
        }
        Type::TIMESTAMPTZ if empty => Box::new(None::<DateTime<Utc>>),
        Type::TIMESTAMPTZ => {
            let ts = DateTime::parse_from_rfc3339(trimmed)
                .map(|t| t.with_timezone(&Utc))
                .ok()
                .or_else(|| parse_timestamp(trimmed).map(|t| t.and_utc()))
                .ok_or_else(|| fail("not a timestamp"))?;
            Box::new(ts)
        }
        Type::BYTEA => Box::new(value.as_bytes().to_vec()),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY
            if empty =>
        {
            Box::new(None::<Vec<String>>)
        }
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY => {
            Box::new(parse_array_literal(trimmed).map_err(|e| fail(&e))?)
        }
        _ => Box::new(value.to_string()),
    };
    Ok(param)
}

/// Convert all arguments for a prepared statement.
pub fn coerce_all(args: &[String], types: &[Type]) -> DbResult<Vec<BoxedParam>> {
    if args.len() != types.len() {
        return Err(DbError::ParameterCount {
            expected: types.len(),
            found: args.len(),
        });
    }
    args.iter()
        .zip(types)
        .enumerate()
        .map(|(i, (value, ty))| coerce(i + 1, value, ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_array_literal_quotes_and_escapes() {
        assert_eq!(array_literal(&[]), "{}");
        assert_eq!(array_literal(&strings(&["a", "b c"])), r#"{"a","b c"}"#);
        assert_eq!(array_literal(&strings(&[r#"say "hi""#])), r#"{"say \"hi\""}"#);
    }

    #[test]
    fn test_parse_array_literal() {
        assert_eq!(parse_array_literal("{}").unwrap(), Vec::<String>::new());
        assert_eq!(
            parse_array_literal(r#"{"a","b, c"}"#).unwrap(),
            strings(&["a", "b, c"])
        );
        assert_eq!(
            parse_array_literal("{ x , y,NULL}").unwrap(),
            strings(&["x", "y", ""])
        );
        assert!(parse_array_literal("a,b").is_err());
        assert!(parse_array_literal(r#"{"open}"#).is_err());
    }

    #[test]
    fn test_array_literal_round_trip() {
        let items = strings(&["plain", "with \"quotes\"", "back\\slash", ""]);
        assert_eq!(parse_array_literal(&array_literal(&items)).unwrap(), items);
    }

    #[test]
    fn test_coerce_accepts_typed_values() {
        assert!(coerce(1, "42", &Type::INT4).is_ok());
        assert!(coerce(1, "", &Type::INT4).is_ok());
        assert!(coerce(1, "3.25", &Type::NUMERIC).is_ok());
        assert!(coerce(1, "yes", &Type::BOOL).is_ok());
        assert!(coerce(1, "2024-03-01", &Type::TIMESTAMP).is_ok());
        assert!(coerce(1, "15:04:05", &Type::TIME).is_ok());
        assert!(coerce(1, r#"{"a":1}"#, &Type::JSONB).is_ok());
        assert!(coerce(1, r#"{"a","b"}"#, &Type::TEXT_ARRAY).is_ok());
        assert!(coerce(1, "anything", &Type::TEXT).is_ok());
    }

    #[test]
    fn test_time_reads_back_its_table_rendering() {
        use crate::db::types::{SqlValue, zero_date};

        let midnight = SqlValue::Timestamp(zero_date().and_time(NaiveTime::MIN)).display_string();
        assert_eq!(midnight, "0000-01-01");
        assert_eq!(parse_time(&midnight), Some(NaiveTime::MIN));
        assert!(coerce(1, &midnight, &Type::TIME).is_ok());

        let afternoon = NaiveTime::from_hms_opt(15, 4, 5).unwrap();
        let shown = SqlValue::Timestamp(zero_date().and_time(afternoon)).display_string();
        assert_eq!(parse_time(&shown), Some(afternoon));
        assert_eq!(parse_time("2024-03-01 15:04:05"), Some(afternoon));
        assert_eq!(parse_time("teatime"), None);
    }

    #[test]
    fn test_coerce_reports_argument() {
        let err = match coerce(2, "abc", &Type::INT8) {
            Err(e) => e,
            Ok(_) => panic!("expected conversion error"),
        };
        match err {
            DbError::TypeConversion { index, value, .. } => {
                assert_eq!(index, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_coerce_all_checks_count() {
        let result = coerce_all(&strings(&["1"]), &[Type::INT4, Type::TEXT]);
        assert!(matches!(
            result,
            Err(DbError::ParameterCount {
                expected: 2,
                found: 1
            })
        ));
    }
}
