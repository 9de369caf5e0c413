//! Pure helpers: value classification, declared-type parsing, quoting.

use std::path::Path;

use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};
use dbsnap_io::EnumCellValue;

use crate::conf::{
    C_DATABASE_NAME_FALLBACK, C_PREFIX_BLOB, TUP_DECLARED_BOOL_TYPES,
    TUP_DECLARED_TEMPORAL_KEYWORDS,
};

const TUP_FMT_DATETIME: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const C_FMT_DATE: &str = "%Y-%m-%d";

/// One stored value by SQLite storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSqliteValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Classify a stored value using its storage class and the column's declared type.
pub fn classify_sqlite_value(declared_type: &str, value: EnumSqliteValue) -> EnumCellValue {
    match value {
        EnumSqliteValue::Null => EnumCellValue::Null,
        EnumSqliteValue::Integer(val) => {
            // Access stores true as -1.
            if is_declared_bool(declared_type) && matches!(val, -1..=1) {
                EnumCellValue::Bool(val != 0)
            } else {
                EnumCellValue::Int(val)
            }
        }
        EnumSqliteValue::Real(val) => EnumCellValue::Float(val),
        EnumSqliteValue::Text(val) => {
            if is_declared_temporal(declared_type) {
                parse_temporal_text(&val).unwrap_or(EnumCellValue::Text(val))
            } else {
                EnumCellValue::Text(val)
            }
        }
        EnumSqliteValue::Blob(val) => EnumCellValue::Text(format!(
            "{C_PREFIX_BLOB}{}",
            base64::engine::general_purpose::STANDARD.encode(val)
        )),
    }
}

fn derive_declared_base_type(declared_type: &str) -> String {
    declared_type
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase()
}

pub fn is_declared_bool(declared_type: &str) -> bool {
    let c_base = derive_declared_base_type(declared_type);
    TUP_DECLARED_BOOL_TYPES.contains(&c_base.as_str())
}

pub fn is_declared_temporal(declared_type: &str) -> bool {
    let c_upper = declared_type.to_ascii_uppercase();
    TUP_DECLARED_TEMPORAL_KEYWORDS
        .iter()
        .any(|c_keyword| c_upper.contains(c_keyword))
}

/// Parse ISO-like date or date-time text; `None` when it is neither.
pub fn parse_temporal_text(text: &str) -> Option<EnumCellValue> {
    let c_text = text.trim();
    for c_fmt in TUP_FMT_DATETIME {
        if let Ok(val) = NaiveDateTime::parse_from_str(c_text, c_fmt) {
            return Some(EnumCellValue::Timestamp(val));
        }
    }
    NaiveDate::parse_from_str(c_text, C_FMT_DATE)
        .ok()
        .map(EnumCellValue::Date)
}

/// First size argument of a declared type: `VARCHAR(120)` -> 120, `DECIMAL(10,2)` -> 10.
pub fn parse_declared_length(declared_type: &str) -> Option<i64> {
    let (_, c_args) = declared_type.split_once('(')?;
    let (c_args, _) = c_args.split_once(')')?;
    c_args.split(',').next()?.trim().parse().ok()
}

/// Quote an identifier for SQL text (`"a""b"`).
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for SQL text (`'a''b'`).
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Database name from a file path or `sqlite:` URL: the file stem.
pub fn derive_database_name(location: &str) -> String {
    let c_path = location
        .strip_prefix("sqlite://")
        .or_else(|| location.strip_prefix("sqlite:"))
        .unwrap_or(location);
    let c_path = c_path.split('?').next().unwrap_or_default();

    Path::new(c_path)
        .file_stem()
        .map(|c_stem| c_stem.to_string_lossy().to_string())
        .filter(|c_stem| !c_stem.is_empty() && c_stem != ":memory:")
        .unwrap_or_else(|| C_DATABASE_NAME_FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_sqlite_value_uses_declared_type() {
        assert_eq!(
            classify_sqlite_value("BOOLEAN", EnumSqliteValue::Integer(1)),
            EnumCellValue::Bool(true)
        );
        assert_eq!(
            classify_sqlite_value("YESNO", EnumSqliteValue::Integer(-1)),
            EnumCellValue::Bool(true)
        );
        assert_eq!(
            classify_sqlite_value("BIT", EnumSqliteValue::Integer(7)),
            EnumCellValue::Int(7)
        );
        assert_eq!(
            classify_sqlite_value("INTEGER", EnumSqliteValue::Integer(1)),
            EnumCellValue::Int(1)
        );
        assert_eq!(
            classify_sqlite_value("REAL", EnumSqliteValue::Real(0.5)),
            EnumCellValue::Float(0.5)
        );
        assert_eq!(
            classify_sqlite_value("", EnumSqliteValue::Null),
            EnumCellValue::Null
        );
    }

    #[test]
    fn classify_sqlite_value_parses_temporal_text() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
        assert_eq!(
            classify_sqlite_value("DATE", EnumSqliteValue::Text("2024-01-01".to_string())),
            EnumCellValue::Date(date)
        );
        assert_eq!(
            classify_sqlite_value(
                "DATETIME",
                EnumSqliteValue::Text("2024-01-01 08:30:00".to_string())
            ),
            EnumCellValue::Timestamp(date.and_hms_opt(8, 30, 0).expect("time"))
        );
        assert_eq!(
            classify_sqlite_value("DATE", EnumSqliteValue::Text("soon".to_string())),
            EnumCellValue::Text("soon".to_string())
        );
        assert_eq!(
            classify_sqlite_value("TEXT", EnumSqliteValue::Text("2024-01-01".to_string())),
            EnumCellValue::Text("2024-01-01".to_string())
        );
    }

    #[test]
    fn classify_sqlite_value_encodes_blob() {
        assert_eq!(
            classify_sqlite_value("BLOB", EnumSqliteValue::Blob(b"hi".to_vec())),
            EnumCellValue::Text("base64:aGk=".to_string())
        );
    }

    #[test]
    fn parse_declared_length_reads_first_argument() {
        assert_eq!(parse_declared_length("VARCHAR(120)"), Some(120));
        assert_eq!(parse_declared_length("DECIMAL(10, 2)"), Some(10));
        assert_eq!(parse_declared_length("TEXT"), None);
        assert_eq!(parse_declared_length("CHAR(x)"), None);
    }

    #[test]
    fn quote_helpers_double_quote_chars() {
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_literal("Bob's"), "'Bob''s'");
    }

    #[test]
    fn derive_database_name_takes_file_stem() {
        assert_eq!(derive_database_name("/data/sales.db"), "sales");
        assert_eq!(derive_database_name("sqlite://data/sales.sqlite?mode=ro"), "sales");
        assert_eq!(derive_database_name("sqlite::memory:"), "main");
    }
}
