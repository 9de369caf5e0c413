//! Provider trait, column metadata and errors.

use async_trait::async_trait;
use dbsnap_io::{EnumCellValue, SpecRecord, SpecTables};
use thiserror::Error;

use crate::conf::{
    C_COL_COLUMN_NAME, C_COL_DATA_TYPE, C_COL_DEFAULT, C_COL_LENGTH, C_COL_NULLABLE,
    C_COL_PRIMARY_KEY, C_COL_UNIQUE,
};
use crate::util::parse_declared_length;

/// Failures of a table provider. All of them are fatal for the export.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The database could not be opened.
    #[error("Failed to connect to {context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// Catalog or table query failed.
    #[error("Failed to read {context}: {source}")]
    Reflection {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// A stored value could not be decoded.
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Result alias for providers.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Reflected metadata of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSchemaColumn {
    pub name: String,
    /// Declared type as written in the table definition (may be empty).
    pub declared_type: String,
    pub if_nullable: bool,
    pub if_primary_key: bool,
    pub default: Option<String>,
    /// Covered by a single-column unique index or constraint.
    pub if_unique: bool,
}

impl SpecSchemaColumn {
    /// Length parsed from the declared type (`VARCHAR(120)` -> 120).
    pub fn length(&self) -> Option<i64> {
        parse_declared_length(&self.declared_type)
    }

    /// One schema-metadata record.
    pub fn to_record(&self) -> SpecRecord {
        let mut record = SpecRecord::with_capacity(7);
        record.insert(C_COL_COLUMN_NAME.to_string(), self.name.as_str().into());
        record.insert(
            C_COL_DATA_TYPE.to_string(),
            self.declared_type.as_str().into(),
        );
        record.insert(C_COL_NULLABLE.to_string(), self.if_nullable.into());
        record.insert(C_COL_PRIMARY_KEY.to_string(), self.if_primary_key.into());
        record.insert(C_COL_DEFAULT.to_string(), self.default.clone().into());
        record.insert(C_COL_UNIQUE.to_string(), self.if_unique.into());
        record.insert(
            C_COL_LENGTH.to_string(),
            self.length().map_or(EnumCellValue::Null, EnumCellValue::Int),
        );
        record
    }
}

/// Source of named tables for one export run.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Base name of the artifacts (file stem of the database).
    fn database_name(&self) -> &str;

    /// User table names, sorted.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// One table per user table, holding one metadata record per column.
    async fn fetch_schema(&self) -> Result<SpecTables>;

    /// One table per user table, holding its rows.
    async fn fetch_data(&self) -> Result<SpecTables>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::TUP_SCHEMA_COLUMNS;

    #[test]
    fn schema_column_record_follows_header_order() {
        let column = SpecSchemaColumn {
            name: "email".to_string(),
            declared_type: "VARCHAR(120)".to_string(),
            if_nullable: false,
            if_primary_key: false,
            default: None,
            if_unique: true,
        };
        let record = column.to_record();

        let l_keys: Vec<_> = record.keys().map(String::as_str).collect();
        assert_eq!(l_keys, TUP_SCHEMA_COLUMNS.to_vec());
        assert_eq!(record[C_COL_LENGTH], EnumCellValue::Int(120));
        assert_eq!(record[C_COL_UNIQUE], EnumCellValue::Bool(true));
        assert!(record[C_COL_DEFAULT].is_null());
    }
}
