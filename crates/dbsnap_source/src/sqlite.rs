//! Read-only SQLite table provider.
//!
//! Opens the database with `mode=ro`, enumerates user tables from
//! `sqlite_master`, reflects columns through `PRAGMA table_xinfo` /
//! `PRAGMA index_list` and reads rows with the reflected column list.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use dbsnap_io::{SpecRecord, SpecTable, SpecTables};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::conf::TUP_SCHEMA_COLUMNS;
use crate::spec::{Result, SourceError, SpecSchemaColumn, TableSource};
use crate::util::{
    EnumSqliteValue, classify_sqlite_value, derive_database_name, quote_identifier, quote_literal,
};

/// SQLite provider over a read-only pool.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
    database_name: String,
}

impl SqliteSource {
    /// Open `location` (file path or `sqlite:` URL) read-only.
    ///
    /// # Errors
    /// [`SourceError::Connection`] when the location is malformed, missing or unreadable.
    pub async fn connect(location: &str) -> Result<Self> {
        let derive_connection_error = |source: sqlx::Error| SourceError::Connection {
            context: format!("SQLite database '{location}'"),
            source,
        };

        let options = if location.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(location).map_err(derive_connection_error)?
        } else {
            SqliteConnectOptions::new().filename(location)
        };
        let options = options.read_only(true).create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(derive_connection_error)?;

        let database_name = derive_database_name(location);
        info!(database = %database_name, "opened SQLite database");
        Ok(Self::from_pool(pool, database_name))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool, database_name: impl Into<String>) -> Self {
        Self {
            pool,
            database_name: database_name.into(),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Reflect the columns of `table_name` in definition order, generated columns included.
    pub async fn fetch_table_columns(&self, table_name: &str) -> Result<Vec<SpecSchemaColumn>> {
        let set_unique = self.fetch_unique_columns(table_name).await?;

        let c_query = format!("PRAGMA table_xinfo({})", quote_literal(table_name));
        let l_rows = sqlx::query(&c_query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| SourceError::Reflection {
                context: format!("columns of table '{table_name}'"),
                source,
            })?;

        let derive_decode_error = |source| SourceError::Decode {
            context: format!("column metadata of table '{table_name}'"),
            source,
        };

        let mut l_columns = Vec::with_capacity(l_rows.len());
        for row in &l_rows {
            // hidden=1 marks hidden columns of virtual tables; 2 and 3 are generated columns.
            let n_hidden: i64 = row.try_get("hidden").map_err(derive_decode_error)?;
            if n_hidden == 1 {
                continue;
            }
            l_columns.push(derive_schema_column(row, &set_unique).map_err(derive_decode_error)?);
        }
        Ok(l_columns)
    }

    /// Columns covered alone by a unique index or UNIQUE constraint (primary keys excluded).
    async fn fetch_unique_columns(&self, table_name: &str) -> Result<HashSet<String>> {
        let derive_reflection_error = |source| SourceError::Reflection {
            context: format!("indexes of table '{table_name}'"),
            source,
        };

        let c_query = format!("PRAGMA index_list({})", quote_literal(table_name));
        let l_index_rows = sqlx::query(&c_query)
            .fetch_all(&self.pool)
            .await
            .map_err(derive_reflection_error)?;

        let mut set_unique = HashSet::new();
        for row in &l_index_rows {
            let n_unique: i64 = row.try_get("unique").map_err(derive_reflection_error)?;
            let origin: String = row.try_get("origin").map_err(derive_reflection_error)?;
            if n_unique == 0 || origin == "pk" {
                continue;
            }
            let index_name: String = row.try_get("name").map_err(derive_reflection_error)?;

            let c_query = format!("PRAGMA index_info({})", quote_literal(&index_name));
            let l_column_rows = sqlx::query(&c_query)
                .fetch_all(&self.pool)
                .await
                .map_err(derive_reflection_error)?;
            if let [row_column] = l_column_rows.as_slice() {
                let column_name: Option<String> =
                    row_column.try_get("name").map_err(derive_reflection_error)?;
                set_unique.extend(column_name);
            }
        }
        Ok(set_unique)
    }

    async fn fetch_table_rows(&self, table_name: &str) -> Result<SpecTable> {
        let l_columns = self.fetch_table_columns(table_name).await?;
        let dict_declared_type: HashMap<&str, &str> = l_columns
            .iter()
            .map(|column| (column.name.as_str(), column.declared_type.as_str()))
            .collect();

        let c_select_list = l_columns
            .iter()
            .map(|column| quote_identifier(&column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let c_query = format!(
            "SELECT {c_select_list} FROM {}",
            quote_identifier(table_name)
        );
        let l_rows = sqlx::query(&c_query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| SourceError::Reflection {
                context: format!("rows of table '{table_name}'"),
                source,
            })?;

        let mut l_records = Vec::with_capacity(l_rows.len());
        for row in &l_rows {
            let mut record = SpecRecord::with_capacity(l_columns.len());
            for column in row.columns() {
                let c_name = column.name();
                let value = decode_sqlite_value(row, column.ordinal()).map_err(|source| {
                    SourceError::Decode {
                        context: format!("column '{c_name}' of table '{table_name}'"),
                        source,
                    }
                })?;
                let declared_type = dict_declared_type.get(c_name).copied().unwrap_or_default();
                record.insert(
                    c_name.to_string(),
                    classify_sqlite_value(declared_type, value),
                );
            }
            l_records.push(record);
        }

        let l_names = l_columns.into_iter().map(|column| column.name).collect();
        Ok(SpecTable::new(l_names, l_records))
    }
}

fn derive_schema_column(
    row: &SqliteRow,
    set_unique: &HashSet<String>,
) -> std::result::Result<SpecSchemaColumn, sqlx::Error> {
    let name: String = row.try_get("name")?;
    let declared_type: Option<String> = row.try_get("type")?;
    let n_notnull: i64 = row.try_get("notnull")?;
    let default: Option<String> = row.try_get("dflt_value")?;
    let n_pk: i64 = row.try_get("pk")?;

    // Primary-key columns are implicitly NOT NULL.
    let if_primary_key = n_pk > 0;
    Ok(SpecSchemaColumn {
        if_unique: set_unique.contains(&name),
        name,
        declared_type: declared_type.unwrap_or_default(),
        if_nullable: n_notnull == 0 && !if_primary_key,
        if_primary_key,
        default,
    })
}

fn decode_sqlite_value(
    row: &SqliteRow,
    idx: usize,
) -> std::result::Result<EnumSqliteValue, sqlx::Error> {
    let value_raw = row.try_get_raw(idx)?;
    if value_raw.is_null() {
        return Ok(EnumSqliteValue::Null);
    }
    let c_storage_class = value_raw.type_info().name().to_string();

    let value = match c_storage_class.as_str() {
        "INTEGER" => EnumSqliteValue::Integer(row.try_get(idx)?),
        "REAL" => EnumSqliteValue::Real(row.try_get(idx)?),
        "BLOB" => EnumSqliteValue::Blob(row.try_get(idx)?),
        _ => EnumSqliteValue::Text(row.try_get(idx)?),
    };
    Ok(value)
}

#[async_trait]
impl TableSource for SqliteSource {
    fn database_name(&self) -> &str {
        &self.database_name
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let c_query = "SELECT name FROM sqlite_master \
                       WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                       ORDER BY name";
        let l_rows = sqlx::query(c_query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| SourceError::Reflection {
                context: "table list".to_string(),
                source,
            })?;

        l_rows
            .iter()
            .map(|row| {
                row.try_get("name").map_err(|source| SourceError::Decode {
                    context: "table name".to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn fetch_schema(&self) -> Result<SpecTables> {
        let l_headers: Vec<String> = TUP_SCHEMA_COLUMNS.iter().map(|c| c.to_string()).collect();

        let mut tables = SpecTables::new();
        for table_name in self.list_tables().await? {
            let l_columns = self.fetch_table_columns(&table_name).await?;
            let l_records = l_columns.iter().map(SpecSchemaColumn::to_record).collect();
            debug!(table = %table_name, columns = l_columns.len(), "reflected table schema");
            tables.insert(table_name, SpecTable::new(l_headers.clone(), l_records));
        }
        Ok(tables)
    }

    async fn fetch_data(&self) -> Result<SpecTables> {
        let mut tables = SpecTables::new();
        for table_name in self.list_tables().await? {
            let table = self.fetch_table_rows(&table_name).await?;
            debug!(table = %table_name, rows = table.len(), "read table rows");
            tables.insert(table_name, table);
        }
        Ok(tables)
    }
}
