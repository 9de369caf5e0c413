//! `dbsnap_source` v1:
//! Table providers that turn a database into named tables of scalar records.
//!
//! - `conf`   : schema-metadata headers and type keywords
//! - `spec`   : provider trait, column metadata and errors
//! - `util`   : pure value classification and identifier helpers
//! - `sqlite` : read-only SQLite provider
pub mod conf;
pub mod spec;
pub mod sqlite;
pub mod util;

pub use spec::{SourceError, SpecSchemaColumn, TableSource};
pub use sqlite::SqliteSource;
pub use util::{EnumSqliteValue, classify_sqlite_value};
