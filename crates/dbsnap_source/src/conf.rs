//! Schema-metadata headers and declared-type keywords.

/// Schema-metadata column: column name.
pub const C_COL_COLUMN_NAME: &str = "Column Name";
/// Schema-metadata column: declared type.
pub const C_COL_DATA_TYPE: &str = "Data Type";
/// Schema-metadata column: nullability.
pub const C_COL_NULLABLE: &str = "Nullable";
/// Schema-metadata column: primary-key membership.
pub const C_COL_PRIMARY_KEY: &str = "Primary Key";
/// Schema-metadata column: default expression.
pub const C_COL_DEFAULT: &str = "Default";
/// Schema-metadata column: single-column uniqueness.
pub const C_COL_UNIQUE: &str = "Unique";
/// Schema-metadata column: declared length.
pub const C_COL_LENGTH: &str = "Length";

/// Schema-metadata header, in output order.
pub const TUP_SCHEMA_COLUMNS: [&str; 7] = [
    C_COL_COLUMN_NAME,
    C_COL_DATA_TYPE,
    C_COL_NULLABLE,
    C_COL_PRIMARY_KEY,
    C_COL_DEFAULT,
    C_COL_UNIQUE,
    C_COL_LENGTH,
];

/// Declared base types whose integers are flags.
pub const TUP_DECLARED_BOOL_TYPES: [&str; 5] = ["BOOL", "BOOLEAN", "BIT", "YESNO", "LOGICAL"];
/// Keywords marking a declared type as temporal.
pub const TUP_DECLARED_TEMPORAL_KEYWORDS: [&str; 2] = ["DATE", "TIME"];

/// Prefix of base64-encoded BLOB text.
pub const C_PREFIX_BLOB: &str = "base64:";
/// Database name used when none can be derived from the location.
pub const C_DATABASE_NAME_FALLBACK: &str = "main";
