//! Table, record and cell value models.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

use crate::util::{derive_export_dir, derive_float_text};

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Scalar cell value delivered by a table provider.
///
/// Values that are not one of these scalars must be classified into `Text`
/// at the provider boundary (see the `From` impls below).
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing value.
    Null,
    /// Signed integer.
    Int(i64),
    /// Floating point number (may be non-finite).
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day.
    Timestamp(NaiveDateTime),
    /// Free text.
    Text(String),
}

static VALUE_NULL: EnumCellValue = EnumCellValue::Null;

impl EnumCellValue {
    /// Whether the value is [`EnumCellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Textual form used by delimited output and width estimation.
    ///
    /// `Null` renders as the empty string, booleans as `True`/`False`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int(val) => val.to_string(),
            Self::Float(val) => derive_float_text(*val),
            Self::Bool(val) => if *val { "True" } else { "False" }.to_string(),
            Self::Date(val) => val.format("%Y-%m-%d").to_string(),
            Self::Timestamp(val) => val.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            Self::Text(val) => val.clone(),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for EnumCellValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for EnumCellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl<T> From<Option<T>> for EnumCellValue
where
    T: Into<EnumCellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableModels

/// One row: column name -> value, in column order.
pub type SpecRecord = IndexMap<String, EnumCellValue>;

/// Ordered mapping of table name -> table. Insertion order is export order.
pub type SpecTables = IndexMap<String, SpecTable>;

/// Uniform-shape records of one table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    /// Header column names, in output order.
    pub columns: Vec<String>,
    /// Rows in provider order.
    pub records: Vec<SpecRecord>,
}

impl SpecTable {
    /// Build a table with an explicit column list.
    pub fn new(columns: Vec<String>, records: Vec<SpecRecord>) -> Self {
        Self { columns, records }
    }

    /// Build a table whose header is taken from the first record.
    pub fn from_records(records: Vec<SpecRecord>) -> Self {
        let columns = records
            .first()
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default();
        Self { columns, records }
    }

    /// Number of records (before any export-side truncation).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value at `(row_idx, column)`; missing cells read as `Null`.
    pub fn value(&self, row_idx: usize, column: &str) -> &EnumCellValue {
        self.records
            .get(row_idx)
            .and_then(|record| record.get(column))
            .unwrap_or(&VALUE_NULL)
    }

    /// Values of one row aligned to [`Self::columns`].
    pub fn row_values(&self, row_idx: usize) -> impl Iterator<Item = &EnumCellValue> + '_ {
        self.columns
            .iter()
            .map(move |c_col| self.value(row_idx, c_col))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportTarget

/// Output root plus the database-derived base name of the artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportTarget {
    /// Configured output root.
    pub dir_output: PathBuf,
    /// Base name used for the subdirectory and workbook file.
    pub db_name: String,
}

impl SpecExportTarget {
    /// Create a target under `dir_output` named `db_name`.
    pub fn new(dir_output: impl AsRef<Path>, db_name: impl Into<String>) -> Self {
        Self {
            dir_output: dir_output.as_ref().to_path_buf(),
            db_name: db_name.into(),
        }
    }

    /// Directory that receives the artifacts (`<dir_output>/<db_name>`).
    pub fn dir_export(&self) -> PathBuf {
        derive_export_dir(&self.dir_output, &self.db_name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
