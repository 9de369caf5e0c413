//! CSV options, report and error models.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::conf::N_DELIMITER_DEFAULT;

/// Record terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumLineTerminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl EnumLineTerminator {
    pub(crate) fn to_csv_terminator(self) -> csv::Terminator {
        match self {
            Self::Lf => csv::Terminator::Any(b'\n'),
            Self::Crlf => csv::Terminator::CRLF,
        }
    }
}

/// CSV writer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCsvOptions {
    /// Single-byte field delimiter.
    pub delimiter: u8,
    /// Record terminator.
    pub terminator: EnumLineTerminator,
}

impl Default for SpecCsvOptions {
    fn default() -> Self {
        Self {
            delimiter: N_DELIMITER_DEFAULT,
            terminator: EnumLineTerminator::default(),
        }
    }
}

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCsvFileReport {
    pub table_name: String,
    pub path_file: PathBuf,
    pub records_written: usize,
}

/// Outcome of one [`crate::writer::write_tables_csv`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportCsv {
    /// Directory holding the files.
    pub dir_export: PathBuf,
    /// Files in table order.
    pub files: Vec<SpecCsvFileReport>,
}

impl ReportCsv {
    pub fn records_written(&self) -> usize {
        self.files.iter().map(|file| file.records_written).sum()
    }
}

impl fmt::Display for ReportCsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[CSV] dir={} files={} rows={}",
            self.dir_export.display(),
            self.files.len(),
            self.records_written()
        )
    }
}

/// Fatal failures of a CSV export.
#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("I/O failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failure at {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid CSV options: {0}")]
    InvalidOptions(String),
}

/// Result alias for CSV exports.
pub type Result<T> = std::result::Result<T, CsvExportError>;
