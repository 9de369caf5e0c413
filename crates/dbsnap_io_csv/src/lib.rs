//! `dbsnap_io_csv` v1:
//! One delimited file per table, written next to the workbook.
//!
//! - `conf`   : default delimiter and terminator
//! - `spec`   : options, report and errors
//! - `util`   : file-name and delimiter helpers
//! - `writer` : file writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use spec::{CsvExportError, EnumLineTerminator, ReportCsv, SpecCsvFileReport, SpecCsvOptions};
pub use util::{derive_file_safe_name, parse_delimiter};
pub use writer::write_tables_csv;
