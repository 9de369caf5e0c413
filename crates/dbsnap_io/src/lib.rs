//! `dbsnap_io` v1:
//! Shared table model passed from table providers to exporters.
//!
//! - `spec` : cell values, records, tables, export target
//! - `util` : textual rendering and export-directory helpers
pub mod spec;
pub mod util;

pub use spec::{EnumCellValue, SpecExportTarget, SpecRecord, SpecTable, SpecTables};
pub use util::{derive_export_dir, derive_float_text};
