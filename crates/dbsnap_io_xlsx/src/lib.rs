//! `dbsnap_io_xlsx` v1:
//! Multi-sheet workbook exporter with an index sheet and cross-sheet links.
//!
//! - `conf`   : spreadsheet limits, labels and default style presets
//! - `spec`   : options/style/plan/report models and errors
//! - `util`   : pure helpers (coercion, widths, sheet naming, links)
//! - `plan`   : immutable workbook layout builder
//! - `writer` : serialization and atomic save
pub mod conf;
pub mod plan;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_INDEX, C_TEXT_RETURN_LINK, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use plan::plan_workbook;
pub use spec::{
    EnumSheetCell, ReportWorkbook, SpecCellFormat, SpecCellRange, SpecFontStyle, SpecHyperlink,
    SpecSheetPlan, SpecSheetReport, SpecWorkbookOptions, SpecWorkbookPlan, SpecWorkbookStyle,
    XlsxExportError,
};
pub use util::{
    SpecSheetNameRegistry, calculate_column_width, coerce_cell_value, derive_internal_link,
    sanitize_sheet_name,
};
pub use writer::WorkbookExporter;
