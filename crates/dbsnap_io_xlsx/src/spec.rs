//! Shared XLSX specification models.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::conf::{
    N_RECORDS_PER_TABLE_MAX, N_WIDTH_CELL_MAX, derive_default_workbook_style,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, translated to a `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Single underline.
    pub underline: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            underline: other.underline.or(self.underline),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StyleAndOptions

/// Font directive for header cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFontStyle {
    /// Font family; `None` keeps the workbook default.
    pub name: Option<String>,
    /// Font size in points.
    pub size: i64,
    /// Bold style.
    pub bold: bool,
    /// Font color (`#RRGGBB`).
    pub color: String,
}

/// Immutable style configuration of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWorkbookStyle {
    /// Header font.
    pub header_font: SpecFontStyle,
    /// Header background fill (`#RRGGBB`).
    pub header_fill: String,
    /// Hyperlink font color (`#RRGGBB`).
    pub link_color: String,
    /// Body font size in points.
    pub default_font_size: i64,
}

impl Default for SpecWorkbookStyle {
    fn default() -> Self {
        derive_default_workbook_style()
    }
}

/// Export options of [`crate::writer::WorkbookExporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbookOptions {
    /// Add a "Record Count" column to the index sheet.
    pub if_include_record_count: bool,
    /// Max data rows written per sheet; extra rows are dropped silently.
    pub records_per_table_max: usize,
    /// Column width ceiling.
    pub width_cell_max: f64,
    /// Worker threads used to plan data sheets; `None`/`1` plans serially.
    pub num_workers_max: Option<usize>,
}

impl Default for SpecWorkbookOptions {
    fn default() -> Self {
        Self {
            if_include_record_count: false,
            records_per_table_max: N_RECORDS_PER_TABLE_MAX,
            width_cell_max: N_WIDTH_CELL_MAX,
            num_workers_max: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetPlan

/// Intra-workbook link target plus display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHyperlink {
    /// Target sheet name.
    pub sheet_name: String,
    /// Target cell reference (A1 notation).
    pub cell_ref: String,
    /// Displayed text.
    pub text: String,
}

/// One planned cell. The variant doubles as the style directive.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSheetCell {
    /// Nothing is written.
    Blank,
    /// Integer written as an Excel number.
    Integer(i64),
    /// Finite float written as an Excel number.
    Number(f64),
    /// Excel boolean.
    Boolean(bool),
    /// Plain text.
    Text(String),
    /// Excel date with date number format.
    Date(NaiveDate),
    /// Excel date-time with timestamp number format.
    DateTime(NaiveDateTime),
    /// Header text with header format.
    Header(String),
    /// Internal hyperlink with link format.
    Link(SpecHyperlink),
}

/// Inclusive zero-based cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// First row.
    pub row_first: usize,
    /// First column.
    pub col_first: usize,
    /// Last row (inclusive).
    pub row_last: usize,
    /// Last column (inclusive).
    pub col_last: usize,
}

/// Immutable layout of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetPlan {
    /// Unique sheet name in the workbook.
    pub sheet_name: String,
    /// Source table name; `None` for the index sheet.
    pub table_name: Option<String>,
    /// Cell grid, row-major; row 0 is the header row.
    pub rows: Vec<Vec<EnumSheetCell>>,
    /// Width per column.
    pub widths: Vec<f64>,
    /// Number of frozen top rows (0 = none).
    pub rows_frozen: usize,
    /// Auto-filter range over the used cells, if any.
    pub autofilter: Option<SpecCellRange>,
    /// Records in the source table (pre-truncation).
    pub records_total: usize,
    /// Records written to the sheet.
    pub records_written: usize,
    /// Number of data columns written (excluding the return-link column).
    pub columns_written: usize,
    /// Values degraded to text or truncated during coercion.
    pub cnt_degraded: u64,
}

impl SpecSheetPlan {
    /// All hyperlinks of the sheet with their `(row, col)` position.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize, &SpecHyperlink)> + '_ {
        self.rows.iter().enumerate().flat_map(|(n_idx_row, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(n_idx_col, cell)| match cell {
                    EnumSheetCell::Link(link) => Some((n_idx_row, n_idx_col, link)),
                    _ => None,
                })
        })
    }

    /// Cell at `(row, col)`, if planned.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&EnumSheetCell> {
        self.rows.get(row_idx).and_then(|row| row.get(col_idx))
    }
}

/// Immutable layout of the whole workbook; index sheet first.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbookPlan {
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSheetPlan>,
    /// Non-fatal warnings produced while planning.
    pub warnings: Vec<String>,
}

impl SpecWorkbookPlan {
    /// Look up a sheet by exact name.
    pub fn sheet(&self, sheet_name: &str) -> Option<&SpecSheetPlan> {
        self.sheets.iter().find(|plan| plan.sheet_name == sheet_name)
    }

    /// Summarize the plan into a report (without output path).
    pub fn report(&self) -> ReportWorkbook {
        ReportWorkbook {
            path_file: None,
            sheets: self
                .sheets
                .iter()
                .filter_map(|plan| {
                    plan.table_name.as_ref().map(|table_name| SpecSheetReport {
                        table_name: table_name.clone(),
                        sheet_name: plan.sheet_name.clone(),
                        records_total: plan.records_total,
                        records_written: plan.records_written,
                        columns_written: plan.columns_written,
                    })
                })
                .collect(),
            cnt_degraded: self.sheets.iter().map(|plan| plan.cnt_degraded).sum(),
            warnings: self.warnings.clone(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-table outcome of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Source table name.
    pub table_name: String,
    /// Sheet name after sanitization.
    pub sheet_name: String,
    /// Records in the source table.
    pub records_total: usize,
    /// Records written to the sheet.
    pub records_written: usize,
    /// Data columns written.
    pub columns_written: usize,
}

/// Outcome of one `build` call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportWorkbook {
    /// Saved workbook path.
    pub path_file: Option<PathBuf>,
    /// Data sheets in workbook order.
    pub sheets: Vec<SpecSheetReport>,
    /// Values degraded during coercion.
    pub cnt_degraded: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportWorkbook {
    /// Number of data rows written across all sheets.
    pub fn records_written(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.records_written).sum()
    }

    /// Number of tables whose sheet was truncated by the row cap.
    pub fn cnt_truncated(&self) -> usize {
        self.sheets
            .iter()
            .filter(|sheet| sheet.records_written < sheet.records_total)
            .count()
    }
}

impl fmt::Display for ReportWorkbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_path = self
            .path_file
            .as_ref()
            .map_or_else(|| "-".to_string(), |path| path.display().to_string());
        write!(
            f,
            "[XLSX] file={c_path} sheets={} rows={} truncated={} degraded={} warnings={}",
            self.sheets.len(),
            self.records_written(),
            self.cnt_truncated(),
            self.cnt_degraded,
            self.warnings.len()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal failures of a workbook export.
#[derive(Debug, Error)]
pub enum XlsxExportError {
    /// Output directory or temporary file could not be created/written.
    #[error("I/O failure at {}: {source}", .path.display())]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Finished temporary file could not be moved into place.
    #[error("Failed to move workbook into place at {}: {source}", .path.display())]
    Persist {
        /// Final workbook path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Workbook serialization failed.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Options rejected before any output is produced.
    #[error("Invalid workbook options: {0}")]
    InvalidOptions(String),
}

/// Result alias for workbook exports.
pub type Result<T> = std::result::Result<T, XlsxExportError>;

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_workbook_format_counts_truncation() {
        let report = ReportWorkbook {
            path_file: Some(PathBuf::from("out/db/db.xlsx")),
            sheets: vec![
                SpecSheetReport {
                    table_name: "a".to_string(),
                    sheet_name: "a".to_string(),
                    records_total: 10,
                    records_written: 5,
                    columns_written: 2,
                },
                SpecSheetReport {
                    table_name: "b".to_string(),
                    sheet_name: "b".to_string(),
                    records_total: 3,
                    records_written: 3,
                    columns_written: 1,
                },
            ],
            cnt_degraded: 1,
            warnings: vec![],
        };

        assert_eq!(
            report.to_string(),
            "[XLSX] file=out/db/db.xlsx sheets=2 rows=8 truncated=1 degraded=1 warnings=0"
        );
    }

    #[test]
    fn cell_format_merge_prefers_right_side() {
        let fmt_base = SpecCellFormat {
            font_size: Some(11),
            bold: Some(false),
            ..Default::default()
        };
        let fmt_merged = fmt_base.with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        });

        assert_eq!(fmt_merged.font_size, Some(11));
        assert_eq!(fmt_merged.bold, Some(true));
    }
}
