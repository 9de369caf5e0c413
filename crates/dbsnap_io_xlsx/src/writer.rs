//! Workbook exporter: plan, serialize with `rust_xlsxwriter`, save atomically.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dbsnap_io::{SpecExportTarget, SpecTables};
use rust_xlsxwriter::{Format, FormatUnderline, Url, Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::conf::{EnumFmtKey, derive_default_workbook_options, derive_xlsx_formats};
use crate::plan::plan_workbook;
use crate::spec::{
    EnumSheetCell, ReportWorkbook, Result, SpecCellFormat, SpecSheetPlan, SpecWorkbookOptions,
    SpecWorkbookPlan, SpecWorkbookStyle, XlsxExportError,
};
use crate::util::derive_internal_link;

/// Stateless workbook exporter bound to one options/style preset.
///
/// Each [`Self::build`] call owns its workbook exclusively; nothing is shared across calls.
#[derive(Debug, Clone)]
pub struct WorkbookExporter {
    options: SpecWorkbookOptions,
    style: SpecWorkbookStyle,
    dict_fmt: BTreeMap<EnumFmtKey, SpecCellFormat>,
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        let style = SpecWorkbookStyle::default();
        Self {
            options: derive_default_workbook_options(),
            dict_fmt: derive_xlsx_formats(&style),
            style,
        }
    }
}

impl WorkbookExporter {
    /// Create an exporter after validating `options`.
    pub fn new(options: SpecWorkbookOptions, style: SpecWorkbookStyle) -> Result<Self> {
        validate_workbook_options(&options)?;
        Ok(Self {
            dict_fmt: derive_xlsx_formats(&style),
            options,
            style,
        })
    }

    pub fn options(&self) -> &SpecWorkbookOptions {
        &self.options
    }

    pub fn style(&self) -> &SpecWorkbookStyle {
        &self.style
    }

    /// Build the immutable workbook layout without touching the file system.
    pub fn plan(&self, tables: &SpecTables) -> SpecWorkbookPlan {
        plan_workbook(tables, &self.options)
    }

    /// Write `<dir_export>/<db_name>.xlsx` for `tables`, replacing any existing file.
    ///
    /// The workbook is serialized in memory, written to a temporary file next to
    /// the target and renamed into place, so a failed call leaves no partial file.
    pub fn build(&self, tables: &SpecTables, target: &SpecExportTarget) -> Result<ReportWorkbook> {
        let plan = self.plan(tables);
        let mut workbook = self.serialize_workbook(&plan)?;
        let buf_workbook = workbook.save_to_buffer()?;

        let dir_export = target.dir_export();
        let path_file = dir_export.join(format!("{}.xlsx", target.db_name));
        fs::create_dir_all(&dir_export).map_err(|source| XlsxExportError::Io {
            path: dir_export.clone(),
            source,
        })?;
        write_file_atomic(&dir_export, &path_file, &buf_workbook)?;

        let mut report = plan.report();
        info!(
            path = %path_file.display(),
            sheets = report.sheets.len(),
            degraded = report.cnt_degraded,
            "workbook written"
        );
        report.path_file = Some(path_file);
        Ok(report)
    }

    fn format_of(&self, key: EnumFmtKey) -> Format {
        self.dict_fmt
            .get(&key)
            .map_or_else(Format::new, derive_rust_xlsx_format)
    }

    fn serialize_workbook(&self, plan: &SpecWorkbookPlan) -> Result<Workbook> {
        let formats = SpecSheetFormats {
            fmt_text: self.format_of(EnumFmtKey::Text),
            fmt_header: self.format_of(EnumFmtKey::Header),
            fmt_date: self.format_of(EnumFmtKey::Date),
            fmt_datetime: self.format_of(EnumFmtKey::DateTime),
            fmt_link: self.format_of(EnumFmtKey::Link),
        };

        let mut workbook = Workbook::new();
        for sheet_plan in &plan.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet_plan.sheet_name)?;
            write_sheet(worksheet, sheet_plan, &formats)?;
            debug!(sheet = %sheet_plan.sheet_name, rows = sheet_plan.rows.len(), "sheet serialized");
        }
        Ok(workbook)
    }
}

fn validate_workbook_options(options: &SpecWorkbookOptions) -> Result<()> {
    if !options.width_cell_max.is_finite() || options.width_cell_max < 1.0 {
        return Err(XlsxExportError::InvalidOptions(format!(
            "width_cell_max must be a finite number >= 1, got {}.",
            options.width_cell_max
        )));
    }
    Ok(())
}

fn write_file_atomic(dir: &Path, path_file: &Path, buf: &[u8]) -> Result<()> {
    let derive_io_error =
        |path: PathBuf| move |source: std::io::Error| XlsxExportError::Io { path, source };

    let mut file_tmp = tempfile::Builder::new()
        .prefix(".dbsnap-")
        .suffix(".xlsx.tmp")
        .tempfile_in(dir)
        .map_err(derive_io_error(dir.to_path_buf()))?;
    file_tmp
        .write_all(buf)
        .and_then(|()| file_tmp.as_file().sync_all())
        .map_err(derive_io_error(file_tmp.path().to_path_buf()))?;
    file_tmp
        .persist(path_file)
        .map_err(|err| XlsxExportError::Persist {
            path: path_file.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// #region SheetSerialization

struct SpecSheetFormats {
    fmt_text: Format,
    fmt_header: Format,
    fmt_date: Format,
    fmt_datetime: Format,
    fmt_link: Format,
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet_plan: &SpecSheetPlan,
    formats: &SpecSheetFormats,
) -> Result<()> {
    for (n_idx_row, row) in sheet_plan.rows.iter().enumerate() {
        for (n_idx_col, cell) in row.iter().enumerate() {
            write_cell_with_format(worksheet, n_idx_row, n_idx_col, cell, formats)?;
        }
    }

    for (n_idx_col, n_width) in sheet_plan.widths.iter().enumerate() {
        worksheet.set_column_width(cast_col_num(n_idx_col)?, *n_width)?;
    }

    if sheet_plan.rows_frozen > 0 {
        worksheet.set_freeze_panes(cast_row_num(sheet_plan.rows_frozen)?, 0)?;
    }

    if let Some(range) = sheet_plan.autofilter {
        worksheet.autofilter(
            cast_row_num(range.row_first)?,
            cast_col_num(range.col_first)?,
            cast_row_num(range.row_last)?,
            cast_col_num(range.col_last)?,
        )?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    cell: &EnumSheetCell,
    formats: &SpecSheetFormats,
) -> Result<()> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;

    match cell {
        EnumSheetCell::Blank => {}
        EnumSheetCell::Integer(val) => {
            // Coercion keeps |val| <= 2^53, so the conversion is exact.
            worksheet.write_number_with_format(n_row, n_col, *val as f64, &formats.fmt_text)?;
        }
        EnumSheetCell::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, &formats.fmt_text)?;
        }
        EnumSheetCell::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, &formats.fmt_text)?;
        }
        EnumSheetCell::Text(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, &formats.fmt_text)?;
        }
        EnumSheetCell::Date(val) => {
            worksheet.write_datetime_with_format(n_row, n_col, val, &formats.fmt_date)?;
        }
        EnumSheetCell::DateTime(val) => {
            worksheet.write_datetime_with_format(n_row, n_col, val, &formats.fmt_datetime)?;
        }
        EnumSheetCell::Header(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, &formats.fmt_header)?;
        }
        EnumSheetCell::Link(link) => {
            let url = Url::new(derive_internal_link(&link.sheet_name, &link.cell_ref))
                .set_text(link.text.as_str());
            worksheet.write_url_with_format(n_row, n_col, url, &formats.fmt_link)?;
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatTranslation

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.underline.unwrap_or(false) {
        format = format.set_underline(FormatUnderline::Single);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    format
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| XlsxError::RowColumnLimitError.into())
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| XlsxError::RowColumnLimitError.into())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
