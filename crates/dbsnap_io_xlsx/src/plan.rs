//! Pure workbook planning: sheet names, cell grids, widths and links.
//!
//! Nothing here touches the file system; [`crate::writer::WorkbookExporter`]
//! serializes the resulting [`SpecWorkbookPlan`] in a single pass.

use dbsnap_io::{SpecTable, SpecTables};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::conf::{
    C_CELL_REF_HOME, C_HEADER_INDEX_RECORD_COUNT, C_HEADER_INDEX_TABLE, C_SHEET_NAME_INDEX,
    C_TEXT_RETURN_LINK, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_SHEET_NAMES_RESERVED,
};
use crate::spec::{
    EnumSheetCell, SpecCellRange, SpecHyperlink, SpecSheetPlan, SpecWorkbookOptions,
    SpecWorkbookPlan,
};
use crate::util::{
    SpecSheetNameRegistry, calculate_column_width, calculate_worker_limit, coerce_cell_value,
    derive_cell_text_width,
};

#[derive(Debug, Clone)]
struct SpecSheetTask<'a> {
    table_name: &'a str,
    sheet_name: String,
    table: &'a SpecTable,
}

/// Plan the whole workbook: index sheet first, then one data sheet per table.
///
/// Sheet order follows `tables` iteration order. Options are assumed valid.
pub fn plan_workbook(tables: &SpecTables, options: &SpecWorkbookOptions) -> SpecWorkbookPlan {
    let mut l_warnings = Vec::new();
    let mut registry = SpecSheetNameRegistry::new(
        std::iter::once(C_SHEET_NAME_INDEX).chain(TUP_EXCEL_SHEET_NAMES_RESERVED),
    );

    let l_tasks: Vec<SpecSheetTask<'_>> = tables
        .iter()
        .map(|(table_name, table)| {
            let sheet_name = registry.register(table_name);
            if sheet_name != *table_name {
                let c_msg = format!("Table '{table_name}' written as sheet '{sheet_name}'.");
                warn!(table = %table_name, sheet = %sheet_name, "sheet name sanitized");
                l_warnings.push(c_msg);
            }
            SpecSheetTask {
                table_name,
                sheet_name,
                table,
            }
        })
        .collect();

    let sheet_index = plan_index_sheet(&l_tasks, options);
    let l_data_results = plan_data_sheets(l_tasks, options, &mut l_warnings);

    let mut l_sheets = Vec::with_capacity(l_data_results.len() + 1);
    l_sheets.push(sheet_index);
    for (sheet_plan, l_sheet_warnings) in l_data_results {
        l_warnings.extend(l_sheet_warnings);
        l_sheets.push(sheet_plan);
    }

    SpecWorkbookPlan {
        sheets: l_sheets,
        warnings: l_warnings,
    }
}

fn plan_data_sheets(
    l_tasks: Vec<SpecSheetTask<'_>>,
    options: &SpecWorkbookOptions,
    l_warnings: &mut Vec<String>,
) -> Vec<(SpecSheetPlan, Vec<String>)> {
    let n_workers_max = calculate_worker_limit(options.num_workers_max);
    if n_workers_max <= 1 || l_tasks.len() <= 1 {
        return l_tasks
            .into_iter()
            .map(|task| plan_data_sheet(&task, options))
            .collect();
    }

    let thread_pool = ThreadPoolBuilder::new().num_threads(n_workers_max).build();
    let Ok(thread_pool) = thread_pool else {
        l_warnings.push(format!(
            "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial planning."
        ));
        return l_tasks
            .into_iter()
            .map(|task| plan_data_sheet(&task, options))
            .collect();
    };

    debug!(workers = n_workers_max, sheets = l_tasks.len(), "planning sheets in parallel");
    thread_pool.install(|| {
        l_tasks
            .into_par_iter()
            .map(|task| plan_data_sheet(&task, options))
            .collect()
    })
}

fn derive_link_home(sheet_name: &str, text: &str) -> EnumSheetCell {
    EnumSheetCell::Link(SpecHyperlink {
        sheet_name: sheet_name.to_string(),
        cell_ref: C_CELL_REF_HOME.to_string(),
        text: text.to_string(),
    })
}

fn derive_count_cell(n_count: usize) -> EnumSheetCell {
    i64::try_from(n_count).map_or_else(
        |_| EnumSheetCell::Text(n_count.to_string()),
        EnumSheetCell::Integer,
    )
}

/// Measure each column of `rows` (header row included).
fn calculate_widths(
    l_headers: &[String],
    rows: &[Vec<EnumSheetCell>],
    width_cell_max: f64,
) -> Vec<f64> {
    l_headers
        .iter()
        .enumerate()
        .map(|(n_idx_col, c_header)| {
            let n_width_data_max = rows
                .iter()
                .skip(1)
                .filter_map(|row| row.get(n_idx_col))
                .map(derive_cell_text_width)
                .max()
                .unwrap_or(0);
            calculate_column_width(c_header, n_width_data_max, width_cell_max)
        })
        .collect()
}

fn plan_index_sheet(l_tasks: &[SpecSheetTask<'_>], options: &SpecWorkbookOptions) -> SpecSheetPlan {
    let mut l_headers = vec![C_HEADER_INDEX_TABLE.to_string()];
    if options.if_include_record_count {
        l_headers.push(C_HEADER_INDEX_RECORD_COUNT.to_string());
    }

    let mut rows = Vec::with_capacity(l_tasks.len() + 1);
    rows.push(
        l_headers
            .iter()
            .map(|c_header| EnumSheetCell::Header(c_header.clone()))
            .collect::<Vec<_>>(),
    );
    for task in l_tasks {
        let mut row = vec![derive_link_home(&task.sheet_name, &task.sheet_name)];
        if options.if_include_record_count {
            // Pre-truncation count.
            row.push(derive_count_cell(task.table.len()));
        }
        rows.push(row);
    }

    let widths = calculate_widths(&l_headers, &rows, options.width_cell_max);
    SpecSheetPlan {
        sheet_name: C_SHEET_NAME_INDEX.to_string(),
        table_name: None,
        autofilter: Some(SpecCellRange {
            row_first: 0,
            col_first: 0,
            row_last: l_tasks.len(),
            col_last: l_headers.len() - 1,
        }),
        rows,
        widths,
        rows_frozen: 0,
        records_total: l_tasks.len(),
        records_written: l_tasks.len(),
        columns_written: l_headers.len(),
        cnt_degraded: 0,
    }
}

fn plan_data_sheet(
    task: &SpecSheetTask<'_>,
    options: &SpecWorkbookOptions,
) -> (SpecSheetPlan, Vec<String>) {
    let mut l_warnings = Vec::new();
    let table = task.table;

    let n_cols_max = N_NCOLS_EXCEL_MAX - 1;
    let l_headers: Vec<String> = table.columns.iter().take(n_cols_max).cloned().collect();
    if table.columns.len() > n_cols_max {
        warn!(
            table = %task.table_name,
            columns = table.columns.len(),
            "column count exceeds sheet limit"
        );
        l_warnings.push(format!(
            "Table '{}' has {} columns; only the first {n_cols_max} were written.",
            task.table_name,
            table.columns.len()
        ));
    }

    let n_rows_max = usize::min(options.records_per_table_max, N_NROWS_EXCEL_MAX - 1);
    let n_rows_written = usize::min(table.len(), n_rows_max);
    if n_rows_written < table.len() {
        warn!(
            table = %task.table_name,
            records_total = table.len(),
            records_written = n_rows_written,
            "table truncated"
        );
    }

    let mut rows = Vec::with_capacity(n_rows_written + 1);
    let mut row_header: Vec<EnumSheetCell> = l_headers
        .iter()
        .map(|c_header| EnumSheetCell::Header(c_header.clone()))
        .collect();
    row_header.push(derive_link_home(C_SHEET_NAME_INDEX, C_TEXT_RETURN_LINK));
    rows.push(row_header);

    let mut cnt_degraded = 0_u64;
    for n_idx_row in 0..n_rows_written {
        let row: Vec<EnumSheetCell> = l_headers
            .iter()
            .map(|c_col| {
                let value = table.value(n_idx_row, c_col);
                let (cell, if_degraded) = coerce_cell_value(value);
                if if_degraded {
                    cnt_degraded += 1;
                    debug!(
                        table = %task.table_name,
                        column = %c_col,
                        row = n_idx_row,
                        "value degraded to text"
                    );
                }
                cell
            })
            .collect();
        rows.push(row);
    }

    let mut widths = calculate_widths(&l_headers, &rows, options.width_cell_max);
    widths.push(C_TEXT_RETURN_LINK.chars().count() as f64);

    // Full used range, return link column included.
    let autofilter = Some(SpecCellRange {
        row_first: 0,
        col_first: 0,
        row_last: n_rows_written,
        col_last: l_headers.len(),
    });

    debug!(
        table = %task.table_name,
        sheet = %task.sheet_name,
        rows = n_rows_written,
        columns = l_headers.len(),
        "planned data sheet"
    );

    let sheet_plan = SpecSheetPlan {
        sheet_name: task.sheet_name.clone(),
        table_name: Some(task.table_name.to_string()),
        columns_written: l_headers.len(),
        rows,
        widths,
        rows_frozen: 1,
        autofilter,
        records_total: table.len(),
        records_written: n_rows_written,
        cnt_degraded,
    };
    (sheet_plan, l_warnings)
}
