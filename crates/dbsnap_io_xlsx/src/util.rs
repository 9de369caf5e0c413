//! Stateless helper utilities used by the workbook planner.

use std::collections::HashSet;

use chrono::Datelike;
use dbsnap_io::{EnumCellValue, derive_float_text};

use crate::conf::{
    N_INT_EXACT_MAX, N_LEN_EXCEL_CELL_TEXT_MAX, N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_CELL_PADDING,
    N_WIDTH_HEADER_WEIGHT, N_YEAR_EXCEL_MAX, N_YEAR_EXCEL_MIN, TUP_EXCEL_ILLEGAL,
};
use crate::spec::EnumSheetCell;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Coerce a provider value into a writable cell.
///
/// Returns the cell plus whether the value was degraded (written as text
/// instead of its native type, or truncated). Never fails.
pub fn coerce_cell_value(value: &EnumCellValue) -> (EnumSheetCell, bool) {
    match value {
        EnumCellValue::Null => (EnumSheetCell::Blank, false),
        EnumCellValue::Int(val) => {
            if val.unsigned_abs() > N_INT_EXACT_MAX {
                (EnumSheetCell::Text(val.to_string()), true)
            } else {
                (EnumSheetCell::Integer(*val), false)
            }
        }
        EnumCellValue::Float(val) => {
            if val.is_finite() {
                (EnumSheetCell::Number(*val), false)
            } else {
                (EnumSheetCell::Text(derive_float_text(*val)), true)
            }
        }
        EnumCellValue::Bool(val) => (EnumSheetCell::Boolean(*val), false),
        EnumCellValue::Date(val) => {
            if is_year_in_excel_range(val.year()) {
                (EnumSheetCell::Date(*val), false)
            } else {
                (EnumSheetCell::Text(value.to_text()), true)
            }
        }
        EnumCellValue::Timestamp(val) => {
            if is_year_in_excel_range(val.year()) {
                (EnumSheetCell::DateTime(*val), false)
            } else {
                (EnumSheetCell::Text(value.to_text()), true)
            }
        }
        EnumCellValue::Text(val) => match truncate_cell_text(val) {
            Some(c_truncated) => (EnumSheetCell::Text(c_truncated), true),
            None => (EnumSheetCell::Text(val.clone()), false),
        },
    }
}

fn is_year_in_excel_range(year: i32) -> bool {
    (N_YEAR_EXCEL_MIN..=N_YEAR_EXCEL_MAX).contains(&year)
}

/// Truncate text to the cell limit; `None` when it already fits.
fn truncate_cell_text(text: &str) -> Option<String> {
    // Byte length bounds char count, so short strings skip the scan.
    if text.len() <= N_LEN_EXCEL_CELL_TEXT_MAX {
        return None;
    }
    let (n_idx_byte, _) = text.char_indices().nth(N_LEN_EXCEL_CELL_TEXT_MAX)?;
    Some(text[..n_idx_byte].to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Character length of a cell's textual form. Blank cells measure 0.
pub fn derive_cell_text_width(cell: &EnumSheetCell) -> usize {
    match cell {
        EnumSheetCell::Blank => 0,
        EnumSheetCell::Integer(val) => val.to_string().len(),
        EnumSheetCell::Number(val) => derive_float_text(*val).len(),
        EnumSheetCell::Boolean(val) => {
            if *val {
                4
            } else {
                5
            }
        }
        EnumSheetCell::Text(val) | EnumSheetCell::Header(val) => val.chars().count(),
        EnumSheetCell::Date(val) => EnumCellValue::Date(*val).to_text().len(),
        EnumSheetCell::DateTime(val) => EnumCellValue::Timestamp(*val).to_text().len(),
        EnumSheetCell::Link(link) => link.text.chars().count(),
    }
}

/// Width = `min(max(len(header) * 1.5, n_width_data_max) + 2, width_cell_max)`.
pub fn calculate_column_width(header: &str, n_width_data_max: usize, width_cell_max: f64) -> f64 {
    let n_width_header = header.chars().count() as f64 * N_WIDTH_HEADER_WEIGHT;
    let n_width = n_width_header.max(n_width_data_max as f64) + N_WIDTH_CELL_PADDING;
    n_width.min(width_cell_max)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

fn is_sheet_name_edge_char(c: char) -> bool {
    c.is_whitespace() || c == '\''
}

/// Replace invalid chars and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }

    let c_name: String = c_name
        .trim_matches(is_sheet_name_edge_char)
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();
    let c_name = c_name.trim_end_matches(is_sheet_name_edge_char);
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.to_string()
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

/// Case-insensitive set of sheet names already taken in one workbook.
#[derive(Debug, Clone, Default)]
pub struct SpecSheetNameRegistry {
    set_names_lower: HashSet<String>,
}

impl SpecSheetNameRegistry {
    /// Create a registry with `names` already taken.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            set_names_lower: names.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Whether `sheet_name` is taken (case-insensitive).
    pub fn contains(&self, sheet_name: &str) -> bool {
        self.set_names_lower.contains(&sheet_name.to_lowercase())
    }

    /// Sanitize `name`, suffix it until unique, then reserve it.
    pub fn register(&mut self, name: &str) -> String {
        let c_base_name = sanitize_sheet_name(name, "_");
        let mut c_sheet_name = c_base_name.clone();
        let mut n_idx_suffix = 1;
        while self.contains(&c_sheet_name) {
            c_sheet_name = create_sheet_identifier(&c_base_name, n_idx_suffix);
            n_idx_suffix += 1;
        }
        self.set_names_lower.insert(c_sheet_name.to_lowercase());
        c_sheet_name
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LinksAndWorkers

/// Build an `internal:` hyperlink target (`internal:'<sheet>'!<cell>`).
pub fn derive_internal_link(sheet_name: &str, cell_ref: &str) -> String {
    format!("internal:'{}'!{cell_ref}", sheet_name.replace('\'', "''"))
}

/// Worker count for sheet planning: `None` plans serially, `Some(n)` is clamped to CPUs.
pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => 1,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::spec::SpecHyperlink;

    #[test]
    fn sanitize_sheet_name_replaces_illegal_and_truncates() {
        let c_name = sanitize_sheet_name("Order/Detail:2024", "_");
        assert_eq!(c_name, "Order_Detail_2024");

        let c_long = sanitize_sheet_name(&"x".repeat(40), "_");
        assert_eq!(c_long.chars().count(), N_LEN_EXCEL_SHEET_NAME_MAX);

        assert_eq!(sanitize_sheet_name("  'quoted'  ", "_"), "quoted");
        assert_eq!(sanitize_sheet_name(" ' ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name("[a]*?", "_"), "_a___");
    }

    #[test]
    fn create_sheet_identifier_keeps_length_cap() {
        let c_name = create_sheet_identifier(&"y".repeat(31), 12);
        assert_eq!(c_name.chars().count(), N_LEN_EXCEL_SHEET_NAME_MAX);
        assert!(c_name.ends_with("_12"));
    }

    #[test]
    fn sheet_name_registry_suffixes_case_insensitively() {
        let mut registry = SpecSheetNameRegistry::new(["Tables", "History"]);

        assert_eq!(registry.register("Data"), "Data");
        assert_eq!(registry.register("data"), "data_1");
        assert_eq!(registry.register("Data"), "Data_2");
        assert_eq!(registry.register("tables"), "tables_1");
        assert_eq!(registry.register("HISTORY"), "HISTORY_1");
    }

    #[test]
    fn coerce_cell_value_keeps_native_types() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");

        assert_eq!(
            coerce_cell_value(&EnumCellValue::Int(7)),
            (EnumSheetCell::Integer(7), false)
        );
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Float(1.5)),
            (EnumSheetCell::Number(1.5), false)
        );
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Bool(true)),
            (EnumSheetCell::Boolean(true), false)
        );
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Date(date)),
            (EnumSheetCell::Date(date), false)
        );
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Null),
            (EnumSheetCell::Blank, false)
        );
    }

    #[test]
    fn coerce_cell_value_degrades_unrepresentable_values() {
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Float(f64::NAN)),
            (EnumSheetCell::Text("NaN".to_string()), true)
        );
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Float(f64::NEG_INFINITY)),
            (EnumSheetCell::Text("-Inf".to_string()), true)
        );
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Int(i64::MAX)),
            (EnumSheetCell::Text(i64::MAX.to_string()), true)
        );

        let date_old = NaiveDate::from_ymd_opt(1899, 12, 31).expect("date");
        assert_eq!(
            coerce_cell_value(&EnumCellValue::Date(date_old)),
            (EnumSheetCell::Text("1899-12-31".to_string()), true)
        );

        let (cell, if_degraded) =
            coerce_cell_value(&EnumCellValue::Text("é".repeat(N_LEN_EXCEL_CELL_TEXT_MAX + 5)));
        assert!(if_degraded);
        let EnumSheetCell::Text(c_text) = cell else {
            panic!("text expected");
        };
        assert_eq!(c_text.chars().count(), N_LEN_EXCEL_CELL_TEXT_MAX);
    }

    #[test]
    fn coerce_cell_value_text_is_idempotent() {
        let (cell, _) = coerce_cell_value(&EnumCellValue::Float(f64::INFINITY));
        let EnumSheetCell::Text(c_text) = cell else {
            panic!("text expected");
        };
        let (cell_again, if_degraded) = coerce_cell_value(&EnumCellValue::Text(c_text.clone()));
        assert_eq!(cell_again, EnumSheetCell::Text(c_text));
        assert!(!if_degraded);
    }

    #[test]
    fn calculate_column_width_weights_header_and_clamps() {
        assert_eq!(calculate_column_width("id", 1, 80.0), 5.0);
        assert_eq!(calculate_column_width("id", 10, 80.0), 12.0);
        assert_eq!(calculate_column_width("id", 500, 80.0), 80.0);
        assert_eq!(calculate_column_width("", 0, 80.0), 2.0);
    }

    #[test]
    fn derive_cell_text_width_measures_textual_form() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .expect("timestamp");

        assert_eq!(derive_cell_text_width(&EnumSheetCell::Blank), 0);
        assert_eq!(derive_cell_text_width(&EnumSheetCell::Integer(-120)), 4);
        assert_eq!(derive_cell_text_width(&EnumSheetCell::Number(2.0)), 3);
        assert_eq!(derive_cell_text_width(&EnumSheetCell::Boolean(false)), 5);
        assert_eq!(derive_cell_text_width(&EnumSheetCell::DateTime(timestamp)), 19);
        assert_eq!(
            derive_cell_text_width(&EnumSheetCell::Link(SpecHyperlink {
                sheet_name: "Users".to_string(),
                cell_ref: "A1".to_string(),
                text: "Users".to_string(),
            })),
            5
        );
    }

    #[test]
    fn derive_internal_link_doubles_apostrophes() {
        assert_eq!(derive_internal_link("Users", "A1"), "internal:'Users'!A1");
        assert_eq!(derive_internal_link("Bob's", "A1"), "internal:'Bob''s'!A1");
    }

    #[test]
    fn calculate_worker_limit_defaults_to_serial() {
        assert_eq!(calculate_worker_limit(None), 1);
        assert_eq!(calculate_worker_limit(Some(0)), 1);
        assert!(calculate_worker_limit(Some(usize::MAX)) >= 1);
    }
}
