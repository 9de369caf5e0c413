//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{SpecCellFormat, SpecFontStyle, SpecWorkbookOptions, SpecWorkbookStyle};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel cell text maximum length.
pub const N_LEN_EXCEL_CELL_TEXT_MAX: usize = 32_767;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Sheet names Excel refuses regardless of content.
pub const TUP_EXCEL_SHEET_NAMES_RESERVED: [&str; 1] = ["History"];

/// Largest integer magnitude an Excel number stores without losing digits (2^53).
pub const N_INT_EXACT_MAX: u64 = 9_007_199_254_740_992;
/// First year of the Excel 1900 date system.
pub const N_YEAR_EXCEL_MIN: i32 = 1900;
/// Last year representable as an Excel date.
pub const N_YEAR_EXCEL_MAX: i32 = 9999;

/// Name of the navigation sheet.
pub const C_SHEET_NAME_INDEX: &str = "Tables";
/// Index sheet header for the table-name column.
pub const C_HEADER_INDEX_TABLE: &str = "Table";
/// Index sheet header for the optional record-count column.
pub const C_HEADER_INDEX_RECORD_COUNT: &str = "Record Count";
/// Label of the per-sheet link back to the index sheet.
pub const C_TEXT_RETURN_LINK: &str = "Return to Tables";
/// Cell every internal link points at.
pub const C_CELL_REF_HOME: &str = "A1";

/// Default per-table row cap.
pub const N_RECORDS_PER_TABLE_MAX: usize = 50_000;
/// Default column width ceiling.
pub const N_WIDTH_CELL_MAX: f64 = 80.0;
/// Padding added after width inference.
pub const N_WIDTH_CELL_PADDING: f64 = 2.0;
/// Header text weight (bold, larger font).
pub const N_WIDTH_HEADER_WEIGHT: f64 = 1.5;

/// Excel default body font size.
pub const N_FONT_SIZE_DEFAULT: i64 = 11;
/// Header background.
pub const C_COLOR_HEADER_FILL: &str = "#1F4E78";
/// Header font color.
pub const C_COLOR_HEADER_FONT: &str = "#FFFFFF";
/// Hyperlink font color.
pub const C_COLOR_LINK: &str = "#0563C1";
/// Number format for date cells.
pub const C_NUM_FORMAT_DATE: &str = "yyyy-mm-dd";
/// Number format for timestamp cells.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumFmtKey {
    /// Body text/number cell format.
    Text,
    /// Header cell format.
    Header,
    /// Date cell format.
    Date,
    /// Timestamp cell format.
    DateTime,
    /// Internal hyperlink format.
    Link,
}

/// Build the default workbook style: bold white header on a fixed accent fill.
pub fn derive_default_workbook_style() -> SpecWorkbookStyle {
    SpecWorkbookStyle {
        header_font: SpecFontStyle {
            name: None,
            size: N_FONT_SIZE_DEFAULT + 1,
            bold: true,
            color: C_COLOR_HEADER_FONT.to_string(),
        },
        header_fill: C_COLOR_HEADER_FILL.to_string(),
        link_color: C_COLOR_LINK.to_string(),
        default_font_size: N_FONT_SIZE_DEFAULT,
    }
}

/// Build default workbook options.
pub fn derive_default_workbook_options() -> SpecWorkbookOptions {
    SpecWorkbookOptions::default()
}

/// Build named format presets used by [`crate::writer::WorkbookExporter`].
pub fn derive_xlsx_formats(style: &SpecWorkbookStyle) -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_size: Some(style.default_font_size),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text, cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Header,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            font_name: style.header_font.name.clone(),
            font_size: Some(style.header_font.size),
            bold: Some(style.header_font.bold),
            font_color: Some(style.header_font.color.clone()),
            bg_color: Some(style.header_fill.clone()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Date,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATE.to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::DateTime,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATETIME.to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Link,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            underline: Some(true),
            font_color: Some(style.link_color.clone()),
            ..Default::default()
        }),
    );

    dict_fmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_format_carries_style_fields() {
        let style = derive_default_workbook_style();
        let dict_fmt = derive_xlsx_formats(&style);

        let fmt_header = &dict_fmt[&EnumFmtKey::Header];
        assert_eq!(fmt_header.bold, Some(true));
        assert_eq!(fmt_header.font_size, Some(N_FONT_SIZE_DEFAULT + 1));
        assert_eq!(fmt_header.font_color.as_deref(), Some(C_COLOR_HEADER_FONT));
        assert_eq!(fmt_header.bg_color.as_deref(), Some(C_COLOR_HEADER_FILL));

        let fmt_link = &dict_fmt[&EnumFmtKey::Link];
        assert_eq!(fmt_link.underline, Some(true));
        assert_eq!(fmt_link.font_color.as_deref(), Some(C_COLOR_LINK));
        assert_eq!(fmt_link.font_size, Some(N_FONT_SIZE_DEFAULT));
    }

    #[test]
    fn custom_link_color_flows_into_link_format() {
        let style = SpecWorkbookStyle {
            link_color: "#FF0000".to_string(),
            ..derive_default_workbook_style()
        };
        let dict_fmt = derive_xlsx_formats(&style);
        assert_eq!(
            dict_fmt[&EnumFmtKey::Link].font_color.as_deref(),
            Some("#FF0000")
        );
        assert_eq!(
            dict_fmt[&EnumFmtKey::Date].num_format.as_deref(),
            Some(C_NUM_FORMAT_DATE)
        );
    }
}
