//! Per-table CSV writer.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use dbsnap_io::{SpecExportTarget, SpecTable, SpecTables};
use tracing::{debug, info};

use crate::conf::C_EXT_CSV;
use crate::spec::{CsvExportError, ReportCsv, Result, SpecCsvFileReport, SpecCsvOptions};
use crate::util::derive_unique_file_stem;

/// Write every table to `<dir_export>/<table>.csv`, overwriting existing files.
///
/// Files are written in table order; the first failure aborts the remaining tables.
pub fn write_tables_csv(
    tables: &SpecTables,
    target: &SpecExportTarget,
    options: &SpecCsvOptions,
) -> Result<ReportCsv> {
    let dir_export = target.dir_export();
    fs::create_dir_all(&dir_export).map_err(|source| CsvExportError::Io {
        path: dir_export.clone(),
        source,
    })?;

    let mut set_stems_taken = HashSet::new();
    let mut l_files = Vec::with_capacity(tables.len());
    for (table_name, table) in tables {
        let c_stem = derive_unique_file_stem(table_name, &mut set_stems_taken);
        let path_file = dir_export.join(format!("{c_stem}.{C_EXT_CSV}"));
        write_table_csv(table, &path_file, options)?;

        debug!(table = %table_name, path = %path_file.display(), rows = table.len(), "csv written");
        l_files.push(SpecCsvFileReport {
            table_name: table_name.clone(),
            path_file,
            records_written: table.len(),
        });
    }

    let report = ReportCsv {
        dir_export,
        files: l_files,
    };
    info!(
        dir = %report.dir_export.display(),
        files = report.files.len(),
        "csv export finished"
    );
    Ok(report)
}

fn write_table_csv(table: &SpecTable, path_file: &Path, options: &SpecCsvOptions) -> Result<()> {
    let derive_csv_error = |source: csv::Error| CsvExportError::Csv {
        path: path_file.to_path_buf(),
        source,
    };

    let mut wtr = WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(options.terminator.to_csv_terminator())
        .from_path(path_file)
        .map_err(derive_csv_error)?;

    wtr.write_record(&table.columns).map_err(derive_csv_error)?;
    for n_idx_row in 0..table.len() {
        wtr.write_record(table.row_values(n_idx_row).map(|value| value.to_text()))
            .map_err(derive_csv_error)?;
    }
    wtr.flush().map_err(|source| CsvExportError::Io {
        path: path_file.to_path_buf(),
        source,
    })?;
    Ok(())
}
