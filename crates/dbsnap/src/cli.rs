//! Command-line and environment configuration.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use dbsnap_io_csv::{CsvExportError, SpecCsvOptions, parse_delimiter};
use dbsnap_io_xlsx::SpecWorkbookOptions;
use dbsnap_io_xlsx::conf::{N_RECORDS_PER_TABLE_MAX, N_WIDTH_CELL_MAX};

/// Which tables to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnumExportContent {
    /// One table per source table, one record per column.
    Schema,
    /// Raw table rows.
    Data,
    /// Schema under `<db>`, rows under `<db>_data`.
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "dbsnap")]
#[command(version)]
#[command(about = "Snapshot a desktop database into CSV files and a navigable XLSX workbook")]
pub struct Cli {
    /// Database file or `sqlite:` URL
    #[arg(long, env = "DBSNAP_DB_PATH")]
    pub db_path: String,

    /// CSV output root; CSV export is skipped when unset
    #[arg(long, env = "DBSNAP_CSV_DIR")]
    pub csv_dir: Option<PathBuf>,

    /// Workbook output root; defaults to the CSV output root
    #[arg(long, env = "DBSNAP_XLSX_DIR")]
    pub xlsx_dir: Option<PathBuf>,

    /// Exported content
    #[arg(long, value_enum, env = "DBSNAP_CONTENT", default_value_t = EnumExportContent::Schema)]
    pub content: EnumExportContent,

    /// CSV field delimiter (single ASCII character, `\t` for tab)
    #[arg(long, env = "DBSNAP_CSV_DELIMITER", default_value = ",")]
    pub delimiter: String,

    /// Rows written per workbook sheet
    #[arg(long, env = "DBSNAP_MAX_RECORDS", default_value_t = N_RECORDS_PER_TABLE_MAX)]
    pub max_records_per_table: usize,

    /// Add a record-count column to the index sheet
    #[arg(long, env = "DBSNAP_INCLUDE_RECORD_COUNT")]
    pub include_record_count: bool,

    /// Column width ceiling
    #[arg(long, default_value_t = N_WIDTH_CELL_MAX)]
    pub width_max: f64,

    /// Worker threads for sheet planning (serial when unset)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// `.env` locations tried in order: the working directory, then next to the executable.
pub fn derive_env_file_candidates() -> Vec<PathBuf> {
    let mut l_candidates = vec![PathBuf::from(".env")];
    if let Ok(path_exe) = std::env::current_exe()
        && let Some(dir_exe) = path_exe.parent()
    {
        l_candidates.push(dir_exe.join(".env"));
    }
    l_candidates
}

/// Load the first readable `.env` file into the process environment so its
/// `DBSNAP_*` values reach the `env` fallbacks of [`Cli`]. Variables already
/// set are not overridden.
pub fn load_env_file(l_candidates: &[PathBuf]) -> Option<PathBuf> {
    l_candidates
        .iter()
        .find(|path| dotenvy::from_path(path).is_ok())
        .cloned()
}

impl Cli {
    pub fn dir_csv(&self) -> Option<&Path> {
        self.csv_dir.as_deref()
    }

    /// Workbook root, falling back to the CSV root.
    pub fn dir_xlsx(&self) -> Option<&Path> {
        self.xlsx_dir.as_deref().or_else(|| self.dir_csv())
    }

    pub fn workbook_options(&self) -> SpecWorkbookOptions {
        SpecWorkbookOptions {
            if_include_record_count: self.include_record_count,
            records_per_table_max: self.max_records_per_table,
            width_cell_max: self.width_max,
            num_workers_max: self.workers,
        }
    }

    pub fn csv_options(&self) -> Result<SpecCsvOptions, CsvExportError> {
        Ok(SpecCsvOptions {
            delimiter: parse_delimiter(&self.delimiter)?,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_xlsx_dir_to_csv_dir() {
        let cli = Cli::try_parse_from(["dbsnap", "--db-path", "a.db", "--csv-dir", "out"])
            .expect("parse");

        assert_eq!(cli.dir_xlsx(), Some(Path::new("out")));
        assert_eq!(cli.content, EnumExportContent::Schema);
        assert_eq!(cli.workbook_options(), SpecWorkbookOptions::default());
        assert_eq!(cli.csv_options().expect("csv").delimiter, b',');
    }

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "dbsnap",
            "--db-path",
            "a.db",
            "--xlsx-dir",
            "book",
            "--content",
            "both",
            "--delimiter",
            "|",
            "--max-records-per-table",
            "10",
            "--include-record-count",
            "--workers",
            "2",
            "-vv",
        ])
        .expect("parse");

        assert_eq!(cli.dir_csv(), None);
        assert_eq!(cli.dir_xlsx(), Some(Path::new("book")));
        assert_eq!(cli.content, EnumExportContent::Both);
        assert_eq!(cli.verbose, 2);

        let options = cli.workbook_options();
        assert_eq!(options.records_per_table_max, 10);
        assert!(options.if_include_record_count);
        assert_eq!(options.num_workers_max, Some(2));
        assert_eq!(cli.csv_options().expect("csv").delimiter, b'|');
    }

    #[test]
    fn load_env_file_feeds_cli_env_fallbacks() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_env = dir_tmp.path().join(".env");
        std::fs::write(&path_env, "DBSNAP_DB_PATH=/data/from_env_file.db\n").expect("write");

        let l_candidates = vec![dir_tmp.path().join("missing").join(".env"), path_env.clone()];
        assert_eq!(load_env_file(&l_candidates), Some(path_env));

        let cli = Cli::try_parse_from(["dbsnap", "--csv-dir", "out"]).expect("parse");
        assert_eq!(cli.db_path, "/data/from_env_file.db");
    }

    #[test]
    fn load_env_file_without_candidates_loads_nothing() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_env_file(&[dir_tmp.path().join(".env")]), None);
    }

    #[test]
    fn cli_rejects_multi_char_delimiter() {
        let cli = Cli::try_parse_from(["dbsnap", "--db-path", "a.db", "--delimiter", ";;"])
            .expect("parse");
        assert!(cli.csv_options().is_err());
    }
}
