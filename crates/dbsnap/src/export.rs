//! Export orchestration: source -> tables -> CSV files and workbook.

use anyhow::{Context, Result, bail};
use dbsnap_io::{SpecExportTarget, SpecTables};
use dbsnap_io_csv::write_tables_csv;
use dbsnap_io_xlsx::{SpecWorkbookStyle, WorkbookExporter};
use dbsnap_source::{SqliteSource, TableSource};
use tracing::info;

use crate::cli::{Cli, EnumExportContent};

/// Suffix of the base name used for raw rows when schema and rows are both exported.
const C_SUFFIX_DATA: &str = "_data";

/// Named table sets to export, each under its own base name.
pub async fn collect_export_sets<S>(
    source: &S,
    content: EnumExportContent,
) -> Result<Vec<(String, SpecTables)>>
where
    S: TableSource + ?Sized,
{
    let c_db_name = source.database_name().to_string();
    let l_sets = match content {
        EnumExportContent::Schema => {
            vec![(c_db_name, source.fetch_schema().await.context("Failed to read schema")?)]
        }
        EnumExportContent::Data => {
            vec![(c_db_name, source.fetch_data().await.context("Failed to read table data")?)]
        }
        EnumExportContent::Both => {
            let tables_schema = source.fetch_schema().await.context("Failed to read schema")?;
            let tables_data = source
                .fetch_data()
                .await
                .context("Failed to read table data")?;
            vec![
                (c_db_name.clone(), tables_schema),
                (format!("{c_db_name}{C_SUFFIX_DATA}"), tables_data),
            ]
        }
    };
    Ok(l_sets)
}

/// Run one export. Configuration is validated before the database is opened,
/// and every table is read before the first file is written.
pub async fn run(cli: &Cli) -> Result<()> {
    let dir_csv = cli.dir_csv();
    let dir_xlsx = cli.dir_xlsx();
    if dir_csv.is_none() && dir_xlsx.is_none() {
        bail!("No output directory configured; set DBSNAP_CSV_DIR or DBSNAP_XLSX_DIR");
    }

    let csv_options = cli.csv_options().context("Invalid CSV options")?;
    let exporter = WorkbookExporter::new(cli.workbook_options(), SpecWorkbookStyle::default())
        .context("Invalid workbook options")?;

    let source = SqliteSource::connect(&cli.db_path)
        .await
        .with_context(|| format!("Failed to open database '{}'", cli.db_path))?;
    let l_sets = collect_export_sets(&source, cli.content).await?;
    source.close().await;

    for (c_base_name, tables) in &l_sets {
        info!(name = %c_base_name, tables = tables.len(), "exporting");

        if let Some(dir) = dir_csv {
            let target = SpecExportTarget::new(dir, c_base_name);
            let report = write_tables_csv(tables, &target, &csv_options)
                .with_context(|| format!("Failed to write CSV files for '{c_base_name}'"))?;
            info!("{report}");
        }

        if let Some(dir) = dir_xlsx {
            let report = exporter
                .build(tables, &SpecExportTarget::new(dir, c_base_name))
                .with_context(|| format!("Failed to write workbook for '{c_base_name}'"))?;
            info!("{report}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use super::*;

    async fn create_database(path_db: &Path) {
        let options = SqliteConnectOptions::new()
            .filename(path_db)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("create db");
        for c_sql in [
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            "CREATE TABLE \"Order/Detail\" (sku TEXT, qty INTEGER)",
            "INSERT INTO customers (name) VALUES ('Alice'), ('Bob')",
        ] {
            sqlx::query(c_sql).execute(&pool).await.expect("setup sql");
        }
        pool.close().await;
    }

    fn parse_cli(l_args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dbsnap").chain(l_args.iter().copied()))
            .expect("parse")
    }

    #[tokio::test]
    async fn run_both_writes_schema_and_data_artifacts() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_db = dir_tmp.path().join("shop.db");
        create_database(&path_db).await;
        let dir_out = dir_tmp.path().join("out");

        let cli = parse_cli(&[
            "--db-path",
            path_db.to_str().expect("utf8 path"),
            "--csv-dir",
            dir_out.to_str().expect("utf8 path"),
            "--content",
            "both",
        ]);
        run(&cli).await.expect("run");

        assert!(dir_out.join("shop").join("shop.xlsx").is_file());
        assert!(dir_out.join("shop").join("customers.csv").is_file());
        assert!(dir_out.join("shop").join("Order_Detail.csv").is_file());
        assert!(dir_out.join("shop_data").join("shop_data.xlsx").is_file());

        let c_customers = std::fs::read_to_string(dir_out.join("shop_data").join("customers.csv"))
            .expect("read");
        assert_eq!(c_customers, "id,name\n1,Alice\n2,Bob\n");
    }

    #[tokio::test]
    async fn run_without_output_dir_fails_before_connecting() {
        let cli = parse_cli(&["--db-path", "/nonexistent/shop.db"]);
        let err = run(&cli).await.expect_err("must fail");
        assert!(err.to_string().contains("No output directory"));
    }

    #[tokio::test]
    async fn run_missing_database_writes_nothing() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let dir_out = dir_tmp.path().join("out");
        let path_db = dir_tmp.path().join("missing.db");

        let cli = parse_cli(&[
            "--db-path",
            path_db.to_str().expect("utf8 path"),
            "--xlsx-dir",
            dir_out.to_str().expect("utf8 path"),
        ]);
        let err = run(&cli).await.expect_err("must fail");

        assert!(format!("{err:#}").contains("Failed to open database"));
        assert!(!dir_out.exists());
    }
}
