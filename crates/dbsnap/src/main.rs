//! `dbsnap`: export the schema and/or rows of a desktop database as one CSV
//! file per table plus a workbook with an index sheet linking every table.
//!
//! All settings can come from `DBSNAP_*` environment variables or a `.env` file.

mod cli;
mod export;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, derive_env_file_candidates, load_env_file};
use crate::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let path_env = load_env_file(&derive_env_file_candidates());
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;
    if let Some(path) = path_env {
        debug!(path = %path.display(), "loaded environment file");
    }

    export::run(&cli).await
}
