//! Stateless helpers shared by the exporters.

use std::path::{Path, PathBuf};

/// Render a float the way a spreadsheet user expects to read it.
///
/// Integral values keep a trailing `.0`; non-finite values use `NaN`/`Inf`/`-Inf`.
pub fn derive_float_text(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x.is_sign_positive() { "Inf" } else { "-Inf" }.to_string();
    }
    format!("{x:?}")
}

/// Resolve `<dir_output>/<db_name>`, unless `dir_output` already ends with `db_name`.
pub fn derive_export_dir(dir_output: &Path, db_name: &str) -> PathBuf {
    if dir_output
        .file_name()
        .is_some_and(|c_name| c_name == db_name)
    {
        return dir_output.to_path_buf();
    }
    dir_output.join(db_name)
}
