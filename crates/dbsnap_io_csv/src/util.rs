//! File-name and option helpers.

use std::collections::HashSet;

use crate::conf::TUP_FILE_NAME_ILLEGAL;
use crate::spec::{CsvExportError, Result};

/// Replace path separators, reserved characters and control characters so a
/// table name is a single portable file-name component.
pub fn derive_file_safe_name(table_name: &str) -> String {
    let c_name: String = table_name
        .chars()
        .map(|c| {
            if TUP_FILE_NAME_ILLEGAL.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    match c_name.as_str() {
        "" | "." | ".." => "_".repeat(c_name.len().max(1)),
        _ => c_name,
    }
}

/// Allocate distinct file stems; later duplicates get `_1`, `_2`, ... suffixes.
///
/// Comparison is case-insensitive, since `Users.csv` and `users.csv` are the
/// same file on Windows and macOS.
pub(crate) fn derive_unique_file_stem(table_name: &str, set_taken: &mut HashSet<String>) -> String {
    let c_base = derive_file_safe_name(table_name);
    let mut c_stem = c_base.clone();
    let mut n_idx_suffix = 1;
    while set_taken.contains(&c_stem.to_lowercase()) {
        c_stem = format!("{c_base}_{n_idx_suffix}");
        n_idx_suffix += 1;
    }
    set_taken.insert(c_stem.to_lowercase());
    c_stem
}

/// Parse a one-character ASCII delimiter (`,`, `|`, `;`, `\t`, ...).
pub fn parse_delimiter(value: &str) -> Result<u8> {
    let c_value = if value == "\\t" { "\t" } else { value };
    match c_value.as_bytes() {
        [n_byte] if n_byte.is_ascii() && !matches!(n_byte, b'"' | b'\n' | b'\r') => Ok(*n_byte),
        _ => Err(CsvExportError::InvalidOptions(format!(
            "delimiter must be a single ASCII character other than quote or newline, got {value:?}."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_file_safe_name_replaces_separators() {
        assert_eq!(derive_file_safe_name("Order/Detail:2024"), "Order_Detail_2024");
        assert_eq!(derive_file_safe_name("a\\b\0c"), "a_b_c");
        assert_eq!(derive_file_safe_name("q?<x>|\"y\"*\t"), "q__x___y___");
        assert_eq!(derive_file_safe_name(".."), "__");
        assert_eq!(derive_file_safe_name(""), "_");
    }

    #[test]
    fn derive_unique_file_stem_suffixes_duplicates() {
        let mut set_taken = HashSet::new();
        assert_eq!(derive_unique_file_stem("a/b", &mut set_taken), "a_b");
        assert_eq!(derive_unique_file_stem("a_b", &mut set_taken), "a_b_1");
        assert_eq!(derive_unique_file_stem("a\\b", &mut set_taken), "a_b_2");
    }

    #[test]
    fn derive_unique_file_stem_ignores_case() {
        let mut set_taken = HashSet::new();
        assert_eq!(derive_unique_file_stem("Users", &mut set_taken), "Users");
        assert_eq!(derive_unique_file_stem("users", &mut set_taken), "users_1");
        assert_eq!(derive_unique_file_stem("USERS_1", &mut set_taken), "USERS_1_1");
    }

    #[test]
    fn parse_delimiter_accepts_single_ascii() {
        assert_eq!(parse_delimiter(",").expect("comma"), b',');
        assert_eq!(parse_delimiter("|").expect("pipe"), b'|');
        assert_eq!(parse_delimiter("\\t").expect("tab"), b'\t');
        assert!(parse_delimiter("||").is_err());
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter("§").is_err());
    }
}
