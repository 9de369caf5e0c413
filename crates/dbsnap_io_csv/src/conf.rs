//! CSV defaults.

/// Default field delimiter.
pub const N_DELIMITER_DEFAULT: u8 = b',';
/// Extension of every written file.
pub const C_EXT_CSV: &str = "csv";
/// Characters replaced in table names before they become file names
/// (path separators plus the characters Windows refuses in file names).
pub const TUP_FILE_NAME_ILLEGAL: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
