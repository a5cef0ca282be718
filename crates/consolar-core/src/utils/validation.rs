//! Input validation helpers.
//!
//! Each helper returns [`Error::Validation`] naming the offending field, so a
//! failed check surfaces with exit code 4 at the process boundary.
use std::path::{Path, PathBuf};

use crate::kernel::error::{Error, Result};

/// Returns `value` trimmed, or an error when nothing but whitespace is left.
pub fn validate_not_empty(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, value, "Cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Checks that `path` names an existing regular file.
pub fn validate_file_exists<P: AsRef<Path>>(path: P, field: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::validation(
            field,
            path.display(),
            "File does not exist",
        ));
    }
    Ok(path.to_path_buf())
}

pub fn validate_positive_int(value: i64, field: &str) -> Result<u64> {
    if value <= 0 {
        return Err(Error::validation(field, value, "Must be a positive integer"));
    }
    Ok(value as u64)
}
