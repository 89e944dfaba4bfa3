//! File reading utilities for context inputs.
//!
//! Farmer records, custom knowledge bases, configuration files and web or
//! weather context all arrive as small files. These helpers read them with
//! size limits and map failures into [`IoError`] with the offending path.

use crate::error::{IoError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Maximum size of a context input file (8MB).
///
/// Anything larger cannot fit in a prompt anyway.
const MAX_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Reads a UTF-8 text file.
///
/// # Arguments
///
/// * `path` - Path to the file.
///
/// # Errors
///
/// Returns an error if the file doesn't exist, is too large, can't be
/// read or is not valid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use ekko::io::read_file;
///
/// let weather = read_file("clima-hoje.txt").unwrap();
/// ```
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    let metadata = std::fs::metadata(path_ref).map_err(|e| IoError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(IoError::ReadFailed {
            path: path_str,
            reason: format!(
                "file too large: {} bytes (max: {MAX_FILE_SIZE} bytes)",
                metadata.len()
            ),
        }
        .into());
    }

    let bytes = std::fs::read(path_ref).map_err(|e| IoError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    String::from_utf8(bytes).map_err(|e| {
        IoError::ReadFailed {
            path: path_str,
            reason: format!("invalid UTF-8: {e}"),
        }
        .into()
    })
}

/// Reads and deserializes a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
pub fn read_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let content = read_file(path_ref)?;
    serde_json::from_str(&content).map_err(|e| {
        IoError::InvalidJson {
            path: path_ref.to_string_lossy().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
