//! CLI command implementations.

pub mod batch;
pub mod process;

use std::fs;
use std::path::Path;

/// Read a document as text. Older engineering-tool exports are often
/// Latin-1, so invalid UTF-8 falls back to a byte-wise decode instead of
/// failing the file.
pub fn read_document(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => Ok(err.as_bytes().iter().map(|&b| b as char).collect()),
    }
}

/// The filename component used for profile and metadata resolution.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
