//! Class list files: one class name per line.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::LabelprepError;

/// Class used when a project has no class list file.
pub const DEFAULT_CLASS_NAME: &str = "teat";

/// Parses class list content. Blank lines and lines starting with `#` are
/// ignored; names are trimmed.
pub fn parse_class_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads the class list at `path`, or falls back to [`DEFAULT_CLASS_NAME`]
/// when the file does not exist.
pub fn read_class_list(path: &Path) -> Result<Vec<String>, LabelprepError> {
    if !path.exists() {
        warn!(
            "class list {} not found; using default class '{}'",
            path.display(),
            DEFAULT_CLASS_NAME
        );
        return Ok(vec![DEFAULT_CLASS_NAME.to_string()]);
    }

    let content = fs::read_to_string(path).map_err(LabelprepError::Io)?;
    Ok(parse_class_list(&content))
}
