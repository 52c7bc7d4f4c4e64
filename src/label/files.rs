//! Label and image file discovery helpers.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::LabelprepError;

/// Extensions (case-insensitive) that mark a file as an image.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Extension of YOLO label files.
pub const LABEL_EXTENSION: &str = "txt";

/// Returns the label file name for an image: the image name with its
/// extension replaced by `.txt` (or `.txt` appended when it has none).
pub fn label_file_name(image_filename: &str) -> PathBuf {
    Path::new(image_filename).with_extension(LABEL_EXTENSION)
}

/// Collects regular files directly inside `dir` whose extension is in
/// `extensions`, sorted by file name.
pub fn list_files_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, LabelprepError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| {
            let message = format!("failed while reading {}: {source}", dir.display());
            LabelprepError::Io(
                source
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other(message)),
            )
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
