//! Training config and artifact packaging.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LabelprepError;

/// The dataset description handed to the trainer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub train: String,
    pub val: String,
    pub nc: usize,
    pub names: Vec<String>,
}

impl DatasetConfig {
    pub fn new(processed_dir: &Path, names: Vec<String>) -> Self {
        let path = fs::canonicalize(processed_dir).unwrap_or_else(|_| processed_dir.to_path_buf());
        Self {
            path,
            train: "images/train".to_string(),
            val: "images/val".to_string(),
            nc: names.len(),
            names,
        }
    }
}

/// Metadata written next to packaged artifacts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageMeta {
    pub run_name: String,
    pub classes: Vec<String>,
    pub epochs: u32,
    pub imgsz: u32,
    pub timestamp: String,
    pub weights: String,
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), LabelprepError> {
    let yaml = serde_yaml::to_string(value).map_err(|source| LabelprepError::YamlWrite {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, yaml).map_err(LabelprepError::Io)
}

/// Local time formatted for package directory names.
pub fn package_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Copies the existing files among `artifacts` into
/// `packages_dir/package_<run_name>_<timestamp>/` and writes
/// `package_meta.yaml` there. Missing artifacts are skipped.
pub fn package_artifacts(
    packages_dir: &Path,
    meta: &PackageMeta,
    artifacts: &[PathBuf],
) -> Result<PathBuf, LabelprepError> {
    let pkg_dir = packages_dir.join(format!("package_{}_{}", meta.run_name, meta.timestamp));
    fs::create_dir_all(&pkg_dir).map_err(LabelprepError::Io)?;

    for artifact in artifacts {
        let Some(name) = artifact.file_name() else {
            continue;
        };
        if artifact.is_file() {
            fs::copy(artifact, pkg_dir.join(name)).map_err(LabelprepError::Io)?;
        } else {
            warn!("artifact {} not found; not packaged", artifact.display());
        }
    }

    write_yaml(&pkg_dir.join("package_meta.yaml"), meta)?;
    info!("Packaged artifacts -> {}", pkg_dir.display());
    Ok(pkg_dir)
}
