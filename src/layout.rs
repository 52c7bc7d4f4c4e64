//! Project directory layout.
//!
//! All paths hang off an explicit project root; nothing here depends on the
//! process working directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::LabelprepError;

/// Paths a project uses, relative to its root.
pub const LAYOUT_DIRS: [&str; 9] = [
    "datasets/raw_images",
    "datasets/labels",
    "datasets/processed/images/train",
    "datasets/processed/images/val",
    "datasets/processed/labels/train",
    "datasets/processed/labels/val",
    "models",
    "results",
    "packages",
];

/// The directory tree of a labeling/training project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The same layout anchored at an absolute root, resolved against the
    /// current directory. External tools get absolute paths from it no
    /// matter which directory they run in.
    pub fn absolute(&self) -> Result<Self, LabelprepError> {
        let root = std::path::absolute(&self.root).map_err(LabelprepError::Io)?;
        Ok(Self { root })
    }

    pub fn datasets_dir(&self) -> PathBuf {
        self.root.join("datasets")
    }

    pub fn raw_images_dir(&self) -> PathBuf {
        self.datasets_dir().join("raw_images")
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.datasets_dir().join("labels")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.datasets_dir().join("processed")
    }

    pub fn processed_images_dir(&self, partition: &str) -> PathBuf {
        self.processed_dir().join("images").join(partition)
    }

    /// The class list file handed to the labeling tool.
    pub fn classes_file(&self) -> PathBuf {
        self.datasets_dir().join("predefined_classes.txt")
    }

    pub fn dataset_config(&self) -> PathBuf {
        self.root.join("dataset.yaml")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join("packages")
    }

    /// Where the trainer writes run `run_name`.
    pub fn run_dir(&self, run_name: &str) -> PathBuf {
        self.root.join("runs").join("detect").join(run_name)
    }

    /// Creates every layout directory that is missing.
    pub fn ensure(&self) -> Result<(), LabelprepError> {
        for dir in LAYOUT_DIRS {
            fs::create_dir_all(self.root.join(dir)).map_err(LabelprepError::Io)?;
        }
        info!("Directory structure verified / created under {}", self.root.display());
        Ok(())
    }

    /// True when `processed/images/train` exists and has at least one entry.
    pub fn has_processed_split(&self) -> bool {
        fs::read_dir(self.processed_images_dir("train"))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }
}
