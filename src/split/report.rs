//! Split run summaries.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Files copied into one partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
    /// Image file names, in shuffled order.
    pub images: Vec<String>,
    /// Number of label files copied alongside.
    pub labels_copied: usize,
    /// Images copied without a matching label file.
    pub unlabeled: Vec<String>,
}

/// The result of materializing a split.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    pub output_dir: PathBuf,
    pub seed: u64,
    pub ratio: f64,
    pub train: PartitionReport,
    pub val: PartitionReport,
}

impl SplitReport {
    pub fn total_images(&self) -> usize {
        self.train.images.len() + self.val.images.len()
    }

    pub fn unlabeled_count(&self) -> usize {
        self.train.unlabeled.len() + self.val.unlabeled.len()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dataset prepared: {} train, {} val images",
            self.train.images.len(),
            self.val.images.len()
        )?;
        writeln!(
            f,
            "  labels copied: {} train, {} val",
            self.train.labels_copied, self.val.labels_copied
        )?;
        writeln!(
            f,
            "  seed {}, ratio {}, output {}",
            self.seed,
            self.ratio,
            self.output_dir.display()
        )?;

        let unlabeled = self.unlabeled_count();
        if unlabeled > 0 {
            writeln!(f)?;
            writeln!(f, "Unlabeled images ({}):", unlabeled)?;
            for name in self.train.unlabeled.iter().chain(&self.val.unlabeled) {
                writeln!(f, "  - {}", name)?;
            }
        }

        Ok(())
    }
}
