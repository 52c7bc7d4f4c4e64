//! Train/validation splitting with paired image and label copies.
//!
//! Eligible images are sorted by file name, shuffled with a seeded
//! [`StdRng`], and cut at `floor(ratio * N)`: the head is `train`, the tail
//! is `val`. Sorting first keeps the partition independent of directory
//! iteration order, so the same input set and seed always give the same
//! partition.

mod prepare;
mod report;

pub use prepare::{prepare_dataset, PrepareOutcome};
pub use report::{PartitionReport, SplitReport};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

use crate::error::LabelprepError;
use crate::label::files::list_files_with_extensions;
use crate::label::{IMAGE_EXTENSIONS, LABEL_EXTENSION};
use crate::layout::ProjectLayout;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// One side of the split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Val,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Train, Partition::Val];

    /// Directory name used under `images/` and `labels/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Val => "val",
        }
    }
}

/// Splitter options.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    /// Directory holding the source images.
    pub images_dir: PathBuf,
    /// Directory holding `<stem>.txt` label files. May be missing.
    pub labels_dir: PathBuf,
    /// Root of the mirrored `images/<split>` + `labels/<split>` tree.
    pub output_dir: PathBuf,
    /// Fraction of images assigned to `train`, in `[0, 1]`.
    pub ratio: f64,
    pub seed: u64,
    /// Empty the `train`/`val` target directories before copying, so files
    /// from an earlier split cannot end up on both sides.
    pub clean: bool,
}

impl SplitOptions {
    /// Options wired to the standard project directories.
    pub fn for_layout(layout: &ProjectLayout) -> Self {
        Self {
            images_dir: layout.raw_images_dir(),
            labels_dir: layout.labels_dir(),
            output_dir: layout.processed_dir(),
            ratio: DEFAULT_TRAIN_RATIO,
            seed: DEFAULT_SEED,
            clean: false,
        }
    }
}

/// A computed assignment of images to partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitPlan {
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
}

impl SplitPlan {
    pub fn get(&self, partition: Partition) -> &[PathBuf] {
        match partition {
            Partition::Train => &self.train,
            Partition::Val => &self.val,
        }
    }
}

pub fn validate_ratio(ratio: f64) -> Result<(), LabelprepError> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(LabelprepError::InvalidSplitParams {
            message: format!("ratio {ratio} must be in the interval [0.0, 1.0]"),
        });
    }
    Ok(())
}

/// Lists eligible images (jpg, jpeg, png; any case) directly inside `dir`.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, LabelprepError> {
    list_files_with_extensions(dir, &IMAGE_EXTENSIONS)
}

/// Number of images assigned to `train`.
pub fn train_count(total: usize, ratio: f64) -> usize {
    ((ratio * total as f64).floor() as usize).min(total)
}

/// Shuffles `images` with the seeded RNG and cuts them into train/val.
pub fn plan_split(mut images: Vec<PathBuf>, ratio: f64, seed: u64) -> SplitPlan {
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut rng = StdRng::seed_from_u64(seed);
    images.shuffle(&mut rng);

    let val = images.split_off(train_count(images.len(), ratio));
    SplitPlan { train: images, val }
}

/// Copies every planned image, and its label when one exists, into the
/// output tree. Existing targets are overwritten; leftovers from an earlier
/// split are removed with [`SplitOptions::clean`] and reported otherwise.
pub fn materialize(plan: &SplitPlan, opts: &SplitOptions) -> Result<SplitReport, LabelprepError> {
    let mut report = SplitReport {
        output_dir: opts.output_dir.clone(),
        seed: opts.seed,
        ratio: opts.ratio,
        ..Default::default()
    };

    for partition in Partition::ALL {
        let images_out = opts.output_dir.join("images").join(partition.as_str());
        let labels_out = opts.output_dir.join("labels").join(partition.as_str());
        prepare_target_dir(&images_out, opts.clean)?;
        prepare_target_dir(&labels_out, opts.clean)?;

        let part_report = match partition {
            Partition::Train => &mut report.train,
            Partition::Val => &mut report.val,
        };

        for image in plan.get(partition) {
            let Some(file_name) = image.file_name() else {
                continue;
            };
            let name = file_name.to_string_lossy().into_owned();

            fs::copy(image, images_out.join(file_name)).map_err(LabelprepError::Io)?;

            let label_name = Path::new(file_name).with_extension(LABEL_EXTENSION);
            let label_src = opts.labels_dir.join(&label_name);
            if label_src.is_file() {
                fs::copy(&label_src, labels_out.join(&label_name)).map_err(LabelprepError::Io)?;
                part_report.labels_copied += 1;
            } else {
                debug!("{} has no label file; copied unlabeled", name);
                part_report.unlabeled.push(name.clone());
            }

            part_report.images.push(name);
        }
    }

    Ok(report)
}

fn prepare_target_dir(dir: &Path, clean: bool) -> Result<(), LabelprepError> {
    let occupied = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);

    if occupied {
        if clean {
            debug!("clearing {}", dir.display());
            fs::remove_dir_all(dir).map_err(LabelprepError::Io)?;
        } else {
            warn!(
                "{} already has files; stale entries from an earlier split are kept (use --clean)",
                dir.display()
            );
        }
    }
    fs::create_dir_all(dir).map_err(LabelprepError::Io)
}

/// Discovers, plans and materializes a split.
///
/// Tolerates a missing label directory and empty partitions.
pub fn split_dataset(opts: &SplitOptions) -> Result<SplitReport, LabelprepError> {
    validate_ratio(opts.ratio)?;

    let images = discover_images(&opts.images_dir)?;
    let plan = plan_split(images, opts.ratio, opts.seed);
    let report = materialize(&plan, opts)?;

    info!(
        "Split {} image(s) into {} train / {} val (seed {})",
        report.total_images(),
        report.train.images.len(),
        report.val.images.len(),
        opts.seed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("img_{i:02}.jpg"))).collect()
    }

    #[test]
    fn train_count_floors() {
        assert_eq!(train_count(10, 0.8), 8);
        assert_eq!(train_count(7, 0.8), 5);
        assert_eq!(train_count(1, 0.8), 0);
        assert_eq!(train_count(3, 1.0), 3);
        assert_eq!(train_count(0, 0.8), 0);
    }

    #[test]
    fn plan_is_disjoint_and_exhaustive() {
        let plan = plan_split(names(10), 0.8, DEFAULT_SEED);
        assert_eq!(plan.train.len(), 8);
        assert_eq!(plan.val.len(), 2);

        let train: HashSet<_> = plan.train.iter().collect();
        let val: HashSet<_> = plan.val.iter().collect();
        assert!(train.is_disjoint(&val));
        assert_eq!(train.len() + val.len(), 10);
    }

    #[test]
    fn plan_ignores_input_order() {
        let mut reversed = names(12);
        reversed.reverse();
        assert_eq!(
            plan_split(names(12), 0.8, 7),
            plan_split(reversed, 0.8, 7)
        );
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = plan_split(names(20), 0.5, 1);
        let b = plan_split(names(20), 0.5, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn ratio_must_be_a_fraction() {
        assert!(validate_ratio(0.0).is_ok());
        assert!(validate_ratio(1.0).is_ok());
        assert!(validate_ratio(1.5).is_err());
        assert!(validate_ratio(-0.1).is_err());
        assert!(validate_ratio(f64::NAN).is_err());
    }
}
