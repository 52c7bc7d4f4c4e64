//! Strict dataset preparation.
//!
//! [`prepare_dataset`] is the primary way to build the processed tree. It is
//! stricter than [`split_dataset`](super::split_dataset): it needs a label
//! directory, at least one image, and refuses splits that would leave either
//! partition empty. Callers decide what to do when it cannot run.

use std::fmt;

use log::info;

use super::{discover_images, materialize, plan_split, validate_ratio, SplitOptions, SplitReport};
use crate::error::LabelprepError;

/// The result of [`prepare_dataset`].
#[derive(Debug)]
pub enum PrepareOutcome {
    /// The processed tree was written.
    Prepared(SplitReport),
    /// Preconditions were not met; nothing was written.
    Unavailable { reason: String },
    /// Preparation started and failed.
    Failed(LabelprepError),
}

impl fmt::Display for PrepareOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareOutcome::Prepared(report) => write!(
                f,
                "prepared {} train, {} val images",
                report.train.images.len(),
                report.val.images.len()
            ),
            PrepareOutcome::Unavailable { reason } => write!(f, "unavailable: {reason}"),
            PrepareOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Splits `opts.images_dir` into the processed tree, strictly.
pub fn prepare_dataset(opts: &SplitOptions) -> PrepareOutcome {
    if !opts.images_dir.is_dir() {
        return PrepareOutcome::Unavailable {
            reason: format!(
                "image directory {} does not exist",
                opts.images_dir.display()
            ),
        };
    }
    if !opts.labels_dir.is_dir() {
        return PrepareOutcome::Unavailable {
            reason: format!(
                "label directory {} does not exist",
                opts.labels_dir.display()
            ),
        };
    }

    match run_prepare(opts) {
        Ok(Some(report)) => PrepareOutcome::Prepared(report),
        Ok(None) => PrepareOutcome::Unavailable {
            reason: format!("no eligible images in {}", opts.images_dir.display()),
        },
        Err(err) => PrepareOutcome::Failed(err),
    }
}

fn run_prepare(opts: &SplitOptions) -> Result<Option<SplitReport>, LabelprepError> {
    validate_ratio(opts.ratio)?;

    let images = discover_images(&opts.images_dir)?;
    if images.is_empty() {
        return Ok(None);
    }

    let total = images.len();
    let plan = plan_split(images, opts.ratio, opts.seed);
    for (partition, len) in [("train", plan.train.len()), ("val", plan.val.len())] {
        if len == 0 {
            return Err(LabelprepError::EmptyPartition {
                total,
                ratio: opts.ratio,
                partition,
            });
        }
    }

    let report = materialize(&plan, opts)?;
    info!("{}", report.to_string().lines().next().unwrap_or_default());
    Ok(Some(report))
}
