//! Coordinate normalizer.
//!
//! Converts pixel-space boxes into YOLO label lines
//! (`class_id x_center y_center width height`, normalized, six decimals) and
//! writes one `.txt` label file per image.

pub mod input;
mod report;

pub use report::{NormalizeReport, OutOfBounds};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::LabelprepError;
use crate::label::{label_file_name, LabelLine, LabelRecord};

/// How boxes that are degenerate or fall outside the image are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BoundsPolicy {
    /// Convert as-is and report a warning.
    #[default]
    Passthrough,
    /// Clamp to the image rectangle, convert, and report a warning.
    Clamp,
    /// Fail on the first offending box without writing anything.
    Reject,
}

/// Normalizer options.
#[derive(Clone, Debug, Default)]
pub struct NormalizeOptions {
    pub bounds: BoundsPolicy,
}

/// The pixel annotations for a single image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLabels {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub labels: Vec<LabelRecord>,
}

/// A label file produced by [`write_label_file`].
#[derive(Clone, Debug)]
pub struct NormalizedFile {
    pub path: PathBuf,
    pub lines: Vec<LabelLine>,
    pub out_of_bounds: Vec<OutOfBounds>,
}

/// Converts the records of one image into label lines.
///
/// Returns the lines in record order plus any out-of-bounds findings.
pub fn normalize_records(
    image_filename: &str,
    image_width: u32,
    image_height: u32,
    labels: &[LabelRecord],
    policy: BoundsPolicy,
) -> Result<(Vec<LabelLine>, Vec<OutOfBounds>), LabelprepError> {
    if image_width == 0 || image_height == 0 {
        return Err(LabelprepError::InvalidImageDimensions {
            image: image_filename.to_string(),
            width: image_width,
            height: image_height,
        });
    }

    let mut lines = Vec::with_capacity(labels.len());
    let mut out_of_bounds = Vec::new();

    for (index, record) in labels.iter().enumerate() {
        let mut record = *record;

        if !record.bbox.is_within(image_width, image_height) {
            let bbox = [
                record.bbox.xmin,
                record.bbox.ymin,
                record.bbox.xmax,
                record.bbox.ymax,
            ];
            match policy {
                BoundsPolicy::Reject => {
                    return Err(LabelprepError::InvalidBox {
                        image: image_filename.to_string(),
                        index,
                        message: format!(
                            "{} is degenerate or outside {}x{}",
                            record.bbox, image_width, image_height
                        ),
                    });
                }
                BoundsPolicy::Clamp => {
                    record.bbox = record.bbox.clamped(image_width, image_height);
                }
                BoundsPolicy::Passthrough => {}
            }
            out_of_bounds.push(OutOfBounds {
                image: image_filename.to_string(),
                index,
                bbox,
                clamped: policy == BoundsPolicy::Clamp,
            });
        }

        lines.push(LabelLine::from_record(&record, image_width, image_height));
    }

    Ok((lines, out_of_bounds))
}

/// Renders label lines as file content: one line each, trailing newline
/// when non-empty.
pub fn render_label_file(lines: &[LabelLine]) -> String {
    let mut body = String::new();
    for line in lines {
        body.push_str(&line.to_string());
        body.push('\n');
    }
    body
}

/// Writes the label file for one image into `output_dir`.
///
/// The file is named after the image with its extension replaced by `.txt`.
/// The directory is created when missing and an existing file is overwritten.
/// An empty `labels` slice produces an empty file.
pub fn write_label_file(
    image_filename: &str,
    image_width: u32,
    image_height: u32,
    output_dir: &Path,
    labels: &[LabelRecord],
    opts: &NormalizeOptions,
) -> Result<NormalizedFile, LabelprepError> {
    let (lines, out_of_bounds) = normalize_records(
        image_filename,
        image_width,
        image_height,
        labels,
        opts.bounds,
    )?;
    let path = output_dir.join(label_file_name(image_filename));
    write_lines(&path, &lines)?;

    Ok(NormalizedFile {
        path,
        lines,
        out_of_bounds,
    })
}

/// Normalizes a batch of images.
///
/// All images are converted before any file is written, so a
/// [`BoundsPolicy::Reject`] failure leaves `output_dir` untouched.
pub fn normalize_batch(
    images: &[ImageLabels],
    output_dir: &Path,
    opts: &NormalizeOptions,
) -> Result<NormalizeReport, LabelprepError> {
    let mut converted = Vec::with_capacity(images.len());
    for image in images {
        let (lines, out_of_bounds) = normalize_records(
            &image.filename,
            image.width,
            image.height,
            &image.labels,
            opts.bounds,
        )?;
        converted.push((image, lines, out_of_bounds));
    }

    let mut report = NormalizeReport::default();
    for (image, lines, out_of_bounds) in converted {
        let path = output_dir.join(label_file_name(&image.filename));
        write_lines(&path, &lines)?;

        for issue in &out_of_bounds {
            warn!(
                "{} record {}: box {:?} is degenerate or outside {}x{}",
                issue.image, issue.index, issue.bbox, image.width, image.height
            );
        }

        report.lines_written += lines.len();
        report.out_of_bounds.extend(out_of_bounds);
        report.files.push(path);
    }

    info!(
        "Normalized {} image(s) into {}",
        report.files_written(),
        output_dir.display()
    );
    Ok(report)
}

fn write_lines(path: &Path, lines: &[LabelLine]) -> Result<(), LabelprepError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(LabelprepError::Io)?;
    }
    fs::write(path, render_label_file(lines)).map_err(LabelprepError::Io)?;
    debug!("wrote {} line(s) to {}", lines.len(), path.display());
    Ok(())
}
