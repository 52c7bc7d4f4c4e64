//! Batch annotation readers for the normalizer.
//!
//! Two inputs are accepted:
//!
//! - CSV with columns `filename,width,height,class_id,xmin,ymin,xmax,ymax`,
//!   one row per box in pixel units.
//! - JSON: an array of `{"filename", "width"?, "height"?, "labels": [...]}`
//!   where each label is `{"class_id": 0, "box": [xmin, ymin, xmax, ymax]}`.
//!   Missing dimensions are read from the image header.
//!
//! Rows that share a filename are grouped in first-seen order.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use super::ImageLabels;
use crate::error::LabelprepError;
use crate::label::LabelRecord;

/// Supported batch annotation formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnotationFormat {
    Csv,
    Json,
}

impl AnnotationFormat {
    /// Parses a user-supplied format name.
    pub fn from_name(name: &str) -> Result<Self, LabelprepError> {
        match name {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(LabelprepError::UnsupportedFormat(format!(
                "'{other}' (supported: csv, json)"
            ))),
        }
    }

    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, LabelprepError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::from_name(&ext)
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    filename: String,
    width: u32,
    height: u32,
    class_id: u32,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

#[derive(Debug, Deserialize)]
struct JsonImage {
    filename: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    labels: Vec<LabelRecord>,
}

/// Reads a batch annotation file.
///
/// `images_dir` is where images are looked up when a JSON entry omits its
/// dimensions; it defaults to the annotation file's directory.
pub fn read_annotations(
    path: &Path,
    format: AnnotationFormat,
    images_dir: Option<&Path>,
) -> Result<Vec<ImageLabels>, LabelprepError> {
    match format {
        AnnotationFormat::Csv => read_annotation_csv(path),
        AnnotationFormat::Json => {
            let fallback_dir = path.parent().unwrap_or(Path::new("."));
            read_annotation_json(path, images_dir.unwrap_or(fallback_dir))
        }
    }
}

pub fn read_annotation_csv(path: &Path) -> Result<Vec<ImageLabels>, LabelprepError> {
    let file = File::open(path).map_err(LabelprepError::Io)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut images: Vec<ImageLabels> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result.map_err(|source| LabelprepError::AnnotationCsvParse {
            path: path.to_path_buf(),
            source,
        })?;

        let record = LabelRecord::from_xyxy(row.class_id, [row.xmin, row.ymin, row.xmax, row.ymax]);

        match index_by_name.get(&row.filename) {
            Some(&idx) => {
                let image = &mut images[idx];
                if image.width != row.width || image.height != row.height {
                    warn!(
                        "{}: '{}' listed as {}x{} and {}x{}; keeping the first",
                        path.display(),
                        row.filename,
                        image.width,
                        image.height,
                        row.width,
                        row.height
                    );
                }
                image.labels.push(record);
            }
            None => {
                index_by_name.insert(row.filename.clone(), images.len());
                images.push(ImageLabels {
                    filename: row.filename,
                    width: row.width,
                    height: row.height,
                    labels: vec![record],
                });
            }
        }
    }

    Ok(images)
}

pub fn read_annotation_json(
    path: &Path,
    images_dir: &Path,
) -> Result<Vec<ImageLabels>, LabelprepError> {
    let file = File::open(path).map_err(LabelprepError::Io)?;
    let entries: Vec<JsonImage> = serde_json::from_reader(BufReader::new(file)).map_err(
        |source| LabelprepError::AnnotationJsonParse {
            path: path.to_path_buf(),
            source,
        },
    )?;

    let mut images: Vec<ImageLabels> = Vec::with_capacity(entries.len());
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        if let Some(&idx) = index_by_name.get(&entry.filename) {
            images[idx].labels.extend(entry.labels);
            continue;
        }

        let (width, height) = match (entry.width, entry.height) {
            (Some(w), Some(h)) => (w, h),
            _ => read_image_dimensions(&images_dir.join(&entry.filename))?,
        };

        index_by_name.insert(entry.filename.clone(), images.len());
        images.push(ImageLabels {
            filename: entry.filename,
            width,
            height,
            labels: entry.labels,
        });
    }

    Ok(images)
}

/// Reads `(width, height)` from an image header.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), LabelprepError> {
    let size = imagesize::size(path).map_err(|source| LabelprepError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let to_u32 = |value: usize, axis: &str| {
        u32::try_from(value).map_err(|_| {
            LabelprepError::Io(std::io::Error::other(format!(
                "image {axis} {value} of {} does not fit in u32",
                path.display()
            )))
        })
    };

    Ok((to_u32(size.width, "width")?, to_u32(size.height, "height")?))
}
