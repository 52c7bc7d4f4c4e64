use std::path::PathBuf;
use thiserror::Error;

/// The main error type for labelprep operations.
#[derive(Debug, Error)]
pub enum LabelprepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Root {} does not exist", path.display())]
    RootNotFound { path: PathBuf },

    #[error("Invalid dimensions {width}x{height} for image '{image}' (must be positive)")]
    InvalidImageDimensions {
        image: String,
        width: u32,
        height: u32,
    },

    #[error("Invalid box for image '{image}' (record {index}): {message}")]
    InvalidBox {
        image: String,
        index: usize,
        message: String,
    },

    #[error("Failed to parse annotation CSV {}: {source}", path.display())]
    AnnotationCsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse annotation JSON {}: {source}", path.display())]
    AnnotationJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read image dimensions from {}: {source}", path.display())]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid class mapping: {message}")]
    InvalidMapping { message: String },

    #[error("Invalid split parameters: {message}")]
    InvalidSplitParams { message: String },

    #[error("Split of {total} image(s) at ratio {ratio} leaves the {partition} partition empty")]
    EmptyPartition {
        total: usize,
        ratio: f64,
        partition: &'static str,
    },

    #[error("Could not launch labeling tool '{}': {message}", program.display())]
    LabelToolFailed { program: PathBuf, message: String },

    #[error("Training run '{run_name}' failed: {message}")]
    TrainerFailed { run_name: String, message: String },

    #[error("Validation of {} failed: {message}", model.display())]
    ValidationFailed { model: PathBuf, message: String },

    #[error("Failed to write YAML to {}: {source}", path.display())]
    YamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
