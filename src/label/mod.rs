//! Label data model shared by the normalizer, remapper and splitter.
//!
//! Boxes carry their coordinate space as a type parameter, so a pixel box
//! has to go through an explicit conversion before it can be written as a
//! normalized YOLO line.
//!
//! # Example
//!
//! ```
//! use labelprep::label::{LabelLine, LabelRecord};
//!
//! let record = LabelRecord::from_xyxy(0, [800.0, 600.0, 850.0, 680.0]);
//! let line = LabelLine::from_record(&record, 1920, 1080);
//! assert_eq!(line.to_string(), "0 0.429688 0.592593 0.026042 0.074074");
//! ```

mod bbox;
pub mod files;
mod record;
mod space;

pub use bbox::BBox;
pub use files::{label_file_name, IMAGE_EXTENSIONS, LABEL_EXTENSION};
pub use record::{LabelLine, LabelRecord, LineError, LABEL_FLOAT_PRECISION};
pub use space::{Normalized, Pixel, Space};
