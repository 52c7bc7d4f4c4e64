//! Pixel-space label records and normalized YOLO label lines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bbox::BBox;
use super::space::{Normalized, Pixel};

/// One annotated object in absolute pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRecord {
    pub class_id: u32,
    pub bbox: BBox<Pixel>,
}

impl LabelRecord {
    pub fn new(class_id: u32, bbox: BBox<Pixel>) -> Self {
        Self { class_id, bbox }
    }

    /// Shorthand for a record built from `[xmin, ymin, xmax, ymax]`.
    pub fn from_xyxy(class_id: u32, xyxy: [f64; 4]) -> Self {
        let [xmin, ymin, xmax, ymax] = xyxy;
        Self::new(class_id, BBox::from_xyxy(xmin, ymin, xmax, ymax))
    }
}

// Serialized as `{"class_id": 0, "box": [xmin, ymin, xmax, ymax]}`.
impl Serialize for LabelRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("LabelRecord", 2)?;
        state.serialize_field("class_id", &self.class_id)?;
        state.serialize_field(
            "box",
            &[self.bbox.xmin, self.bbox.ymin, self.bbox.xmax, self.bbox.ymax],
        )?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for LabelRecord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RecordData {
            class_id: u32,
            #[serde(rename = "box")]
            bbox: [f64; 4],
        }
        let data = RecordData::deserialize(deserializer)?;
        Ok(LabelRecord::from_xyxy(data.class_id, data.bbox))
    }
}

/// A single line of a YOLO label file:
/// `class_id x_center y_center width height`, all four floats normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelLine {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl LabelLine {
    /// Normalizes a pixel record against the image size.
    pub fn from_record(record: &LabelRecord, image_width: u32, image_height: u32) -> Self {
        let (cx, cy, w, h) = record
            .bbox
            .to_normalized_cxcywh(image_width, image_height);
        Self {
            class_id: record.class_id,
            cx,
            cy,
            w,
            h,
        }
    }

    pub fn bbox(&self) -> BBox<Normalized> {
        BBox::from_cxcywh(self.cx, self.cy, self.w, self.h)
    }

    /// Decodes the line back into a pixel record for an image of the given size.
    pub fn to_record(&self, image_width: u32, image_height: u32) -> LabelRecord {
        LabelRecord::new(self.class_id, self.bbox().to_pixel(image_width, image_height))
    }
}

/// Fixed precision of the four float fields.
pub const LABEL_FLOAT_PRECISION: usize = 6;

impl fmt::Display for LabelLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.p$} {:.p$} {:.p$} {:.p$}",
            self.class_id,
            self.cx,
            self.cy,
            self.w,
            self.h,
            p = LABEL_FLOAT_PRECISION
        )
    }
}

/// Why a label line could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineError {
    /// The line did not have exactly five whitespace-separated tokens.
    TokenCount(usize),
    /// The class id token is not a non-negative integer.
    ClassId(String),
    /// One of the float fields did not parse.
    Field { name: &'static str, raw: String },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::TokenCount(n) => write!(f, "expected 5 tokens, found {n}"),
            LineError::ClassId(raw) => {
                write!(f, "invalid class_id '{raw}'; expected non-negative integer")
            }
            LineError::Field { name, raw } => {
                write!(f, "invalid {name} '{raw}'; expected floating-point number")
            }
        }
    }
}

impl std::error::Error for LineError {}

impl FromStr for LabelLine {
    type Err = LineError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // At most 6 tokens are collected; anything past 5 is an error anyway.
        let tokens: Vec<&str> = line.split_whitespace().take(6).collect();
        if tokens.len() != 5 {
            return Err(LineError::TokenCount(tokens.len()));
        }

        let class_id = tokens[0]
            .parse::<u32>()
            .map_err(|_| LineError::ClassId(tokens[0].to_string()))?;

        let field = |idx: usize, name: &'static str| {
            tokens[idx].parse::<f64>().map_err(|_| LineError::Field {
                name,
                raw: tokens[idx].to_string(),
            })
        };

        Ok(Self {
            class_id,
            cx: field(1, "x_center")?,
            cy: field(2, "y_center")?,
            w: field(3, "width")?,
            h: field(4, "height")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_reference_line() {
        let record = LabelRecord::from_xyxy(0, [800.0, 600.0, 850.0, 680.0]);
        let line = LabelLine::from_record(&record, 1920, 1080);
        assert_eq!(line.to_string(), "0 0.429688 0.592593 0.026042 0.074074");
    }

    #[test]
    fn parses_valid_line() {
        let line: LabelLine = "2 0.5 0.25 0.3 0.1".parse().expect("parse line");
        assert_eq!(
            line,
            LabelLine {
                class_id: 2,
                cx: 0.5,
                cy: 0.25,
                w: 0.3,
                h: 0.1,
            }
        );
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(
            "0 0.1 0.2".parse::<LabelLine>(),
            Err(LineError::TokenCount(3))
        );
        assert_eq!(
            "0 0.1 0.2 0.3 0.4 0.5".parse::<LabelLine>(),
            Err(LineError::TokenCount(6))
        );
        assert!(matches!(
            "x 0.1 0.2 0.3 0.4".parse::<LabelLine>(),
            Err(LineError::ClassId(_))
        ));
        assert!(matches!(
            "1 0.1 abc 0.3 0.4".parse::<LabelLine>(),
            Err(LineError::Field { name: "y_center", .. })
        ));
    }

    #[test]
    fn record_deserializes_from_box_array() {
        let record: LabelRecord =
            serde_json::from_str(r#"{"class_id": 3, "box": [1, 2, 30, 40]}"#).expect("parse");
        assert_eq!(record, LabelRecord::from_xyxy(3, [1.0, 2.0, 30.0, 40.0]));

        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"class_id":3,"box":[1.0,2.0,30.0,40.0]}"#);
    }

    #[test]
    fn decoding_restores_pixel_box() {
        let record = LabelRecord::from_xyxy(1, [950.0, 610.0, 1000.0, 690.0]);
        let decoded = LabelLine::from_record(&record, 1920, 1080).to_record(1920, 1080);
        assert!((decoded.bbox.xmin - 950.0).abs() < 1e-9);
        assert!((decoded.bbox.ymax - 690.0).abs() < 1e-9);
        assert_eq!(decoded.class_id, 1);
    }
}
