//! Coordinate space markers.
//!
//! Zero-sized types used as type parameters on [`BBox`](super::BBox) so that
//! pixel boxes and normalized boxes cannot be mixed up.

use std::fmt;

/// A coordinate space a bounding box can live in.
pub trait Space {
    /// Short human-readable name, used in diagnostics.
    const NAME: &'static str;
}

/// Absolute pixel coordinates, origin at the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates expressed as fractions of the image width and height.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl Space for Pixel {
    const NAME: &'static str = "pixel";
}

impl Space for Normalized {
    const NAME: &'static str = "normalized";
}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
