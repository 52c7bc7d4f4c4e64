//! Axis-aligned bounding boxes tagged with their coordinate space.

use std::fmt;
use std::marker::PhantomData;

use super::space::{Normalized, Pixel, Space};

/// A bounding box stored as (xmin, ymin, xmax, ymax).
///
/// Construction never checks ordering or bounds, so degenerate boxes can be
/// represented and reported instead of panicking. Use [`BBox::is_ordered`]
/// and [`BBox::<Pixel>::is_within`] to inspect them.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    /// Creates a box from its corner coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    /// Creates a box from its center point and size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        Self::from_xyxy(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Returns `(center_x, center_y, width, height)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            self.width(),
            self.height(),
        )
    }

    /// Width of the box. Negative when `xmax < xmin`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the box. Negative when `ymax < ymin`.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite()
    }

    /// True when the box has strictly positive width and height.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin < self.xmax && self.ymin < self.ymax
    }
}

impl BBox<Pixel> {
    /// True when the box is ordered and lies inside `[0, width] x [0, height]`.
    pub fn is_within(&self, image_width: u32, image_height: u32) -> bool {
        let (w, h) = (image_width as f64, image_height as f64);
        self.is_finite()
            && self.is_ordered()
            && self.xmin >= 0.0
            && self.ymin >= 0.0
            && self.xmax <= w
            && self.ymax <= h
    }

    /// Returns a copy with every coordinate clamped to the image rectangle.
    pub fn clamped(&self, image_width: u32, image_height: u32) -> Self {
        let (w, h) = (image_width as f64, image_height as f64);
        Self::from_xyxy(
            self.xmin.clamp(0.0, w),
            self.ymin.clamp(0.0, h),
            self.xmax.clamp(0.0, w),
            self.ymax.clamp(0.0, h),
        )
    }

    /// Converts to normalized `(center_x, center_y, width, height)`.
    ///
    /// Center and size are computed in pixel space first and then divided by
    /// the image size.
    pub fn to_normalized_cxcywh(&self, image_width: u32, image_height: u32) -> (f64, f64, f64, f64) {
        let (cx, cy, w, h) = self.to_cxcywh();
        let (iw, ih) = (image_width as f64, image_height as f64);
        (cx / iw, cy / ih, w / iw, h / ih)
    }
}

impl BBox<Normalized> {
    /// Scales back to pixel coordinates for an image of the given size.
    pub fn to_pixel(&self, image_width: u32, image_height: u32) -> BBox<Pixel> {
        let (w, h) = (image_width as f64, image_height as f64);
        BBox::from_xyxy(
            self.xmin * w,
            self.ymin * h,
            self.xmax * w,
            self.ymax * h,
        )
    }
}

impl<TSpace: Space> fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBox")
            .field("space", &TSpace::NAME)
            .field("xmin", &self.xmin)
            .field("ymin", &self.ymin)
            .field("xmax", &self.xmax)
            .field("ymax", &self.ymax)
            .finish()
    }
}

impl<TSpace: Space> fmt::Display for BBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}] ({})",
            self.xmin,
            self.ymin,
            self.xmax,
            self.ymax,
            TSpace::NAME
        )
    }
}
