//! Bounding-box cutout of a pixel group's values.

use crate::common::Buffer2;
use crate::math::Aabb;
use crate::pixel_group::{Pixel, PixelGroup};

/// Pixel values of one group over its bounding box.
///
/// Positions outside the bounding box, and positions inside it that do not
/// belong to the group, read as `-inf`. This makes [`Stamp::value`] a total
/// value function for [`Deblender::deblend`](super::Deblender::deblend).
///
/// A cutout of the source image over the bounding box splits groups the same
/// way whenever groups were segmented with `value > threshold`: a hole holds
/// a value at or below the threshold, so it never ties or beats a group
/// pixel. Pass an image lookup to `deblend` directly when the threshold
/// predicate is not monotonic in the value.
#[derive(Debug, Clone)]
pub struct Stamp {
    bbox: Aabb,
    values: Buffer2<f32>,
}

impl Stamp {
    /// Stamp of the pixels' own values.
    pub fn from_group(group: &PixelGroup) -> Self {
        Self::with_values(group, |pixel| pixel.value)
    }

    /// Stamp of a per-pixel quantity, e.g. a named pixel property.
    pub fn with_values<F>(group: &PixelGroup, value: F) -> Self
    where
        F: Fn(&Pixel) -> f32,
    {
        let bbox = group.bbox();
        if bbox.is_empty() {
            return Self {
                bbox,
                values: Buffer2::new(0, 0, Vec::new()),
            };
        }

        let mut values = Buffer2::new_filled(bbox.width(), bbox.height(), f32::NEG_INFINITY);
        for pixel in group.pixels() {
            values[(pixel.x - bbox.x_min, pixel.y - bbox.y_min)] = value(pixel);
        }
        Self { bbox, values }
    }

    #[inline]
    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    /// Value at absolute image coordinates.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f32 {
        if !self.bbox.contains(x, y) {
            return f32::NEG_INFINITY;
        }
        self.values[(x - self.bbox.x_min, y - self.bbox.y_min)]
    }
}
