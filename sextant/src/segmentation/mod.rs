//! Single-pass segmentation of an image into pixel groups.
//!
//! The image is consumed row by row and never buffered. Groups are handed to
//! the caller as soon as no later row can add pixels to them, so memory use
//! depends on the image width and the number of groups open across a row
//! boundary, not on the image height.
//!
//! Runs of object pixels on consecutive rows join the same group when they
//! overlap or touch at a corner, so groups are 8-connected.

mod lutz;


use std::borrow::Borrow;
use std::fmt;

use crate::error::Result;
use crate::group_property::GroupProperties;
use crate::pixel_group::{PixelGroup, PropertyValue};

use lutz::LutzScanner;

/// Decides whether the pixel at `(x, y)` with the given value is an object pixel.
pub type ThresholdFn = Box<dyn Fn(usize, usize, f32) -> bool + Send + Sync>;

/// Computes a named pixel property from the pixel coordinates.
pub type PixelPropertyFn = Box<dyn Fn(usize, usize) -> PropertyValue + Send + Sync>;

/// Counters for one completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub rows: usize,
    pub width: usize,
    pub groups: usize,
    pub object_pixels: usize,
}

/// Segmentation settings: the threshold predicate, the per-pixel property
/// functions and the group reducers applied to every emitted group.
///
/// A `Segmentation` holds no scan state. Each call to [`scan`](Self::scan)
/// owns its own stacks and id counter, so one instance can be shared between
/// threads scanning different images.
pub struct Segmentation {
    threshold: ThresholdFn,
    pixel_properties: Vec<(String, PixelPropertyFn)>,
    group_properties: GroupProperties,
}

impl Default for Segmentation {
    /// Object pixels are those with a value strictly above zero.
    fn default() -> Self {
        Self::with_threshold_value(0.0)
    }
}

impl fmt::Debug for Segmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pixel_properties: Vec<&str> = self
            .pixel_properties
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        f.debug_struct("Segmentation")
            .field("pixel_properties", &pixel_properties)
            .field("group_properties", &self.group_properties)
            .finish_non_exhaustive()
    }
}

impl Segmentation {
    pub fn new<T>(threshold: T) -> Self
    where
        T: Fn(usize, usize, f32) -> bool + Send + Sync + 'static,
    {
        Self {
            threshold: Box::new(threshold),
            pixel_properties: Vec::new(),
            group_properties: GroupProperties::new(),
        }
    }

    /// Object pixels are those with `value > threshold`.
    pub fn with_threshold_value(threshold: f32) -> Self {
        Self::new(move |_, _, value| value > threshold)
    }

    /// Evaluate `property` once for every object pixel and store it under `name`.
    pub fn with_pixel_property<F>(mut self, name: impl Into<String>, property: F) -> Self
    where
        F: Fn(usize, usize) -> PropertyValue + Send + Sync + 'static,
    {
        let name = name.into();
        self.pixel_properties.retain(|(n, _)| *n != name);
        self.pixel_properties.push((name, Box::new(property)));
        self
    }

    pub fn with_group_properties(mut self, group_properties: GroupProperties) -> Self {
        self.group_properties = group_properties;
        self
    }

    pub fn group_properties(&self) -> &GroupProperties {
        &self.group_properties
    }

    /// Scan `image` row by row and pass every completed group to `on_group`.
    ///
    /// Groups are emitted in the order they become complete, which is not
    /// raster order. Groups still open after the last row are emitted at the
    /// end in ascending order of their first column on the last row they
    /// touched. Ids are numbered from 1 in emission order.
    ///
    /// All rows must have the same length. An error returned by `on_group`
    /// aborts the scan and is returned unchanged.
    pub fn scan<I, R, G>(&self, image: I, on_group: G) -> Result<ScanSummary>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: Borrow<f32>,
        G: FnMut(PixelGroup) -> anyhow::Result<()>,
    {
        self.scan_with_progress(image, on_group, |_| Ok(()))
    }

    /// Like [`scan`](Self::scan), calling `on_progress` with the number of
    /// rows consumed after every row.
    pub fn scan_with_progress<I, R, G, P>(
        &self,
        image: I,
        on_group: G,
        mut on_progress: P,
    ) -> Result<ScanSummary>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: Borrow<f32>,
        G: FnMut(PixelGroup) -> anyhow::Result<()>,
        P: FnMut(usize) -> anyhow::Result<()>,
    {
        let mut scanner = LutzScanner::new(self, on_group);
        for row in image {
            scanner.scan_row(row)?;
            on_progress(scanner.rows())?;
        }
        scanner.finish()?;

        let summary = ScanSummary {
            rows: scanner.rows(),
            width: scanner.width(),
            groups: scanner.groups_emitted(),
            object_pixels: scanner.object_pixels(),
        };
        tracing::debug!(
            rows = summary.rows,
            width = summary.width,
            groups = summary.groups,
            object_pixels = summary.object_pixels,
            "Segmentation complete"
        );
        Ok(summary)
    }

    /// Scan `image` and collect the groups in emission order.
    pub fn scan_collect<I, R>(&self, image: I) -> Result<Vec<PixelGroup>>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: Borrow<f32>,
    {
        let mut groups = Vec::new();
        self.scan(image, |group| {
            groups.push(group);
            Ok(())
        })?;
        Ok(groups)
    }
}
