//! Detection pipeline: segmentation followed by the partition chain.
//!
//! [`Detector`] wires a [`Segmentation`] and a [`Partition`] together for
//! images held in memory, registering a standard set of group properties.

#[cfg(test)]
mod tests;

// =============================================================================
// Imports
// =============================================================================

use rayon::prelude::*;

use crate::common::Buffer2;
use crate::config::Config;
use crate::error::Result;
use crate::group_property::{GroupProperties, PixelField, StandardProperty};
use crate::partition::Partition;
use crate::pixel_group::PixelGroup;
use crate::segmentation::Segmentation;

/// Names of the group properties registered by [`Detector`].
pub mod property {
    /// Componentwise minimum pixel coordinate.
    pub const MIN_XY: &str = "min_xy";
    /// Componentwise maximum pixel coordinate.
    pub const MAX_XY: &str = "max_xy";
    /// Whether the group reaches the image border margin.
    pub const BOUNDARY: &str = "boundary";
    /// Brightest pixel.
    pub const PEAK: &str = "peak";
    /// Value-weighted centroid.
    pub const CENTROID: &str = "centroid";
    /// Sum of pixel values.
    pub const FLUX: &str = "flux";
}

/// Result of detection with diagnostics.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Detected groups, in segmentation emission order. Groups split by the
    /// deblender appear in place of their parent.
    pub groups: Vec<PixelGroup>,
    /// Counters from each stage of the pipeline.
    pub diagnostics: DetectionDiagnostics,
}

/// Diagnostic counters from detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionDiagnostics {
    /// Number of image rows scanned.
    pub rows: usize,
    /// Number of pixels above the threshold.
    pub object_pixels: usize,
    /// Number of groups emitted by segmentation.
    pub segmented_groups: usize,
    /// Number of segmented groups split into more than one group.
    pub split_groups: usize,
    /// Number of segmented groups for which nothing survived partitioning.
    pub dropped_groups: usize,
    /// Final number of groups returned.
    pub final_groups: usize,
}

// =============================================================================
// Detector
// =============================================================================

/// Detects pixel groups in images with a fixed [`Config`].
///
/// # Example
///
/// ```
/// use sextant::common::Buffer2;
/// use sextant::{Config, Detector};
///
/// let mut image = Buffer2::new_filled(8, 8, 0.0f32);
/// image[(3, 3)] = 5.0;
/// image[(4, 3)] = 2.0;
///
/// let detector = Detector::from_config(Config::default());
/// let result = detector.detect(&image).unwrap();
/// assert_eq!(result.groups.len(), 1);
/// assert_eq!(result.diagnostics.object_pixels, 2);
/// ```
#[derive(Debug, Default)]
pub struct Detector {
    config: Config,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics if `config` is invalid.
    pub fn from_config(config: Config) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Group properties registered for an image of the given size.
    pub fn group_properties(&self, width: usize, height: usize) -> GroupProperties {
        let margin = self.config.boundary_margin;
        GroupProperties::new()
            .with(property::MIN_XY, StandardProperty::MinXY)
            .with(property::MAX_XY, StandardProperty::MaxXY)
            .with(
                property::BOUNDARY,
                StandardProperty::BoundaryFlag {
                    x_min: margin,
                    y_min: margin,
                    x_max: width.saturating_sub(1 + margin),
                    y_max: height.saturating_sub(1 + margin),
                },
            )
            .with(
                property::PEAK,
                StandardProperty::PeakPixel {
                    field: PixelField::Value,
                },
            )
            .with(
                property::CENTROID,
                StandardProperty::WeightedCentroid {
                    field: PixelField::Value,
                },
            )
            .with(
                property::FLUX,
                StandardProperty::Sum {
                    field: PixelField::Value,
                },
            )
    }

    /// Detect pixel groups in a single image.
    pub fn detect(&self, image: &Buffer2<f32>) -> Result<DetectionResult> {
        let properties = self.group_properties(image.width(), image.height());

        // Step 1: Segment
        let segmentation = Segmentation::with_threshold_value(self.config.threshold)
            .with_group_properties(properties.clone());
        let mut segmented = Vec::new();
        let summary = segmentation.scan(image.rows(), |group| {
            segmented.push(group);
            Ok(())
        })?;

        let mut diagnostics = DetectionDiagnostics {
            rows: summary.rows,
            object_pixels: summary.object_pixels,
            segmented_groups: segmented.len(),
            ..Default::default()
        };

        // Step 2: Deblend and filter
        let partition = Partition::from_config(&self.config, &properties);
        let outputs = partition.partition_each(segmented)?;
        diagnostics.split_groups = outputs.iter().filter(|out| out.len() > 1).count();
        diagnostics.dropped_groups = outputs.iter().filter(|out| out.is_empty()).count();

        let groups: Vec<PixelGroup> = outputs.into_iter().flatten().collect();
        diagnostics.final_groups = groups.len();

        tracing::info!(
            width = image.width(),
            height = image.height(),
            segmented = diagnostics.segmented_groups,
            split = diagnostics.split_groups,
            dropped = diagnostics.dropped_groups,
            groups = diagnostics.final_groups,
            "Detection complete"
        );

        Ok(DetectionResult {
            groups,
            diagnostics,
        })
    }

    /// Detect pixel groups in several images in parallel.
    pub fn detect_all(&self, images: &[Buffer2<f32>]) -> Result<Vec<DetectionResult>> {
        images.par_iter().map(|image| self.detect(image)).collect()
    }
}
