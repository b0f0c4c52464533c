//! Configuration for the detection pipeline.
//!
//! A flat [`Config`] struct with per-field documentation. Use
//! [`Config::default`] and adjust fields, then [`Config::validate`] (called by
//! [`Detector::from_config`](crate::Detector::from_config)).

// ============================================================================
// Enums
// ============================================================================

/// Algorithm used to split segmented groups into sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeblendAlgorithm {
    /// Keep segmented groups as they are.
    Off,
    /// Split groups along steepest-ascent attractor basins.
    #[default]
    Attractors,
}

// ============================================================================
// Config
// ============================================================================

/// Detection pipeline configuration.
///
/// # Examples
///
/// ```
/// use sextant::{Config, DeblendAlgorithm};
///
/// let mut config = Config::default();
/// config.threshold = 2.5;
/// config.min_area = 5;
/// config.validate();
///
/// let plain = Config::segmentation_only();
/// assert_eq!(plain.deblend, DeblendAlgorithm::Off);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // -- Segmentation --
    /// A pixel is part of an object when its value is strictly greater.
    pub threshold: f32,

    // -- Partitioning --
    /// Deblending algorithm applied to every segmented group.
    pub deblend: DeblendAlgorithm,
    /// Minimum number of pixels a group needs to be kept after deblending.
    /// Values of 0 and 1 keep every group.
    pub min_area: usize,

    // -- Group properties --
    /// Width of the image border for the `boundary` group flag. Groups with a
    /// pixel within this many pixels of the outermost row or column are
    /// flagged. 0 flags only groups touching the outermost pixels.
    pub boundary_margin: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Segmentation
            threshold: 0.0,

            // Partitioning
            deblend: DeblendAlgorithm::Attractors,
            min_area: 1,

            // Group properties
            boundary_margin: 0,
        }
    }
}

impl Config {
    /// Segment only: no deblending and no area filter.
    pub fn segmentation_only() -> Self {
        Self {
            deblend: DeblendAlgorithm::Off,
            ..Self::default()
        }
    }

    /// Validate the configuration, panicking if invalid.
    pub fn validate(&self) {
        assert!(
            self.threshold.is_finite(),
            "threshold must be finite, got {}",
            self.threshold
        );
    }
}
