//! Sextant - pixel group detection for source extraction.
//!
//! This library finds connected groups of above-threshold pixels in an image
//! and splits blended groups into separate sources:
//! - Single-pass, row-streaming segmentation (Lutz algorithm)
//! - Attractor (steepest-ascent) deblending
//! - Pluggable per-pixel and per-group properties
//! - A refinement chain and a detector tying the pieces together
//!
//! # Quick Start
//!
//! ```
//! use sextant::{Segmentation, Stamp, Deblender, GroupProperties};
//!
//! let row = vec![0.0, 5.0, 3.0, 1.0, 1.0, 3.0, 5.0, 0.0];
//! let image = vec![row.clone(), row];
//!
//! let groups = Segmentation::default().scan_collect(&image)?;
//! assert_eq!(groups.len(), 1);
//!
//! let group = groups.into_iter().next().unwrap();
//! let stamp = Stamp::from_group(&group);
//! let sources = Deblender::new(GroupProperties::new()).deblend(group, |x, y| stamp.value(x, y))?;
//! assert_eq!(sources.len(), 2);
//! # Ok::<(), sextant::Error>(())
//! ```

pub mod common;
pub mod config;
pub mod deblend;
pub mod detector;
pub mod error;
pub mod group_property;
pub mod math;
pub mod partition;
pub mod pixel_group;
pub mod segmentation;

// ============================================================================
// Data model
// ============================================================================

pub use group_property::{
    FlagOp, FnProperty, GroupProperties, GroupProperty, PixelField, StandardProperty,
};
pub use pixel_group::{GroupId, Pixel, PixelGroup, PropertyMap, PropertyValue};

// ============================================================================
// Segmentation and deblending
// ============================================================================

pub use deblend::{Deblender, Direction, Stamp, ascent_direction, deblend};
pub use segmentation::{ScanSummary, Segmentation};

// ============================================================================
// Pipeline
// ============================================================================

pub use config::{Config, DeblendAlgorithm};
pub use detector::{DetectionDiagnostics, DetectionResult, Detector};
pub use partition::{AttractorsStep, MinAreaStep, Partition, PartitionStep};

// ============================================================================
// Errors
// ============================================================================

pub use error::{Error, Result};
