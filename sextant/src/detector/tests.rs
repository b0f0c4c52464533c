//! Tests for the detection pipeline.

use super::*;
use crate::config::DeblendAlgorithm;
use crate::pixel_group::PropertyValue;

// =============================================================================
// Helper Functions
// =============================================================================

/// Add a circular Gaussian of unit peak, clipped at `floor`.
fn add_star(image: &mut Buffer2<f32>, cx: usize, cy: usize, sigma: f32, floor: f32) {
    for y in 0..image.height() {
        for x in 0..image.width() {
            let dx = x as f32 - cx as f32;
            let dy = y as f32 - cy as f32;
            let value = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            if value > floor {
                image[(x, y)] += value;
            }
        }
    }
}

/// A blended pair at (8, 8) and (14, 8) plus an isolated star at (24, 24).
fn star_field() -> Buffer2<f32> {
    let mut image = Buffer2::new_filled(32, 32, 0.0f32);
    add_star(&mut image, 8, 8, 1.5, 0.05);
    add_star(&mut image, 14, 8, 1.5, 0.05);
    add_star(&mut image, 24, 24, 1.5, 0.05);
    image
}

fn peak_of(group: &PixelGroup) -> (usize, usize) {
    match group.property(property::PEAK) {
        Some(&PropertyValue::Peak { x, y, .. }) => (x, y),
        other => panic!("unexpected peak property {:?}", other),
    }
}

// =============================================================================
// Detection Tests
// =============================================================================

#[test]
fn test_detect_block_properties() {
    ::common::init_test_logging();

    let mut image = Buffer2::new_filled(5, 5, 0.0f32);
    for y in 1..=3 {
        for x in 1..=3 {
            image[(x, y)] = 10.0;
        }
    }

    let result = Detector::new().detect(&image).unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.len(), 9);
    assert_eq!(
        group.property(property::MIN_XY),
        Some(&PropertyValue::Coord { x: 1, y: 1 })
    );
    assert_eq!(
        group.property(property::MAX_XY),
        Some(&PropertyValue::Coord { x: 3, y: 3 })
    );
    assert_eq!(group.property(property::BOUNDARY), Some(&PropertyValue::Bool(false)));
    assert_eq!(group.property(property::FLUX), Some(&PropertyValue::Float(90.0)));

    let Some(&PropertyValue::Centroid { x, y, total }) = group.property(property::CENTROID) else {
        panic!("missing centroid");
    };
    assert!((x - 2.0).abs() < 1e-9);
    assert!((y - 2.0).abs() < 1e-9);
    assert_eq!(total, 90.0);
}

#[test]
fn test_detect_splits_blended_pair() {
    let result = Detector::new().detect(&star_field()).unwrap();

    assert_eq!(
        result.diagnostics,
        DetectionDiagnostics {
            rows: 32,
            object_pixels: result.diagnostics.object_pixels,
            segmented_groups: 2,
            split_groups: 1,
            dropped_groups: 0,
            final_groups: 3,
        }
    );

    let mut peaks: Vec<(usize, usize)> = result.groups.iter().map(peak_of).collect();
    peaks.sort();
    assert_eq!(peaks, [(8, 8), (14, 8), (24, 24)]);

    let ids: Vec<String> = result.groups.iter().map(|g| g.id().to_string()).collect();
    assert_eq!(ids, ["1_1", "1_2", "2"]);
}

#[test]
fn test_detect_without_deblending() {
    let detector = Detector::from_config(Config::segmentation_only());
    let result = detector.detect(&star_field()).unwrap();

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.diagnostics.split_groups, 0);
    assert!(result.groups.iter().all(|g| !g.id().is_derived()));
}

#[test]
fn test_detect_min_area_drops_small_groups() {
    let mut image = star_field();
    image[(30, 1)] = 1.0;

    let config = Config {
        min_area: 3,
        ..Config::default()
    };
    let result = Detector::from_config(config).detect(&image).unwrap();

    assert_eq!(result.diagnostics.segmented_groups, 3);
    assert_eq!(result.diagnostics.dropped_groups, 1);
    assert_eq!(result.diagnostics.final_groups, 3);
    assert!(result.groups.iter().all(|g| g.len() >= 3));
}

#[test]
fn test_detect_threshold() {
    let mut image = Buffer2::new_filled(6, 1, 0.0f32);
    image[(1, 0)] = 0.5;
    image[(4, 0)] = 2.0;

    let config = Config {
        threshold: 1.0,
        deblend: DeblendAlgorithm::Off,
        ..Config::default()
    };
    let result = Detector::from_config(config).detect(&image).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(peak_of(&result.groups[0]), (4, 0));
    assert_eq!(result.diagnostics.object_pixels, 1);
}

#[test]
fn test_boundary_flag_uses_margin() {
    let mut image = Buffer2::new_filled(10, 10, 0.0f32);
    image[(0, 5)] = 1.0;
    image[(2, 2)] = 1.0;
    image[(5, 5)] = 1.0;

    let flags = |margin: usize| -> Vec<bool> {
        let config = Config {
            boundary_margin: margin,
            ..Config::default()
        };
        let mut groups = Detector::from_config(config).detect(&image).unwrap().groups;
        groups.sort_by_key(|g| (g.pixels()[0].x, g.pixels()[0].y));
        groups
            .iter()
            .map(|g| g.property(property::BOUNDARY).and_then(PropertyValue::as_bool).unwrap())
            .collect()
    };

    assert_eq!(flags(0), [true, false, false]);
    assert_eq!(flags(2), [true, true, false]);
}

#[test]
fn test_detect_empty_image() {
    let image = Buffer2::new(0, 0, Vec::new());
    let result = Detector::new().detect(&image).unwrap();
    assert!(result.groups.is_empty());
    assert_eq!(result.diagnostics, DetectionDiagnostics::default());
}

#[test]
fn test_detect_all_matches_detect() {
    let images = vec![star_field(), Buffer2::new_filled(4, 4, 0.0), star_field()];
    let detector = Detector::new();

    let results = detector.detect_all(&images).unwrap();

    assert_eq!(results.len(), 3);
    for (image, result) in images.iter().zip(&results) {
        let single = detector.detect(image).unwrap();
        assert_eq!(result.diagnostics, single.diagnostics);
    }
}

#[test]
#[should_panic(expected = "threshold must be finite")]
fn test_from_config_validates() {
    Detector::from_config(Config {
        threshold: f32::NAN,
        ..Config::default()
    });
}
