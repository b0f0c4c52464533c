//! Attractor deblending of pixel groups.
//!
//! Every pixel of a group walks uphill along the steepest neighbour until it
//! reaches a pixel none of its four neighbours beats: its attractor. Attractors
//! lying within one pixel of each other are merged into a basin. A group with a
//! single basin is returned unchanged; otherwise each basin becomes a new group
//! with a derived id and freshly folded properties.

mod attractors;
pub mod stamp;


pub use stamp::Stamp;

use crate::error::{Error, Result};
use crate::group_property::GroupProperties;
use crate::pixel_group::{Pixel, PixelGroup};

// ============================================================================
// Ascent step
// ============================================================================

/// Move chosen by one step of the steepest-ascent walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Stay,
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// Coordinates reached by moving from `(x, y)`. `None` for `Stay` and for
    /// moves off the coordinate range.
    pub fn neighbour(self, x: usize, y: usize) -> Option<(usize, usize)> {
        match self {
            Direction::Stay => None,
            Direction::Left => Some((x.checked_sub(1)?, y)),
            Direction::Up => Some((x, y.checked_sub(1)?)),
            Direction::Right => Some((x.checked_add(1)?, y)),
            Direction::Down => Some((x, y.checked_add(1)?)),
        }
    }
}

/// Pick the neighbour of `(x, y)` the ascent walk moves to.
///
/// Candidates are tested in the order self, left, up, right, down. Left and up
/// replace the current best only when strictly greater; right and down also
/// win ties. Among equal values down therefore beats right, which beats the
/// first of self, left and up.
///
/// Neighbours where `value_fn` returns `-inf` lie outside the group and are
/// never chosen, and NaN never wins a comparison.
pub fn ascent_direction<F>(x: usize, y: usize, value_fn: &F) -> Direction
where
    F: Fn(usize, usize) -> f32 + ?Sized,
{
    const CANDIDATES: [(Direction, bool); 4] = [
        (Direction::Left, false),
        (Direction::Up, false),
        (Direction::Right, true),
        (Direction::Down, true),
    ];

    let mut best = Direction::Stay;
    let mut best_value = value_fn(x, y);
    for (direction, wins_ties) in CANDIDATES {
        let Some((nx, ny)) = direction.neighbour(x, y) else {
            continue;
        };
        let value = value_fn(nx, ny);
        if value == f32::NEG_INFINITY {
            continue;
        }
        let wins = if wins_ties {
            value >= best_value
        } else {
            value > best_value
        };
        if wins {
            best = direction;
            best_value = value;
        }
    }
    best
}

// ============================================================================
// Deblender
// ============================================================================

/// Splits groups along attractor basins, folding `group_properties` over
/// every sub-group it creates.
#[derive(Debug, Clone, Default)]
pub struct Deblender {
    group_properties: GroupProperties,
}

impl Deblender {
    pub fn new(group_properties: GroupProperties) -> Self {
        Self { group_properties }
    }

    pub fn group_properties(&self) -> &GroupProperties {
        &self.group_properties
    }

    /// Deblend `group` using `value_fn` for pixel values.
    ///
    /// `value_fn` must be defined on the group's bounding box and the
    /// one-pixel halo around it, returning `-inf` outside the group.
    /// [`Stamp`] provides such a function from the group's own pixels.
    ///
    /// Returns the group itself when all pixels share one basin, otherwise
    /// one group per basin. Basins are ordered by their first attractor in
    /// raster order and numbered from 1 in the derived ids. Within a
    /// sub-group pixels keep their order in the input group.
    pub fn deblend<F>(&self, group: PixelGroup, value_fn: F) -> Result<Vec<PixelGroup>>
    where
        F: Fn(usize, usize) -> f32,
    {
        if group.is_empty() {
            return Err(Error::EmptyGroup {
                id: group.id().clone(),
            });
        }

        let assignment = attractors::assign_basins(group.pixels(), &value_fn);
        if assignment.basin_count == 1 {
            return Ok(vec![group]);
        }

        let (id, pixels) = group.into_parts();
        let mut basins: Vec<Vec<Pixel>> = vec![Vec::new(); assignment.basin_count];
        for (pixel, basin) in pixels.into_iter().zip(assignment.owner) {
            basins[basin].push(pixel);
        }

        tracing::debug!(
            id = %id,
            attractors = assignment.attractor_count,
            basins = basins.len(),
            "Split pixel group"
        );

        Ok(basins
            .into_iter()
            .enumerate()
            .map(|(i, pixels)| {
                PixelGroup::new(id.child(i as u32 + 1), pixels, &self.group_properties)
            })
            .collect())
    }
}

/// Deblend a single group without keeping a [`Deblender`] around.
pub fn deblend<F>(
    group: PixelGroup,
    group_properties: &GroupProperties,
    value_fn: F,
) -> Result<Vec<PixelGroup>>
where
    F: Fn(usize, usize) -> f32,
{
    Deblender::new(group_properties.clone()).deblend(group, value_fn)
}
