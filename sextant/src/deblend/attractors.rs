//! Attractor search and basin merging.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::ascent_direction;
use crate::math::Aabb;
use crate::pixel_group::Pixel;

/// Basin membership of every pixel of a group.
#[derive(Debug)]
pub(super) struct BasinAssignment {
    pub basin_count: usize,
    pub attractor_count: usize,
    /// Basin index for each input pixel, in input order.
    pub owner: Vec<usize>,
}

/// Walk every pixel to its attractor and merge attractors into basins.
///
/// Positions visited by earlier walks remember their attractor, so each
/// position is stepped from at most once and the total work is linear in the
/// number of distinct positions visited.
pub(super) fn assign_basins<F>(pixels: &[Pixel], value_fn: &F) -> BasinAssignment
where
    F: Fn(usize, usize) -> f32,
{
    let mut resolved: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut path = Vec::new();
    let targets: Vec<(usize, usize)> = pixels
        .iter()
        .map(|pixel| walk((pixel.x, pixel.y), value_fn, &mut resolved, &mut path))
        .collect();

    // Raster order: row first, then column.
    let mut attractor_index: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for &(x, y) in &targets {
        attractor_index.insert((y, x), 0);
    }
    let mut boxes = Vec::with_capacity(attractor_index.len());
    for (i, (&(y, x), index)) in attractor_index.iter_mut().enumerate() {
        *index = i;
        boxes.push(Aabb::point(x, y));
    }

    let attractor_count = boxes.len();
    let (basin_count, basin_of) = merge_touching(boxes);
    let owner = targets
        .iter()
        .map(|&(x, y)| basin_of[attractor_index[&(y, x)]])
        .collect();

    BasinAssignment {
        basin_count,
        attractor_count,
        owner,
    }
}

/// Follow the ascent from `start` until a position with no better neighbour
/// or a position whose attractor is already known.
fn walk<F>(
    start: (usize, usize),
    value_fn: &F,
    resolved: &mut HashMap<(usize, usize), (usize, usize)>,
    path: &mut Vec<(usize, usize)>,
) -> (usize, usize)
where
    F: Fn(usize, usize) -> f32,
{
    path.clear();
    let mut position = start;
    let attractor = loop {
        if let Some(&known) = resolved.get(&position) {
            break known;
        }
        path.push(position);
        let (x, y) = position;
        match ascent_direction(x, y, value_fn).neighbour(x, y) {
            Some(next) => position = next,
            None => break position,
        }
    };
    for &visited in path.iter() {
        resolved.insert(visited, attractor);
    }
    attractor
}

/// Merge boxes that touch or lie within one pixel of each other, repeating
/// until no two remaining boxes touch.
///
/// Returns the number of basins and the basin index of every input box.
/// Basins are numbered by their lowest input index.
pub(super) fn merge_touching(boxes: Vec<Aabb>) -> (usize, Vec<usize>) {
    let count = boxes.len();
    // (bounding box, input indices)
    let mut basins: Vec<(Aabb, Vec<usize>)> = boxes
        .into_iter()
        .enumerate()
        .map(|(i, bbox)| (bbox, vec![i]))
        .collect();

    let mut merged = true;
    while merged {
        merged = false;
        let mut i = 0;
        while i < basins.len() {
            let mut j = i + 1;
            while j < basins.len() {
                if basins[i].0.touches(&basins[j].0) {
                    let (bbox, members) = basins.remove(j);
                    basins[i].0 = basins[i].0.union(&bbox);
                    basins[i].1.extend(members);
                    merged = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    let mut basin_of = vec![0; count];
    for (basin, (_, members)) in basins.iter().enumerate() {
        for &member in members {
            basin_of[member] = basin;
        }
    }
    (basins.len(), basin_of)
}
