//! Refinement chain applied to segmented groups.
//!
//! A [`Partition`] runs a list of [`PartitionStep`]s. Every step is applied to
//! every group produced by the previous step, so a step may split a group,
//! pass it through or drop it.

use rayon::prelude::*;

use crate::config::{Config, DeblendAlgorithm};
use crate::deblend::{Deblender, Stamp};
use crate::error::Result;
use crate::group_property::GroupProperties;
use crate::pixel_group::PixelGroup;

/// One refinement step.
pub trait PartitionStep: Send + Sync {
    /// Replace `group` by zero or more groups.
    fn partition(&self, group: PixelGroup) -> Result<Vec<PixelGroup>>;
}

/// Attractor deblending using the group's own pixel values.
#[derive(Debug, Clone, Default)]
pub struct AttractorsStep {
    deblender: Deblender,
}

impl AttractorsStep {
    pub fn new(group_properties: GroupProperties) -> Self {
        Self {
            deblender: Deblender::new(group_properties),
        }
    }
}

impl PartitionStep for AttractorsStep {
    fn partition(&self, group: PixelGroup) -> Result<Vec<PixelGroup>> {
        let stamp = Stamp::from_group(&group);
        self.deblender.deblend(group, |x, y| stamp.value(x, y))
    }
}

/// Drops groups with fewer than `min_area` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinAreaStep {
    pub min_area: usize,
}

impl PartitionStep for MinAreaStep {
    fn partition(&self, group: PixelGroup) -> Result<Vec<PixelGroup>> {
        if group.len() < self.min_area {
            Ok(Vec::new())
        } else {
            Ok(vec![group])
        }
    }
}

/// Ordered list of refinement steps.
#[derive(Default)]
pub struct Partition {
    steps: Vec<Box<dyn PartitionStep>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain for `config`: attractor deblending if enabled, then the minimum
    /// area filter if `min_area > 1`. New groups get `group_properties`.
    pub fn from_config(config: &Config, group_properties: &GroupProperties) -> Self {
        let mut partition = Self::new();
        if config.deblend == DeblendAlgorithm::Attractors {
            partition.push(AttractorsStep::new(group_properties.clone()));
        }
        if config.min_area > 1 {
            partition.push(MinAreaStep {
                min_area: config.min_area,
            });
        }
        partition
    }

    pub fn push(&mut self, step: impl PartitionStep + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn with_step(mut self, step: impl PartitionStep + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step over `group` and everything derived from it.
    pub fn partition(&self, group: PixelGroup) -> Result<Vec<PixelGroup>> {
        let mut groups = vec![group];
        for step in &self.steps {
            let mut next = Vec::with_capacity(groups.len());
            for group in groups {
                next.extend(step.partition(group)?);
            }
            groups = next;
        }
        Ok(groups)
    }

    /// Partition independent groups in parallel. Element `i` of the result
    /// holds the output for `groups[i]`.
    pub fn partition_each(&self, groups: Vec<PixelGroup>) -> Result<Vec<Vec<PixelGroup>>> {
        groups
            .into_par_iter()
            .map(|group| self.partition(group))
            .collect()
    }

    /// Partition independent groups in parallel, keeping input order.
    pub fn partition_all(&self, groups: Vec<PixelGroup>) -> Result<Vec<PixelGroup>> {
        Ok(self
            .partition_each(groups)?
            .into_iter()
            .flatten()
            .collect())
    }
}
