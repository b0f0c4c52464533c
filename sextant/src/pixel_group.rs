//! Pixel groups produced by segmentation and deblending.

use std::fmt;

use hashbrown::HashMap;

use crate::group_property::GroupProperties;
use crate::math::Aabb;

/// Value of a named pixel or group property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Pixel coordinate, e.g. the corners of a bounding box.
    Coord { x: usize, y: usize },
    /// Weighted centroid with the accumulated weight.
    Centroid { x: f64, y: f64, total: f64 },
    /// Location and value of a maximum.
    Peak { x: usize, y: usize, value: f64 },
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PropertyValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Numeric view of scalar values. Integers are widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            PropertyValue::Float(v) => Some(v),
            PropertyValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_coord(&self) -> Option<(usize, usize)> {
        match *self {
            PropertyValue::Coord { x, y } => Some((x, y)),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value as f64)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

/// Named properties of a pixel or a pixel group.
pub type PropertyMap = HashMap<String, PropertyValue>;

/// A single object pixel.
///
/// Properties are evaluated once, when the pixel joins a group, and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
    pub value: f32,
    pub properties: PropertyMap,
}

impl Pixel {
    pub fn new(x: usize, y: usize, value: f32) -> Self {
        Self {
            x,
            y,
            value,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_properties(x: usize, y: usize, value: f32, properties: PropertyMap) -> Self {
        Self {
            x,
            y,
            value,
            properties,
        }
    }

    #[inline]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Identifier of a pixel group.
///
/// Segmentation assigns serial numbers in emission order starting at 1.
/// Groups split by the deblender derive their ids from the parent, so the
/// second sub-group of group 7 is displayed as `7_2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId {
    serial: u64,
    path: Vec<u32>,
}

impl GroupId {
    pub fn new(serial: u64) -> Self {
        Self {
            serial,
            path: Vec::new(),
        }
    }

    /// Id of the `sequence`-th (1-based) sub-group split from this group.
    pub fn child(&self, sequence: u32) -> Self {
        let mut path = self.path.clone();
        path.push(sequence);
        Self {
            serial: self.serial,
            path,
        }
    }

    /// Serial number of the segmented group this id descends from.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn is_derived(&self) -> bool {
        !self.path.is_empty()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serial)?;
        for sequence in &self.path {
            write!(f, "_{}", sequence)?;
        }
        Ok(())
    }
}

/// A closed, connected group of object pixels.
///
/// A `PixelGroup` is immutable: it is only ever built complete, with its
/// properties already folded over the final pixel list.
#[derive(Debug, Clone)]
pub struct PixelGroup {
    id: GroupId,
    pixels: Vec<Pixel>,
    properties: PropertyMap,
}

impl PixelGroup {
    /// Build a group and compute `group_properties` over `pixels`.
    pub fn new(id: GroupId, pixels: Vec<Pixel>, group_properties: &GroupProperties) -> Self {
        let properties = group_properties.fold(&pixels);
        Self {
            id,
            pixels,
            properties,
        }
    }

    #[inline]
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Pixels in discovery order (not necessarily raster order).
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    #[inline]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Bounding box of the pixel coordinates. Empty for an empty group.
    pub fn bbox(&self) -> Aabb {
        let mut bbox = Aabb::empty();
        for pixel in &self.pixels {
            bbox.include(pixel.x, pixel.y);
        }
        bbox
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    pub(crate) fn into_parts(self) -> (GroupId, Vec<Pixel>) {
        (self.id, self.pixels)
    }
}
