//! Reducers computing named properties of a pixel group.
//!
//! A [`GroupProperty`] is a fold over the group's pixel list: `init()` gives
//! the starting accumulator and `next()` combines it with one pixel. Group
//! properties are never updated incrementally. Whenever a group is emitted by
//! segmentation or created by a deblending split, every registered reducer is
//! folded again over the final pixel list, so `next` must depend only on its
//! arguments.

use std::fmt;
use std::sync::Arc;

use crate::pixel_group::{Pixel, PropertyMap, PropertyValue};

/// Fold over the pixels of a group.
pub trait GroupProperty: Send + Sync {
    fn init(&self) -> PropertyValue;

    fn next(&self, acc: PropertyValue, pixel: &Pixel) -> PropertyValue;
}

/// Source of a per-pixel quantity read by the standard reducers.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelField {
    /// The pixel's own value.
    Value,
    /// A named pixel property.
    Property(String),
}

impl PixelField {
    pub fn property(name: impl Into<String>) -> Self {
        PixelField::Property(name.into())
    }

    fn read(&self, pixel: &Pixel) -> Option<PropertyValue> {
        match self {
            PixelField::Value => Some(PropertyValue::Float(pixel.value as f64)),
            PixelField::Property(name) => pixel.property(name).copied(),
        }
    }

    fn read_f64(&self, pixel: &Pixel) -> Option<f64> {
        self.read(pixel).and_then(|v| v.as_f64())
    }

    fn read_bool(&self, pixel: &Pixel) -> Option<bool> {
        self.read(pixel).and_then(|v| v.as_bool())
    }
}

/// How [`StandardProperty::ExternalFlag`] combines pixel flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOp {
    And,
    Or,
}

/// Built-in reducers.
///
/// Reducers reading a [`PixelField`] skip pixels where the field is missing
/// or has the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub enum StandardProperty {
    /// Componentwise minimum of pixel coordinates, as [`PropertyValue::Coord`].
    MinXY,
    /// Componentwise maximum of pixel coordinates, as [`PropertyValue::Coord`].
    MaxXY,
    /// True if any pixel lies on or beyond the given limits.
    BoundaryFlag {
        x_min: usize,
        y_min: usize,
        x_max: usize,
        y_max: usize,
    },
    /// Boolean fold of a per-pixel flag.
    ExternalFlag { field: PixelField, op: FlagOp },
    /// Sum of a numeric field, as [`PropertyValue::Float`].
    Sum { field: PixelField },
    /// Field-weighted centroid, as [`PropertyValue::Centroid`].
    WeightedCentroid { field: PixelField },
    /// Pixel with the largest field value; later pixels win ties.
    PeakPixel { field: PixelField },
}

impl GroupProperty for StandardProperty {
    fn init(&self) -> PropertyValue {
        match self {
            StandardProperty::MinXY => PropertyValue::Coord {
                x: usize::MAX,
                y: usize::MAX,
            },
            StandardProperty::MaxXY => PropertyValue::Coord { x: 0, y: 0 },
            StandardProperty::BoundaryFlag { .. } => PropertyValue::Bool(false),
            StandardProperty::ExternalFlag { op, .. } => PropertyValue::Bool(*op == FlagOp::And),
            StandardProperty::Sum { .. } => PropertyValue::Float(0.0),
            StandardProperty::WeightedCentroid { .. } => PropertyValue::Centroid {
                x: 0.0,
                y: 0.0,
                total: 0.0,
            },
            StandardProperty::PeakPixel { .. } => PropertyValue::Peak {
                x: 0,
                y: 0,
                value: f64::NEG_INFINITY,
            },
        }
    }

    fn next(&self, acc: PropertyValue, pixel: &Pixel) -> PropertyValue {
        match self {
            StandardProperty::MinXY => {
                let (x, y) = acc.as_coord().unwrap_or((usize::MAX, usize::MAX));
                PropertyValue::Coord {
                    x: x.min(pixel.x),
                    y: y.min(pixel.y),
                }
            }
            StandardProperty::MaxXY => {
                let (x, y) = acc.as_coord().unwrap_or((0, 0));
                PropertyValue::Coord {
                    x: x.max(pixel.x),
                    y: y.max(pixel.y),
                }
            }
            StandardProperty::BoundaryFlag {
                x_min,
                y_min,
                x_max,
                y_max,
            } => {
                let edge = pixel.x <= *x_min
                    || pixel.y <= *y_min
                    || pixel.x >= *x_max
                    || pixel.y >= *y_max;
                PropertyValue::Bool(acc.as_bool().unwrap_or(false) || edge)
            }
            StandardProperty::ExternalFlag { field, op } => {
                let current = acc.as_bool().unwrap_or(*op == FlagOp::And);
                let combined = match (field.read_bool(pixel), op) {
                    (Some(flag), FlagOp::And) => current && flag,
                    (Some(flag), FlagOp::Or) => current || flag,
                    (None, _) => current,
                };
                PropertyValue::Bool(combined)
            }
            StandardProperty::Sum { field } => {
                let sum = acc.as_f64().unwrap_or(0.0);
                PropertyValue::Float(sum + field.read_f64(pixel).unwrap_or(0.0))
            }
            StandardProperty::WeightedCentroid { field } => {
                let PropertyValue::Centroid { x, y, total } = acc else {
                    return self.next(self.init(), pixel);
                };
                let Some(weight) = field.read_f64(pixel) else {
                    return acc;
                };
                let total = total + weight;
                if total == 0.0 {
                    return PropertyValue::Centroid { x, y, total };
                }
                PropertyValue::Centroid {
                    x: x + (pixel.x as f64 - x) * weight / total,
                    y: y + (pixel.y as f64 - y) * weight / total,
                    total,
                }
            }
            StandardProperty::PeakPixel { field } => {
                let Some(value) = field.read_f64(pixel) else {
                    return acc;
                };
                match acc {
                    PropertyValue::Peak { value: best, .. } if value < best => acc,
                    _ => PropertyValue::Peak {
                        x: pixel.x,
                        y: pixel.y,
                        value,
                    },
                }
            }
        }
    }
}

/// Caller-supplied reducer built from an `(init, next)` function pair.
pub struct FnProperty<I, N> {
    init: I,
    next: N,
}

impl<I, N> FnProperty<I, N>
where
    I: Fn() -> PropertyValue + Send + Sync,
    N: Fn(PropertyValue, &Pixel) -> PropertyValue + Send + Sync,
{
    pub fn new(init: I, next: N) -> Self {
        Self { init, next }
    }
}

impl<I, N> GroupProperty for FnProperty<I, N>
where
    I: Fn() -> PropertyValue + Send + Sync,
    N: Fn(PropertyValue, &Pixel) -> PropertyValue + Send + Sync,
{
    fn init(&self) -> PropertyValue {
        (self.init)()
    }

    fn next(&self, acc: PropertyValue, pixel: &Pixel) -> PropertyValue {
        (self.next)(acc, pixel)
    }
}

/// Ordered set of named reducers applied to every finished group.
#[derive(Clone, Default)]
pub struct GroupProperties {
    entries: Vec<(String, Arc<dyn GroupProperty>)>,
}

impl GroupProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `property` under `name`, replacing any reducer with that name.
    pub fn insert(&mut self, name: impl Into<String>, property: impl GroupProperty + 'static) {
        self.insert_shared(name, Arc::new(property));
    }

    pub fn insert_shared(&mut self, name: impl Into<String>, property: Arc<dyn GroupProperty>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = property,
            None => self.entries.push((name, property)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, property: impl GroupProperty + 'static) -> Self {
        self.insert(name, property);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Fold every reducer over `pixels` from scratch.
    pub fn fold(&self, pixels: &[Pixel]) -> PropertyMap {
        self.entries
            .iter()
            .map(|(name, property)| {
                let value = pixels
                    .iter()
                    .fold(property.init(), |acc, pixel| property.next(acc, pixel));
                (name.clone(), value)
            })
            .collect()
    }
}

impl fmt::Debug for GroupProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
