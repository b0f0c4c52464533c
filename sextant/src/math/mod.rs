//! Geometry helpers.

pub mod bbox;

pub use bbox::Aabb;
