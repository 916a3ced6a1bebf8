//! Geo module - boundary loading and planar geometry

mod boundary;
pub mod geometry;

pub use boundary::{Boundaries, BoundaryFeature, PropertyKeys};
