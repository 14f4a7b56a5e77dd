//! Derived properties of geometries.

pub mod geo;
pub mod native;
