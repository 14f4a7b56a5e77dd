//! Algorithms implemented on [`Geometry`](crate::geometry::Geometry) using georust/geo
//! algorithms.

/// Calculate the area of the surface of a `Geometry`.
pub mod area;
pub use area::Area;

/// Calculate the centroid of a `Geometry`.
pub mod centroid;
pub use centroid::Centroid;

/// Calculate the length of a `Geometry`.
pub mod euclidean_length;
pub use euclidean_length::EuclideanLength;
