use geo::prelude::Area as GeoArea;

use crate::geometry::Geometry;
use crate::io::geo::geometry_to_geo;

/// Signed and unsigned planar area of a geometry.
///
/// Points and lines have zero area. Holes are subtracted from their shell.
///
/// # Examples
///
/// ```
/// use geodex::algorithm::geo::Area;
/// use geodex::geometry::Geometry;
///
/// let shell = Geometry::linear_ring(vec![(0., 0.), (5., 0.), (5., 6.), (0., 6.), (0., 0.)]).unwrap();
/// let polygon = Geometry::polygon(shell, vec![]).unwrap();
///
/// assert_eq!(polygon.signed_area(), 30.);
/// assert_eq!(polygon.unsigned_area(), 30.);
/// ```
pub trait Area {
    fn signed_area(&self) -> f64;

    fn unsigned_area(&self) -> f64;
}

impl Area for Geometry {
    fn signed_area(&self) -> f64 {
        geometry_to_geo(self).signed_area()
    }

    fn unsigned_area(&self) -> f64 {
        geometry_to_geo(self).unsigned_area()
    }
}
