use geo::algorithm::centroid::Centroid as GeoCentroid;

use crate::geometry::{Coord, Geometry};
use crate::io::geo::geometry_to_geo;

/// Calculation of the centroid.
///
/// The centroid is the arithmetic mean position of all points in the shape, weighted by the
/// highest dimension present (area over length over points).
///
/// # Examples
///
/// ```
/// use geodex::algorithm::geo::Centroid;
/// use geodex::geometry::{Coord, Geometry};
///
/// // rhombus shaped polygon
/// let shell = Geometry::linear_ring(vec![
///     (-2., 1.),
///     (1., 3.),
///     (4., 1.),
///     (1., -1.),
///     (-2., 1.),
/// ])
/// .unwrap();
/// let polygon = Geometry::polygon(shell, vec![]).unwrap();
///
/// assert_eq!(Some(Coord::new(1., 1.)), polygon.centroid());
/// ```
pub trait Centroid {
    /// Returns `None` for empty geometries.
    fn centroid(&self) -> Option<Coord>;
}

impl Centroid for Geometry {
    fn centroid(&self) -> Option<Coord> {
        geometry_to_geo(self)
            .centroid()
            .map(|p| Coord::new(p.x(), p.y()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::GeometryType;
    use crate::test::polygon;

    #[test]
    fn square_centroid() {
        let square: Geometry = polygon::square().into();
        assert_eq!(square.centroid(), Some(Coord::new(5., 5.)));
    }

    #[test]
    fn empty_has_no_centroid() {
        let empty = Geometry::collection(GeometryType::GeometryCollection, vec![]).unwrap();
        assert_eq!(empty.centroid(), None);
    }
}
