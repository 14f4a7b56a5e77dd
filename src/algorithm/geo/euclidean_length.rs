use geo::EuclideanLength as _EuclideanLength;

use crate::geometry::{Geometry, GeometryValue, Polygon};
use crate::io::geo::{line_string_to_geo, linear_ring_to_geo};

pub trait EuclideanLength {
    /// Planar length of the geometry.
    ///
    /// Points have zero length; polygons report the perimeter of every ring.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodex::algorithm::geo::EuclideanLength;
    /// use geodex::geometry::Geometry;
    ///
    /// let line_string = Geometry::line_string(vec![(40.02, 116.34), (42.02, 116.34)]).unwrap();
    ///
    /// assert_eq!(2., line_string.euclidean_length());
    /// ```
    fn euclidean_length(&self) -> f64;
}

fn polygon_perimeter(polygon: &Polygon) -> f64 {
    polygon
        .rings()
        .map(|ring| linear_ring_to_geo(ring).euclidean_length())
        .sum()
}

impl EuclideanLength for Geometry {
    fn euclidean_length(&self) -> f64 {
        match self.value() {
            GeometryValue::Point(_) | GeometryValue::MultiPoint(_) => 0.,
            GeometryValue::LineString(ls) => line_string_to_geo(ls).euclidean_length(),
            GeometryValue::LinearRing(ring) => linear_ring_to_geo(ring).euclidean_length(),
            GeometryValue::Polygon(polygon) => polygon_perimeter(polygon),
            GeometryValue::MultiLineString(lines) => lines
                .iter()
                .map(|ls| line_string_to_geo(ls).euclidean_length())
                .sum(),
            GeometryValue::MultiPolygon(polygons) => polygons.iter().map(polygon_perimeter).sum(),
            GeometryValue::GeometryCollection(parts) => {
                parts.iter().map(|g| g.euclidean_length()).sum()
            }
        }
    }
}
