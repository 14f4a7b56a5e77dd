use crate::geometry::{Coord, Geometry, GeometryValue, LineString, LinearRing, Point, Polygon};

/// Convert a [`Coord`] to a [`geo::Coord`].
pub fn coord_to_geo(coord: Coord) -> geo::Coord {
    geo::Coord {
        x: coord.x,
        y: coord.y,
    }
}

/// Convert a [`Point`] to a [`geo::Point`].
pub fn point_to_geo(point: &Point) -> geo::Point {
    geo::Point(coord_to_geo(point.coord()))
}

/// Convert a [`LineString`] to a [`geo::LineString`].
pub fn line_string_to_geo(line_string: &LineString) -> geo::LineString {
    geo::LineString::new(line_string.coords().iter().map(coord_to_geo).collect())
}

/// Convert a [`LinearRing`] to a closed [`geo::LineString`].
pub fn linear_ring_to_geo(ring: &LinearRing) -> geo::LineString {
    geo::LineString::new(ring.coords().iter().map(coord_to_geo).collect())
}

/// Convert a [`Polygon`] to a [`geo::Polygon`].
pub fn polygon_to_geo(polygon: &Polygon) -> geo::Polygon {
    let exterior = linear_ring_to_geo(polygon.shell());
    let interiors = polygon.holes().iter().map(linear_ring_to_geo).collect();
    geo::Polygon::new(exterior, interiors)
}

/// Convert any [`Geometry`] to a [`geo::Geometry`].
///
/// A LinearRing becomes a closed LineString. The SRID is dropped.
pub fn geometry_to_geo(geometry: &Geometry) -> geo::Geometry {
    match geometry.value() {
        GeometryValue::Point(geom) => geo::Geometry::Point(point_to_geo(geom)),
        GeometryValue::LineString(geom) => geo::Geometry::LineString(line_string_to_geo(geom)),
        GeometryValue::LinearRing(geom) => geo::Geometry::LineString(linear_ring_to_geo(geom)),
        GeometryValue::Polygon(geom) => geo::Geometry::Polygon(polygon_to_geo(geom)),
        GeometryValue::MultiPoint(geom) => geo::Geometry::MultiPoint(geo::MultiPoint::new(
            geom.iter().map(point_to_geo).collect(),
        )),
        GeometryValue::MultiLineString(geom) => geo::Geometry::MultiLineString(
            geo::MultiLineString::new(geom.iter().map(line_string_to_geo).collect()),
        ),
        GeometryValue::MultiPolygon(geom) => geo::Geometry::MultiPolygon(geo::MultiPolygon::new(
            geom.iter().map(polygon_to_geo).collect(),
        )),
        GeometryValue::GeometryCollection(geom) => geo::Geometry::GeometryCollection(
            geo::GeometryCollection::new_from(geom.iter().map(geometry_to_geo).collect()),
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{multipolygon, polygon};

    #[test]
    fn polygon_keeps_rings() {
        let geo_polygon = polygon_to_geo(&polygon::p_with_hole());
        assert_eq!(geo_polygon.exterior().0.len(), 5);
        assert_eq!(geo_polygon.interiors().len(), 1);
    }

    #[test]
    fn multi_polygon_converts() {
        match geometry_to_geo(&multipolygon::mpoly0()) {
            geo::Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
