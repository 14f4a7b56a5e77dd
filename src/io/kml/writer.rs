use itertools::Itertools;

use crate::geometry::{CoordSeq, Geometry, GeometryValue, LinearRing, Point, Polygon};
use crate::io::format_number;

fn coordinates(coords: &CoordSeq, precision: Option<usize>) -> String {
    let tuples = coords
        .iter()
        .map(|c| {
            format!(
                "{},{}",
                format_number(c.x, precision),
                format_number(c.y, precision)
            )
        })
        .join(" ");
    format!("<coordinates>{tuples}</coordinates>")
}

fn point(point: &Point, precision: Option<usize>) -> String {
    format!(
        "<Point><coordinates>{},{}</coordinates></Point>",
        format_number(point.x, precision),
        format_number(point.y, precision)
    )
}

fn linear_ring(ring: &LinearRing, precision: Option<usize>) -> String {
    format!(
        "<LinearRing>{}</LinearRing>",
        coordinates(ring.coords(), precision)
    )
}

fn polygon(polygon: &Polygon, precision: Option<usize>) -> String {
    let mut out = format!(
        "<Polygon><outerBoundaryIs>{}</outerBoundaryIs>",
        linear_ring(polygon.shell(), precision)
    );
    for hole in polygon.holes() {
        out.push_str("<innerBoundaryIs>");
        out.push_str(&linear_ring(hole, precision));
        out.push_str("</innerBoundaryIs>");
    }
    out.push_str("</Polygon>");
    out
}

fn multi_geometry(parts: impl Iterator<Item = String>) -> String {
    format!("<MultiGeometry>{}</MultiGeometry>", parts.collect::<String>())
}

fn kml_element(geom: &Geometry, precision: Option<usize>) -> String {
    match geom.value() {
        GeometryValue::Point(p) => point(p, precision),
        GeometryValue::LineString(ls) => format!(
            "<LineString>{}</LineString>",
            coordinates(ls.coords(), precision)
        ),
        GeometryValue::LinearRing(ring) => linear_ring(ring, precision),
        GeometryValue::Polygon(p) => polygon(p, precision),
        GeometryValue::MultiPoint(points) => {
            multi_geometry(points.iter().map(|p| point(p, precision)))
        }
        GeometryValue::MultiLineString(lines) => multi_geometry(lines.iter().map(|ls| {
            format!(
                "<LineString>{}</LineString>",
                coordinates(ls.coords(), precision)
            )
        })),
        GeometryValue::MultiPolygon(polygons) => {
            multi_geometry(polygons.iter().map(|p| polygon(p, precision)))
        }
        GeometryValue::GeometryCollection(parts) => {
            multi_geometry(parts.iter().map(|part| kml_element(part, precision)))
        }
    }
}

/// Encode a geometry as a KML geometry element. Multi kinds and collections become
/// `<MultiGeometry>`. Any SRID is dropped.
pub fn write_kml(geom: &Geometry, precision: Option<usize>) -> String {
    kml_element(geom, precision)
}
