use itertools::Itertools;

use crate::geometry::{Coord, CoordSeq, Geometry, GeometryValue, Polygon};
use crate::io::format_number;

fn coord_text(coord: Coord, precision: Option<usize>) -> String {
    format!(
        "{} {}",
        format_number(coord.x, precision),
        format_number(coord.y, precision)
    )
}

fn coords_text(coords: &CoordSeq, precision: Option<usize>) -> String {
    format!(
        "({})",
        coords.iter().map(|c| coord_text(c, precision)).join(", ")
    )
}

fn polygon_text(polygon: &Polygon, precision: Option<usize>) -> String {
    format!(
        "({})",
        polygon
            .rings()
            .map(|ring| coords_text(ring.coords(), precision))
            .join(", ")
    )
}

/// `( part, part, ... )`, or `EMPTY` when there are no parts.
fn parts_text<T>(parts: &[T], part: impl Fn(&T) -> String) -> String {
    if parts.is_empty() {
        "EMPTY".to_string()
    } else {
        format!("({})", parts.iter().map(part).join(", "))
    }
}

fn geometry_text(geom: &Geometry, precision: Option<usize>) -> String {
    let body = match geom.value() {
        GeometryValue::Point(point) => format!("({})", coord_text(point.coord(), precision)),
        GeometryValue::LineString(ls) => coords_text(ls.coords(), precision),
        GeometryValue::LinearRing(ring) => coords_text(ring.coords(), precision),
        GeometryValue::Polygon(polygon) => polygon_text(polygon, precision),
        GeometryValue::MultiPoint(points) => parts_text(points, |point| {
            format!("({})", coord_text(point.coord(), precision))
        }),
        GeometryValue::MultiLineString(lines) => {
            parts_text(lines, |ls| coords_text(ls.coords(), precision))
        }
        GeometryValue::MultiPolygon(polygons) => {
            parts_text(polygons, |polygon| polygon_text(polygon, precision))
        }
        GeometryValue::GeometryCollection(parts) => {
            parts_text(parts, |part| geometry_text(part, precision))
        }
    };
    format!(
        "{} {}",
        geom.geometry_type().name().to_ascii_uppercase(),
        body
    )
}

/// Encode a geometry as WKT. Any SRID is dropped.
///
/// `precision` caps the number of fractional digits; `None` writes every value in its shortest
/// round-trip form.
pub fn write_wkt(geom: &Geometry, precision: Option<usize>) -> String {
    geometry_text(geom, precision)
}

/// Encode a geometry as EWKT, prefixed with `SRID=<n>;` when the geometry has an SRID.
pub fn write_ewkt(geom: &Geometry, precision: Option<usize>) -> String {
    match geom.srid() {
        Some(srid) => format!("SRID={srid};{}", geometry_text(geom, precision)),
        None => geometry_text(geom, precision),
    }
}
