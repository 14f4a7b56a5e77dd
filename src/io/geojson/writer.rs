use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{JsonObject, Value};
use serde_json::json;

use crate::error::{GeodexError, Result};
use crate::geometry::{Coord, CoordSeq, Geometry, GeometryValue, Polygon};

fn position(coord: Coord) -> Vec<f64> {
    vec![coord.x, coord.y]
}

fn positions(coords: &CoordSeq) -> Vec<Vec<f64>> {
    coords.iter().map(position).collect()
}

fn polygon_rings(polygon: &Polygon) -> Vec<Vec<Vec<f64>>> {
    polygon.rings().map(|ring| positions(ring.coords())).collect()
}

fn geojson_value(value: &GeometryValue) -> Result<Value> {
    let value = match value {
        GeometryValue::Point(point) => Value::Point(position(point.coord())),
        GeometryValue::LineString(ls) => Value::LineString(positions(ls.coords())),
        GeometryValue::LinearRing(_) => {
            return Err(GeodexError::UnsupportedGeometry(
                "GeoJSON has no LinearRing type".into(),
            ))
        }
        GeometryValue::Polygon(polygon) => Value::Polygon(polygon_rings(polygon)),
        GeometryValue::MultiPoint(points) => {
            Value::MultiPoint(points.iter().map(|p| position(p.coord())).collect())
        }
        GeometryValue::MultiLineString(lines) => {
            Value::MultiLineString(lines.iter().map(|ls| positions(ls.coords())).collect())
        }
        GeometryValue::MultiPolygon(polygons) => {
            Value::MultiPolygon(polygons.iter().map(polygon_rings).collect())
        }
        GeometryValue::GeometryCollection(parts) => Value::GeometryCollection(
            parts
                .iter()
                .map(|part| geojson_value(part.value()).map(geojson::Geometry::new))
                .collect::<Result<_>>()?,
        ),
    };
    Ok(value)
}

/// Convert to a GeoJSON geometry object.
///
/// An SRID is written as a named `crs` member.
///
/// # Errors
///
/// - [`GeodexError::UnsupportedGeometry`] if a coordinate is NaN or infinite, which JSON cannot
///   represent, or for a LinearRing outside a polygon
pub fn geometry_to_geojson(geom: &Geometry) -> Result<geojson::Geometry> {
    if geom.coords().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err(GeodexError::UnsupportedGeometry(
            "GeoJSON cannot represent non-finite coordinates".into(),
        ));
    }

    let mut geometry = geojson::Geometry::new(geojson_value(geom.value())?);
    if let Some(srid) = geom.srid() {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            json!({"type": "name", "properties": {"name": format!("EPSG:{srid}")}}),
        );
        geometry.foreign_members = Some(members);
    }
    Ok(geometry)
}

/// Encode a geometry as a GeoJSON geometry object.
pub fn write_geojson(geom: &Geometry) -> Result<String> {
    Ok(serde_json::to_string(&geometry_to_geojson(geom)?)?)
}

/// Write a geometry to a GeoJSON file, replacing any existing file.
pub fn write_geojson_file(path: impl AsRef<Path>, geom: &Geometry) -> Result<()> {
    let geometry = geometry_to_geojson(geom)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &geometry)?;
    writer.flush()?;
    Ok(())
}
