use std::path::Path;

use geojson::{GeoJson, JsonObject, Value};
use serde_json::Value as JsonValue;

use crate::error::{GeodexError, Result};
use crate::geometry::{
    Coord, CoordSeq, Geometry, GeometryValue, LineString, LinearRing, Point, Polygon,
};
use crate::io::{parse_srs_name, reject_at};

/// Byte offset of a 1-based line and column.
fn line_column_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Errors found after the JSON itself parsed have no byte position and are reported at 0.
fn semantic(message: impl Into<String>) -> GeodexError {
    GeodexError::parse(0, message)
}

fn position(values: &[f64]) -> Result<Coord> {
    match values {
        [x, y, ..] => Ok(Coord::new(*x, *y)),
        _ => Err(semantic(format!(
            "a position needs at least two numbers, got {}",
            values.len()
        ))),
    }
}

fn coord_seq(positions: &[Vec<f64>]) -> Result<CoordSeq> {
    positions
        .iter()
        .map(|p| position(p))
        .collect::<Result<Vec<_>>>()
        .map(CoordSeq::from)
}

fn line_string(positions: &[Vec<f64>]) -> Result<LineString> {
    LineString::try_new(coord_seq(positions)?).map_err(|e| reject_at(0, e))
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    let mut rings = rings
        .iter()
        .map(|ring| LinearRing::try_new(coord_seq(ring)?).map_err(|e| reject_at(0, e)));
    let shell = rings
        .next()
        .ok_or_else(|| semantic("a Polygon needs at least one ring"))??;
    Ok(Polygon::new(shell, rings.collect::<Result<_>>()?))
}

/// The SRID named by a `crs` member, if there is one.
fn crs_srid(members: Option<&JsonObject>) -> Option<i32> {
    members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .and_then(parse_srs_name)
}

/// Convert a parsed GeoJSON geometry object.
///
/// # Errors
///
/// - [`GeodexError::Parse`] if a position has fewer than two numbers or a ring or line is too
///   short
pub fn geometry_from_geojson(geometry: &geojson::Geometry) -> Result<Geometry> {
    let value = match &geometry.value {
        Value::Point(p) => GeometryValue::Point(position(p)?.into()),
        Value::MultiPoint(points) => GeometryValue::MultiPoint(
            points
                .iter()
                .map(|p| position(p).map(Point::from))
                .collect::<Result<_>>()?,
        ),
        Value::LineString(ls) => GeometryValue::LineString(line_string(ls)?),
        Value::MultiLineString(lines) => GeometryValue::MultiLineString(
            lines
                .iter()
                .map(|ls| line_string(ls))
                .collect::<Result<_>>()?,
        ),
        Value::Polygon(rings) => GeometryValue::Polygon(polygon(rings)?),
        Value::MultiPolygon(polygons) => GeometryValue::MultiPolygon(
            polygons
                .iter()
                .map(|rings| polygon(rings))
                .collect::<Result<_>>()?,
        ),
        Value::GeometryCollection(parts) => GeometryValue::GeometryCollection(
            parts
                .iter()
                .map(geometry_from_geojson)
                .collect::<Result<_>>()?,
        ),
    };
    Ok(Geometry::new(value).with_srid(crs_srid(geometry.foreign_members.as_ref())))
}

/// Process top-level GeoJSON items.
fn process_geojson(geojson: &GeoJson) -> Result<Geometry> {
    match geojson {
        GeoJson::Geometry(geometry) => geometry_from_geojson(geometry),
        GeoJson::Feature(feature) => {
            let geometry = feature
                .geometry
                .as_ref()
                .ok_or_else(|| semantic("feature has no geometry"))?;
            let geom = geometry_from_geojson(geometry)?;
            let srid = geom
                .srid()
                .or_else(|| crs_srid(feature.foreign_members.as_ref()));
            Ok(geom.with_srid(srid))
        }
        GeoJson::FeatureCollection(collection) => {
            // features with a null geometry are skipped
            let parts = collection
                .features
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .map(geometry_from_geojson)
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::new(GeometryValue::GeometryCollection(parts))
                .with_srid(crs_srid(collection.foreign_members.as_ref())))
        }
    }
}

/// Decode a GeoJSON geometry, Feature or FeatureCollection.
///
/// A Feature yields its geometry; a FeatureCollection yields a GeometryCollection of its
/// feature geometries.
///
/// # Errors
///
/// - [`GeodexError::Parse`] for malformed JSON, with the byte offset of the syntax error, and
///   for well-formed JSON that is not valid GeoJSON, including coordinate arrays nested to the
///   wrong depth for their type
pub fn read_geojson(text: &str) -> Result<Geometry> {
    let value: JsonValue = serde_json::from_str(text).map_err(|e| {
        GeodexError::parse(line_column_offset(text, e.line(), e.column()), e.to_string())
    })?;
    let geojson = GeoJson::from_json_value(value).map_err(|e| semantic(e.to_string()))?;
    process_geojson(&geojson)
}

/// Read a GeoJSON file.
pub fn read_geojson_file(path: impl AsRef<Path>) -> Result<Geometry> {
    let text = std::fs::read_to_string(path)?;
    read_geojson(&text)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geometry::GeometryType;
    use crate::test::{multipoint, point, polygon};

    #[test]
    fn point() {
        let geom = read_geojson(r#"{"type": "Point", "coordinates": [30, 10]}"#).unwrap();
        assert_eq!(geom, Geometry::from(point::p0()));
    }

    #[test]
    fn polygon_with_hole() {
        let text = r#"{"type": "Polygon", "coordinates": [
            [[35, 10], [45, 45], [15, 40], [10, 20], [35, 10]],
            [[20, 30], [35, 35], [30, 20], [20, 30]]
        ]}"#;
        assert_eq!(
            read_geojson(text).unwrap(),
            Geometry::from(polygon::p_with_hole())
        );
    }

    #[test]
    fn extra_ordinates_dropped() {
        let geom = read_geojson(r#"{"type": "MultiPoint", "coordinates": [[10, 40, 5], [40, 30, 6]]}"#)
            .unwrap();
        assert_eq!(geom, multipoint::mp0());
    }

    #[test]
    fn depth_mismatch() {
        for text in [
            r#"{"type": "Point", "coordinates": [[1, 2]]}"#,
            r#"{"type": "LineString", "coordinates": [1, 2]}"#,
            r#"{"type": "Polygon", "coordinates": [[1, 2], [3, 4]]}"#,
            r#"{"type": "MultiPolygon", "coordinates": [[[1, 2], [3, 4]]]}"#,
        ] {
            let err = read_geojson(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParseError, "{text}");
        }
    }

    #[test]
    fn short_position() {
        let err = read_geojson(r#"{"type": "Point", "coordinates": [1]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn syntax_error_offset() {
        let text = "{\"type\": \"Point\",\n \"coordinates\": [1, 2}";
        match read_geojson(text).unwrap_err() {
            GeodexError::Parse { offset, .. } => assert!(offset > 18 && offset <= text.len()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn named_crs() {
        let text = r#"{"type": "Point", "coordinates": [1, 2],
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}}"#;
        assert_eq!(read_geojson(text).unwrap().srid(), Some(3857));
    }

    #[test]
    fn feature_and_collection() {
        let feature = r#"{"type": "Feature", "properties": {"name": "a"},
            "geometry": {"type": "Point", "coordinates": [30, 10]}}"#;
        assert_eq!(read_geojson(feature).unwrap(), Geometry::from(point::p0()));

        let collection = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null, "geometry": {"type": "Point", "coordinates": [1, 2]}},
            {"type": "Feature", "properties": null, "geometry": null},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]}"#;
        let geom = read_geojson(collection).unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::GeometryCollection);
        let GeometryValue::GeometryCollection(parts) = geom.value() else {
            unreachable!()
        };
        assert_eq!(parts.len(), 2);

        let empty = r#"{"type": "Feature", "properties": null, "geometry": null}"#;
        assert_eq!(
            read_geojson(empty).unwrap_err().kind(),
            ErrorKind::ParseError
        );
    }

    #[test]
    fn offsets_from_line_and_column() {
        let text = "ab\ncd\nef";
        assert_eq!(line_column_offset(text, 1, 1), 0);
        assert_eq!(line_column_offset(text, 2, 2), 4);
        assert_eq!(line_column_offset(text, 3, 1), 6);
    }
}
