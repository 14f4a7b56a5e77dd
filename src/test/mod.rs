pub(crate) mod multilinestring;
pub(crate) mod multipoint;
pub(crate) mod polygon;

use crate::geometry::{Geometry, GeometryType, GeometryValue};
use crate::io::Format;

/// One geometry of every kind, plus the empty collections, used for round trip tests.
pub(crate) fn all_geometries() -> Vec<Geometry> {
    vec![
        point::p0().into(),
        point::p1().into(),
        linestring::ls0().into(),
        linestring::ls1().into(),
        linearring::lr0().into(),
        polygon::p0().into(),
        polygon::p_with_hole().into(),
        multipoint::mp0(),
        multipoint::empty(),
        multilinestring::mls0(),
        multilinestring::empty(),
        multipolygon::mpoly0(),
        multipolygon::empty(),
        geometrycollection::gc0(),
        geometrycollection::empty(),
    ]
}

/// What reading back `geom` written as `format` yields, or `None` when the format cannot
/// express it.
pub(crate) fn expected_round_trip(geom: &Geometry, format: Format) -> Option<Geometry> {
    let empty_multi = match geom.value() {
        GeometryValue::MultiPoint(parts) => parts.is_empty(),
        GeometryValue::MultiLineString(parts) => parts.is_empty(),
        GeometryValue::MultiPolygon(parts) => parts.is_empty(),
        _ => false,
    };
    match format {
        Format::Wkb | Format::Ewkb | Format::GeoJson
            if geom.geometry_type() == GeometryType::LinearRing =>
        {
            None
        }
        // an empty MultiGeometry has no parts to infer a multi kind from
        Format::Kml if empty_multi => Some(GeometryValue::GeometryCollection(vec![]).into()),
        _ => Some(geom.clone()),
    }
}
