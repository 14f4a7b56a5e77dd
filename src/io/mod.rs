//! Readers and writers for the supported interchange formats.
//!
//! Every format is reached through [`read`] and [`write`] with an explicit [`Format`]. The
//! per-format modules expose the same functionality with format-specific entry points.
//!
//! ```
//! use geodex::io::{read_str, write_string, Format, WriteOptions};
//!
//! let geom = read_str("SRID=4326;POINT (30 10)", Format::Ewkt).unwrap();
//! assert_eq!(geom.srid(), Some(4326));
//! let wkt = write_string(&geom, Format::Wkt, &WriteOptions::default()).unwrap();
//! assert_eq!(wkt, "POINT (30 10)");
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{GeodexError, Result};
use crate::geometry::Geometry;

pub use wkb::Endianness;

pub mod geo;
pub mod geojson;
pub mod gml;
pub mod kml;
pub mod wkb;
pub mod wkt;
mod xml;

/// Interchange formats, with their stable integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Format {
    Wkt = 0,
    Wkb = 1,
    GeoJson = 2,
    Ewkt = 3,
    Ewkb = 4,
    Kml = 5,
    Gml = 6,
    Gml2 = 7,
}

impl Format {
    /// Whether this format is a binary encoding.
    pub fn is_binary(&self) -> bool {
        matches!(self, Format::Wkb | Format::Ewkb)
    }
}

/// Options for [`write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Byte order of the binary formats.
    pub endianness: Endianness,
    /// Maximum number of fractional digits in the text formats. `None` writes the shortest
    /// representation that reads back to the same value.
    pub precision: Option<usize>,
}

impl WriteOptions {
    pub fn with_endianness(self, endianness: Endianness) -> Self {
        Self { endianness, ..self }
    }

    pub fn with_precision(self, precision: Option<usize>) -> Self {
        Self { precision, ..self }
    }
}

/// Decode a geometry.
///
/// Text input may be NUL-terminated; anything from the first NUL on is ignored.
///
/// # Errors
///
/// - [`GeodexError::Parse`] if the input is malformed or not valid UTF-8 for a text format
pub fn read(data: &[u8], format: Format) -> Result<Geometry> {
    if format.is_binary() {
        return wkb::read_wkb(data);
    }
    let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    let text = std::str::from_utf8(&data[..end])
        .map_err(|e| GeodexError::parse(e.valid_up_to(), "input is not valid UTF-8"))?;
    read_str(text, format)
}

/// Decode a geometry from one of the text formats.
pub fn read_str(text: &str, format: Format) -> Result<Geometry> {
    let text = match text.find('\0') {
        Some(end) => &text[..end],
        None => text,
    };
    match format {
        Format::Wkt | Format::Ewkt => wkt::read_wkt(text),
        Format::GeoJson => geojson::read_geojson(text),
        Format::Kml => kml::read_kml(text),
        Format::Gml | Format::Gml2 => gml::read_gml(text),
        Format::Wkb | Format::Ewkb => Err(GeodexError::invalid(
            "binary formats must be read with `read`",
        )),
    }
}

/// Encode a geometry.
///
/// Only the SRID of `geom` itself is written, and only by the formats that carry one (EWKT,
/// EWKB, GeoJSON, GML and GML2). SRIDs set on the members of a GeometryCollection are dropped
/// by every format.
///
/// # Errors
///
/// - [`GeodexError::UnsupportedGeometry`] if the format cannot express the geometry, such as a
///   LinearRing outside a polygon in WKB, EWKB or GeoJSON, or a non-finite coordinate in GeoJSON
pub fn write(geom: &Geometry, format: Format, options: &WriteOptions) -> Result<Vec<u8>> {
    match format {
        Format::Wkb => wkb::write_wkb(geom, options.endianness),
        Format::Ewkb => wkb::write_ewkb(geom, options.endianness),
        _ => write_string(geom, format, options).map(String::into_bytes),
    }
}

/// Encode a geometry in one of the text formats. SRIDs and errors follow [`write`].
pub fn write_string(geom: &Geometry, format: Format, options: &WriteOptions) -> Result<String> {
    let precision = options.precision;
    match format {
        Format::Wkt => Ok(wkt::write_wkt(geom, precision)),
        Format::Ewkt => Ok(wkt::write_ewkt(geom, precision)),
        Format::GeoJson => geojson::write_geojson(geom),
        Format::Kml => Ok(kml::write_kml(geom, precision)),
        Format::Gml => Ok(gml::write_gml(geom, gml::GmlVersion::V3, precision)),
        Format::Gml2 => Ok(gml::write_gml(geom, gml::GmlVersion::V2, precision)),
        Format::Wkb | Format::Ewkb => Err(GeodexError::invalid(
            "binary formats must be written with `write`",
        )),
    }
}

/// Format a coordinate value for the text writers.
pub(crate) fn format_number(value: f64, precision: Option<usize>) -> String {
    match precision {
        None => value.to_string(),
        Some(precision) => {
            let out = format!("{value:.precision$}");
            if out.contains('.') {
                out.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                out
            }
        }
    }
}

/// Re-tag a geometry constructor failure as a parse failure at `offset`.
pub(crate) fn reject_at(offset: usize, err: GeodexError) -> GeodexError {
    match err {
        GeodexError::InvalidArgument(message) => GeodexError::parse(offset, message),
        other => other,
    }
}

/// The SRID named by a CRS identifier such as `EPSG:4326` or `urn:ogc:def:crs:EPSG::4326`.
pub(crate) fn parse_srs_name(name: &str) -> Option<i32> {
    let code = name.rsplit([':', '/', '#']).next()?;
    match code.parse() {
        Ok(srid) => Some(srid),
        Err(_) if code.eq_ignore_ascii_case("CRS84") => Some(4326),
        Err(_) => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geometry::{GeometryType, GeometryValue};
    use crate::test::{all_geometries, expected_round_trip};

    #[test]
    fn format_codes() {
        assert_eq!(u8::from(Format::Wkt), 0);
        assert_eq!(u8::from(Format::Gml2), 7);
        assert_eq!(Format::try_from(2u8).unwrap(), Format::GeoJson);
        assert!(Format::try_from(8u8).is_err());
    }

    #[test]
    fn every_format_round_trips() {
        let formats = [
            Format::Wkt,
            Format::Wkb,
            Format::GeoJson,
            Format::Ewkt,
            Format::Ewkb,
            Format::Kml,
            Format::Gml,
            Format::Gml2,
        ];
        for format in formats {
            for geom in all_geometries() {
                let written = write(&geom, format, &WriteOptions::default());
                match expected_round_trip(&geom, format) {
                    Some(expected) => {
                        let back = read(&written.unwrap(), format).unwrap();
                        assert_eq!(back, expected, "{format:?}");
                    }
                    None => assert_eq!(
                        written.unwrap_err().kind(),
                        ErrorKind::UnsupportedGeometry,
                        "{format:?}"
                    ),
                }
            }
        }
    }

    #[test]
    fn codec_chain_preserves_geometry() {
        let wkt = "GEOMETRYCOLLECTION (POINT (4 6), LINESTRING (4 6, 7 10), \
                   MULTIPOLYGON (((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 2 1, 2 2, 1 1))))";
        let original = read_str(wkt, Format::Wkt).unwrap().with_srid(Some(3857));
        let mut geom = original.clone();
        for format in [
            Format::Ewkb,
            Format::GeoJson,
            Format::Gml2,
            Format::Gml,
            Format::Ewkt,
        ] {
            let bytes = write(&geom, format, &WriteOptions::default()).unwrap();
            geom = read(&bytes, format).unwrap();
        }
        assert_eq!(geom, original);
        assert_eq!(
            write_string(&geom, Format::Wkt, &WriteOptions::default()).unwrap(),
            "GEOMETRYCOLLECTION (POINT (4 6), LINESTRING (4 6, 7 10), \
             MULTIPOLYGON (((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 2 1, 2 2, 1 1))))"
        );
    }

    #[test]
    fn member_srids_are_dropped() {
        let geom = Geometry::collection(
            GeometryType::GeometryCollection,
            vec![Geometry::point(1., 2.).with_srid(Some(3857))],
        )
        .unwrap()
        .with_srid(Some(4326));
        for format in [Format::Ewkb, Format::Ewkt, Format::GeoJson, Format::Gml] {
            let back = read(&write(&geom, format, &WriteOptions::default()).unwrap(), format)
                .unwrap();
            assert_eq!(back.srid(), Some(4326), "{format:?}");
            let GeometryValue::GeometryCollection(parts) = back.value() else {
                panic!("expected a collection");
            };
            assert_eq!(parts[0].srid(), None, "{format:?}");
        }
    }

    #[test]
    fn nul_terminated_text() {
        let geom = read(b"POINT (1 2)\0garbage", Format::Wkt).unwrap();
        assert_eq!(geom, Geometry::point(1., 2.));
    }

    #[test]
    fn invalid_utf8() {
        let err = read(&[b'P', 0xFF, 0xFE], Format::Wkt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(30., None), "30");
        assert_eq!(format_number(0.1, None), "0.1");
        assert_eq!(format_number(1.23456, Some(2)), "1.23");
        assert_eq!(format_number(2.5, Some(3)), "2.5");
        assert_eq!(format_number(7., Some(0)), "7");
    }

    #[test]
    fn srs_names() {
        assert_eq!(parse_srs_name("EPSG:4326"), Some(4326));
        assert_eq!(parse_srs_name("urn:ogc:def:crs:EPSG::3857"), Some(3857));
        assert_eq!(
            parse_srs_name("http://www.opengis.net/gml/srs/epsg.xml#27700"),
            Some(27700)
        );
        assert_eq!(parse_srs_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(parse_srs_name("local"), None);
    }
}
