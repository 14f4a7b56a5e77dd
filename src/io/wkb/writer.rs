use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{GeodexError, Result};
use crate::geometry::{CoordSeq, Geometry, GeometryValue, Polygon};
use crate::io::wkb::common::{Endianness, WKBType, EWKB_SRID_FLAG};

/// A byteorder marker type together with the WKB byte that announces it.
pub trait WkbByteOrder: ByteOrder {
    const ENDIANNESS: Endianness;
}

impl WkbByteOrder for BigEndian {
    const ENDIANNESS: Endianness = Endianness::BigEndian;
}

impl WkbByteOrder for LittleEndian {
    const ENDIANNESS: Endianness = Endianness::LittleEndian;
}

const HEADER_BYTES: usize = 1 + 4;

fn polygon_wkb_size(polygon: &Polygon) -> usize {
    HEADER_BYTES + 4 + polygon.rings().map(|r| 4 + r.num_coords() * 16).sum::<usize>()
}

/// The byte length of the plain WKB encoding of a geometry.
pub fn wkb_size(geom: &Geometry) -> usize {
    value_wkb_size(geom.value())
}

fn value_wkb_size(value: &GeometryValue) -> usize {
    match value {
        GeometryValue::Point(_) => HEADER_BYTES + 16,
        GeometryValue::LineString(ls) => HEADER_BYTES + 4 + ls.num_coords() * 16,
        GeometryValue::LinearRing(ring) => HEADER_BYTES + 4 + ring.num_coords() * 16,
        GeometryValue::Polygon(polygon) => polygon_wkb_size(polygon),
        GeometryValue::MultiPoint(points) => HEADER_BYTES + 4 + points.len() * (HEADER_BYTES + 16),
        GeometryValue::MultiLineString(lines) => {
            HEADER_BYTES
                + 4
                + lines
                    .iter()
                    .map(|ls| HEADER_BYTES + 4 + ls.num_coords() * 16)
                    .sum::<usize>()
        }
        GeometryValue::MultiPolygon(polygons) => {
            HEADER_BYTES + 4 + polygons.iter().map(polygon_wkb_size).sum::<usize>()
        }
        GeometryValue::GeometryCollection(parts) => {
            HEADER_BYTES + 4 + parts.iter().map(wkb_size).sum::<usize>()
        }
    }
}

fn write_header<B: WkbByteOrder, W: Write>(
    writer: &mut W,
    wkb_type: WKBType,
    srid: Option<i32>,
) -> Result<()> {
    writer.write_u8(B::ENDIANNESS.into())?;
    let mut word: u32 = wkb_type.into();
    if srid.is_some() {
        word |= EWKB_SRID_FLAG;
    }
    writer.write_u32::<B>(word)?;
    if let Some(srid) = srid {
        writer.write_i32::<B>(srid)?;
    }
    Ok(())
}

fn write_count<B: WkbByteOrder, W: Write>(writer: &mut W, count: usize) -> Result<()> {
    let count = u32::try_from(count).map_err(|_| {
        GeodexError::UnsupportedGeometry("more than u32::MAX elements in one geometry".into())
    })?;
    writer.write_u32::<B>(count)?;
    Ok(())
}

fn write_coords<B: WkbByteOrder, W: Write>(writer: &mut W, coords: &CoordSeq) -> Result<()> {
    write_count::<B, W>(writer, coords.len())?;
    for value in coords.as_slice() {
        writer.write_f64::<B>(*value)?;
    }
    Ok(())
}

fn write_polygon<B: WkbByteOrder, W: Write>(
    writer: &mut W,
    polygon: &Polygon,
    srid: Option<i32>,
) -> Result<()> {
    write_header::<B, W>(writer, WKBType::Polygon, srid)?;
    write_count::<B, W>(writer, polygon.num_holes() + 1)?;
    for ring in polygon.rings() {
        write_coords::<B, W>(writer, ring.coords())?;
    }
    Ok(())
}

/// Write a geometry to a Writer encoded as WKB.
///
/// When `srid` is given the type word carries the EWKB SRID flag and the SRID follows it.
/// Nested geometries never carry an SRID.
///
/// # Errors
///
/// - [`GeodexError::UnsupportedGeometry`] for a LinearRing outside a polygon, which WKB has no
///   type code for
pub fn write_geometry_as_wkb<B: WkbByteOrder, W: Write>(
    writer: &mut W,
    geom: &Geometry,
    srid: Option<i32>,
) -> Result<()> {
    match geom.value() {
        GeometryValue::Point(point) => {
            write_header::<B, W>(writer, WKBType::Point, srid)?;
            writer.write_f64::<B>(point.x)?;
            writer.write_f64::<B>(point.y)?;
        }
        GeometryValue::LineString(ls) => {
            write_header::<B, W>(writer, WKBType::LineString, srid)?;
            write_coords::<B, W>(writer, ls.coords())?;
        }
        GeometryValue::LinearRing(_) => {
            return Err(GeodexError::UnsupportedGeometry(
                "WKB has no LinearRing type".into(),
            ))
        }
        GeometryValue::Polygon(polygon) => write_polygon::<B, W>(writer, polygon, srid)?,
        GeometryValue::MultiPoint(points) => {
            write_header::<B, W>(writer, WKBType::MultiPoint, srid)?;
            write_count::<B, W>(writer, points.len())?;
            for point in points {
                write_header::<B, W>(writer, WKBType::Point, None)?;
                writer.write_f64::<B>(point.x)?;
                writer.write_f64::<B>(point.y)?;
            }
        }
        GeometryValue::MultiLineString(lines) => {
            write_header::<B, W>(writer, WKBType::MultiLineString, srid)?;
            write_count::<B, W>(writer, lines.len())?;
            for ls in lines {
                write_header::<B, W>(writer, WKBType::LineString, None)?;
                write_coords::<B, W>(writer, ls.coords())?;
            }
        }
        GeometryValue::MultiPolygon(polygons) => {
            write_header::<B, W>(writer, WKBType::MultiPolygon, srid)?;
            write_count::<B, W>(writer, polygons.len())?;
            for polygon in polygons {
                write_polygon::<B, W>(writer, polygon, None)?;
            }
        }
        GeometryValue::GeometryCollection(parts) => {
            write_header::<B, W>(writer, WKBType::GeometryCollection, srid)?;
            write_count::<B, W>(writer, parts.len())?;
            for part in parts {
                write_geometry_as_wkb::<B, W>(writer, part, None)?;
            }
        }
    }
    Ok(())
}

fn write_to_vec(geom: &Geometry, endianness: Endianness, srid: Option<i32>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(wkb_size(geom) + srid.map_or(0, |_| 4))?;
    match endianness {
        Endianness::BigEndian => write_geometry_as_wkb::<BigEndian, _>(&mut buf, geom, srid)?,
        Endianness::LittleEndian => {
            write_geometry_as_wkb::<LittleEndian, _>(&mut buf, geom, srid)?
        }
    }
    Ok(buf)
}

/// Encode a geometry as plain WKB. Any SRID is dropped.
pub fn write_wkb(geom: &Geometry, endianness: Endianness) -> Result<Vec<u8>> {
    write_to_vec(geom, endianness, None)
}

/// Encode a geometry as EWKB, flagging and writing the SRID when the geometry has one.
pub fn write_ewkb(geom: &Geometry, endianness: Endianness) -> Result<Vec<u8>> {
    write_to_vec(geom, endianness, geom.srid())
}
