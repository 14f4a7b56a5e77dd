use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::error::{GeodexError, Result};
use crate::geometry::{CoordSeq, Geometry, GeometryValue, LineString, LinearRing, Point, Polygon};
use crate::io::reject_at;
use crate::io::wkb::common::{Endianness, WKBType, WkbHeader};

/// Deepest collection nesting accepted before the input is rejected.
const MAX_DEPTH: usize = 64;

/// Smallest possible encoding of a nested 2D point.
const MIN_POINT_BYTES: usize = 1 + 4 + 16;
/// Smallest possible encoding of any nested geometry: a header and an empty count.
const MIN_GEOMETRY_BYTES: usize = 1 + 4 + 4;

/// Decode a WKB or EWKB buffer.
///
/// The reader does not need to be told which of the two it is looking at: an SRID is read
/// whenever the type word flags one. Z ordinates are read and dropped.
///
/// # Errors
///
/// - [`GeodexError::Parse`] on an invalid byte order marker or type word, on M ordinates, on
///   truncated input, and on bytes left over after the geometry
/// - [`GeodexError::OutOfMemory`] if the coordinate storage cannot be allocated
pub fn read_wkb(buf: &[u8]) -> Result<Geometry> {
    let mut reader = WkbReader {
        cursor: Cursor::new(buf),
    };
    let geom = reader.read_geometry(0)?;
    let end = reader.position();
    if end != buf.len() {
        return Err(GeodexError::parse(
            end,
            format!("{} trailing bytes after geometry", buf.len() - end),
        ));
    }
    Ok(geom)
}

fn truncated(offset: usize) -> GeodexError {
    GeodexError::parse(offset, "unexpected end of input")
}

struct WkbReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> WkbReader<'a> {
    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn read_u8(&mut self) -> Result<u8> {
        let offset = self.position();
        self.cursor.read_u8().map_err(|_| truncated(offset))
    }

    fn read_u32(&mut self, order: Endianness) -> Result<u32> {
        let offset = self.position();
        match order {
            Endianness::BigEndian => self.cursor.read_u32::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_u32::<LittleEndian>(),
        }
        .map_err(|_| truncated(offset))
    }

    fn read_f64(&mut self, order: Endianness) -> Result<f64> {
        let offset = self.position();
        match order {
            Endianness::BigEndian => self.cursor.read_f64::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_f64::<LittleEndian>(),
        }
        .map_err(|_| truncated(offset))
    }

    /// Read an element count and check that the buffer could hold that many elements of at
    /// least `item_bytes` each.
    fn read_count(&mut self, order: Endianness, item_bytes: usize, what: &str) -> Result<usize> {
        let offset = self.position();
        let count = self.read_u32(order)? as usize;
        let remaining = self.remaining();
        match count.checked_mul(item_bytes) {
            Some(needed) if needed <= remaining => Ok(count),
            _ => Err(GeodexError::parse(
                offset,
                format!("{what} count {count} exceeds the {remaining} remaining bytes"),
            )),
        }
    }

    fn read_coords(&mut self, order: Endianness, dims: usize, count: usize) -> Result<CoordSeq> {
        let mut values = Vec::new();
        values.try_reserve_exact(count * 2)?;
        for _ in 0..count {
            values.push(self.read_f64(order)?);
            values.push(self.read_f64(order)?);
            for _ in 2..dims {
                self.read_f64(order)?;
            }
        }
        CoordSeq::try_new(values)
    }

    fn read_line_string(&mut self, order: Endianness, dims: usize) -> Result<LineString> {
        let offset = self.position();
        let count = self.read_count(order, dims * 8, "coordinate")?;
        let coords = self.read_coords(order, dims, count)?;
        LineString::try_new(coords).map_err(|e| reject_at(offset, e))
    }

    fn read_polygon(&mut self, order: Endianness, dims: usize) -> Result<Polygon> {
        let offset = self.position();
        let num_rings = self.read_count(order, 4, "ring")?;
        if num_rings == 0 {
            return Err(GeodexError::parse(offset, "polygon has no rings"));
        }
        let mut rings = Vec::new();
        rings.try_reserve_exact(num_rings)?;
        for _ in 0..num_rings {
            let ring_offset = self.position();
            let count = self.read_count(order, dims * 8, "coordinate")?;
            let coords = self.read_coords(order, dims, count)?;
            rings.push(LinearRing::try_new(coords).map_err(|e| reject_at(ring_offset, e))?);
        }
        let mut rings = rings.into_iter();
        let shell = rings
            .next()
            .ok_or_else(|| GeodexError::parse(offset, "polygon has no rings"))?;
        Ok(Polygon::new(shell, rings.collect()))
    }

    /// Read `count` nested geometries and unwrap each with `extract`.
    fn read_members<T>(
        &mut self,
        count: usize,
        depth: usize,
        parent: WKBType,
        extract: impl Fn(GeometryValue) -> std::result::Result<T, GeometryValue>,
    ) -> Result<Vec<T>> {
        let mut members = Vec::new();
        members.try_reserve_exact(count)?;
        for _ in 0..count {
            let offset = self.position();
            let value = self.read_geometry(depth + 1)?.into_value();
            let member = extract(value).map_err(|other| {
                GeodexError::parse(
                    offset,
                    format!(
                        "{parent:?} cannot contain a {}",
                        other.geometry_type().name()
                    ),
                )
            })?;
            members.push(member);
        }
        Ok(members)
    }

    fn read_geometry(&mut self, depth: usize) -> Result<Geometry> {
        let start = self.position();
        if depth > MAX_DEPTH {
            return Err(GeodexError::parse(start, "geometry nesting is too deep"));
        }

        let marker = self.read_u8()?;
        let order = Endianness::try_from(marker).map_err(|_| {
            GeodexError::parse(start, format!("invalid byte order marker {marker}"))
        })?;

        let type_offset = self.position();
        let header = WkbHeader::from_word(self.read_u32(order)?)
            .map_err(|message| GeodexError::parse(type_offset, message))?;
        if header.has_m {
            return Err(GeodexError::parse(
                type_offset,
                "geometries with M ordinates are not supported",
            ));
        }
        let srid = if header.has_srid {
            Some(self.read_u32(order)? as i32)
        } else {
            None
        };
        let dims = header.dims();

        let value = match header.geometry_type {
            WKBType::Point => {
                let x = self.read_f64(order)?;
                let y = self.read_f64(order)?;
                for _ in 2..dims {
                    self.read_f64(order)?;
                }
                GeometryValue::Point(Point::new(x, y))
            }
            WKBType::LineString => GeometryValue::LineString(self.read_line_string(order, dims)?),
            WKBType::Polygon => GeometryValue::Polygon(self.read_polygon(order, dims)?),
            WKBType::MultiPoint => {
                let count = self.read_count(order, MIN_POINT_BYTES, "point")?;
                GeometryValue::MultiPoint(self.read_members(
                    count,
                    depth,
                    WKBType::MultiPoint,
                    |value| match value {
                        GeometryValue::Point(p) => Ok(p),
                        other => Err(other),
                    },
                )?)
            }
            WKBType::MultiLineString => {
                let count = self.read_count(order, MIN_GEOMETRY_BYTES, "line string")?;
                GeometryValue::MultiLineString(self.read_members(
                    count,
                    depth,
                    WKBType::MultiLineString,
                    |value| match value {
                        GeometryValue::LineString(ls) => Ok(ls),
                        other => Err(other),
                    },
                )?)
            }
            WKBType::MultiPolygon => {
                let count = self.read_count(order, MIN_GEOMETRY_BYTES, "polygon")?;
                GeometryValue::MultiPolygon(self.read_members(
                    count,
                    depth,
                    WKBType::MultiPolygon,
                    |value| match value {
                        GeometryValue::Polygon(p) => Ok(p),
                        other => Err(other),
                    },
                )?)
            }
            WKBType::GeometryCollection => {
                let count = self.read_count(order, MIN_GEOMETRY_BYTES, "geometry")?;
                let mut parts = Vec::new();
                parts.try_reserve_exact(count)?;
                for _ in 0..count {
                    parts.push(self.read_geometry(depth + 1)?);
                }
                GeometryValue::GeometryCollection(parts)
            }
        };
        Ok(Geometry::new(value).with_srid(srid))
    }
}

#[cfg(test)]
mod test {
    use byteorder::WriteBytesExt;

    use super::*;
    use crate::error::ErrorKind;

    fn point_bytes<B: byteorder::ByteOrder>(marker: u8, word: u32, values: &[f64]) -> Vec<u8> {
        let mut buf = vec![marker];
        buf.write_u32::<B>(word).unwrap();
        for v in values {
            buf.write_f64::<B>(*v).unwrap();
        }
        buf
    }

    #[test]
    fn reads_little_endian_point() {
        let buf = point_bytes::<LittleEndian>(1, 1, &[1., 2.]);
        assert_eq!(read_wkb(&buf).unwrap(), Geometry::point(1., 2.));
    }

    #[test]
    fn drops_z_ordinates() {
        let iso = point_bytes::<BigEndian>(0, 1001, &[1., 2., 3.]);
        assert_eq!(read_wkb(&iso).unwrap(), Geometry::point(1., 2.));

        let mut ewkb = vec![1u8];
        ewkb.write_u32::<LittleEndian>(0x8000_0002).unwrap();
        ewkb.write_u32::<LittleEndian>(2).unwrap();
        for v in [0., 0., 9., 1., 1., 9.] {
            ewkb.write_f64::<LittleEndian>(v).unwrap();
        }
        assert_eq!(
            read_wkb(&ewkb).unwrap(),
            Geometry::line_string(vec![(0., 0.), (1., 1.)]).unwrap()
        );
    }

    #[test]
    fn rejects_m_ordinates() {
        let buf = point_bytes::<LittleEndian>(1, 2001, &[1., 2., 3.]);
        let err = read_wkb(&buf).unwrap_err();
        assert!(matches!(err, GeodexError::Parse { offset: 1, .. }));
    }

    #[test]
    fn reads_srid_flag() {
        let mut buf = vec![1u8];
        buf.write_u32::<LittleEndian>(0x2000_0001).unwrap();
        buf.write_u32::<LittleEndian>(4326).unwrap();
        buf.write_f64::<LittleEndian>(1.).unwrap();
        buf.write_f64::<LittleEndian>(2.).unwrap();
        let geom = read_wkb(&buf).unwrap();
        assert_eq!(geom.srid(), Some(4326));
    }

    #[test]
    fn nested_geometries_carry_their_own_byte_order() {
        let mut buf = vec![0u8];
        buf.write_u32::<BigEndian>(4).unwrap();
        buf.write_u32::<BigEndian>(2).unwrap();
        buf.extend(point_bytes::<LittleEndian>(1, 1, &[1., 2.]));
        buf.extend(point_bytes::<BigEndian>(0, 1, &[3., 4.]));
        let geom = read_wkb(&buf).unwrap();
        assert_eq!(
            geom.value(),
            &GeometryValue::MultiPoint(vec![Point::new(1., 2.), Point::new(3., 4.)])
        );
    }

    #[test]
    fn rejects_bad_marker() {
        let buf = point_bytes::<LittleEndian>(7, 1, &[1., 2.]);
        let err = read_wkb(&buf).unwrap_err();
        assert!(matches!(err, GeodexError::Parse { offset: 0, .. }));
    }

    #[test]
    fn rejects_truncated_input() {
        let mut buf = point_bytes::<LittleEndian>(1, 1, &[1., 2.]);
        buf.pop();
        assert_eq!(read_wkb(&buf).unwrap_err().kind(), ErrorKind::ParseError);
        assert_eq!(read_wkb(&[]).unwrap_err().kind(), ErrorKind::ParseError);
    }

    #[test]
    fn rejects_oversized_count_before_allocating() {
        let mut buf = vec![1u8];
        buf.write_u32::<LittleEndian>(2).unwrap();
        buf.write_u32::<LittleEndian>(u32::MAX).unwrap();
        let err = read_wkb(&buf).unwrap_err();
        assert!(matches!(err, GeodexError::Parse { offset: 5, .. }));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut buf = point_bytes::<LittleEndian>(1, 1, &[1., 2.]);
        buf.push(0);
        assert!(matches!(
            read_wkb(&buf).unwrap_err(),
            GeodexError::Parse { offset: 21, .. }
        ));
    }

    #[test]
    fn rejects_open_ring() {
        let mut buf = vec![1u8];
        buf.write_u32::<LittleEndian>(3).unwrap();
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.write_u32::<LittleEndian>(4).unwrap();
        for v in [0., 0., 1., 0., 1., 1., 0., 1.] {
            buf.write_f64::<LittleEndian>(v).unwrap();
        }
        assert!(matches!(
            read_wkb(&buf).unwrap_err(),
            GeodexError::Parse { offset: 9, .. }
        ));
    }

    #[test]
    fn rejects_wrong_member_kind() {
        let mut buf = vec![1u8];
        buf.write_u32::<LittleEndian>(5).unwrap();
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.extend(point_bytes::<LittleEndian>(1, 1, &[1., 2.]));
        assert_eq!(read_wkb(&buf).unwrap_err().kind(), ErrorKind::ParseError);
    }
}
