use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The 2D geometry type codes of the WKB type word.
#[derive(Clone, Copy, Debug, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum WKBType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

/// PostGIS extended WKB flags, stored in the high bits of the type word.
pub(crate) const EWKB_Z_FLAG: u32 = 0x8000_0000;
pub(crate) const EWKB_M_FLAG: u32 = 0x4000_0000;
pub(crate) const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// Byte order marker, the first byte of every WKB geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Endianness {
    BigEndian = 0,
    #[default]
    LittleEndian = 1,
}

/// A decoded WKB type word.
///
/// Both the ISO dimension offsets (`+1000` for Z, `+2000` for M, `+3000` for ZM) and the EWKB
/// high-bit flags are understood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WkbHeader {
    pub geometry_type: WKBType,
    pub has_z: bool,
    pub has_m: bool,
    pub has_srid: bool,
}

impl WkbHeader {
    pub fn from_word(word: u32) -> Result<Self, String> {
        let has_srid = word & EWKB_SRID_FLAG != 0;
        let mut has_z = word & EWKB_Z_FLAG != 0;
        let mut has_m = word & EWKB_M_FLAG != 0;
        let code = word & !(EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG);

        match code / 1000 {
            0 => {}
            1 => has_z = true,
            2 => has_m = true,
            3 => {
                has_z = true;
                has_m = true;
            }
            _ => return Err(format!("unknown WKB geometry type {word:#x}")),
        }
        let geometry_type = WKBType::try_from(code % 1000)
            .map_err(|_| format!("unknown WKB geometry type {word:#x}"))?;

        Ok(Self {
            geometry_type,
            has_z,
            has_m,
            has_srid,
        })
    }

    /// Coordinate width in values.
    pub fn dims(&self) -> usize {
        2 + self.has_z as usize + self.has_m as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn iso_and_ewkb_words() {
        let plain = WkbHeader::from_word(3).unwrap();
        assert_eq!(plain.geometry_type, WKBType::Polygon);
        assert!(!plain.has_z && !plain.has_m && !plain.has_srid);

        let iso_z = WkbHeader::from_word(1002).unwrap();
        assert_eq!(iso_z.geometry_type, WKBType::LineString);
        assert!(iso_z.has_z);
        assert_eq!(iso_z.dims(), 3);

        let ewkb = WkbHeader::from_word(EWKB_Z_FLAG | EWKB_SRID_FLAG | 1).unwrap();
        assert_eq!(ewkb.geometry_type, WKBType::Point);
        assert!(ewkb.has_z && ewkb.has_srid);

        let zm = WkbHeader::from_word(3001).unwrap();
        assert!(zm.has_z && zm.has_m);
        assert_eq!(zm.dims(), 4);
    }

    #[test]
    fn unknown_words() {
        assert!(WkbHeader::from_word(0).is_err());
        assert!(WkbHeader::from_word(8).is_err());
        assert!(WkbHeader::from_word(4001).is_err());
    }

    #[test]
    fn endianness_codes() {
        assert_eq!(u8::from(Endianness::BigEndian), 0);
        assert_eq!(Endianness::try_from(1u8).unwrap(), Endianness::LittleEndian);
        assert!(Endianness::try_from(2u8).is_err());
        assert_eq!(Endianness::default(), Endianness::LittleEndian);
    }
}
