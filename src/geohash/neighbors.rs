use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Result;
use crate::geohash::{check_step, GeohashBits};

/// Compass and diagonal directions, with their stable integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    West = 2,
    South = 3,
    SouthWest = 4,
    SouthEast = 5,
    NorthWest = 6,
    NorthEast = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::SouthWest,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// Cell offsets `(dx, dy)` for this direction.
    fn offsets(&self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::SouthEast => (1, -1),
            Direction::NorthWest => (-1, 1),
            Direction::NorthEast => (1, 1),
        }
    }
}

/// The eight cells around a geohash cell, at the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeohashNeighbors {
    pub north: GeohashBits,
    pub east: GeohashBits,
    pub west: GeohashBits,
    pub south: GeohashBits,
    pub south_west: GeohashBits,
    pub south_east: GeohashBits,
    pub north_west: GeohashBits,
    pub north_east: GeohashBits,
}

impl GeohashNeighbors {
    pub fn get(&self, direction: Direction) -> GeohashBits {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::West => self.west,
            Direction::South => self.south,
            Direction::SouthWest => self.south_west,
            Direction::SouthEast => self.south_east,
            Direction::NorthWest => self.north_west,
            Direction::NorthEast => self.north_east,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, GeohashBits)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// Step one cell in longitude. The longitude axis is cyclic, so stepping off one edge re-enters
/// at the other.
fn move_x(index: u32, d: i8, step: u8) -> u32 {
    let cells = 1i64 << step;
    (index as i64 + d as i64).rem_euclid(cells) as u32
}

/// Step one cell in latitude, clamping at the poles of the domain.
fn move_y(index: u32, d: i8, step: u8) -> u32 {
    let max = ((1u64 << step) - 1) as i64;
    (index as i64 + d as i64).clamp(0, max) as u32
}

/// The cell adjacent to `hash` in `direction`.
///
/// Stepping east or west past the domain edge wraps around to the opposite edge; stepping north
/// or south past it stays in the edge row.
pub fn neighbor(hash: GeohashBits, direction: Direction) -> Result<GeohashBits> {
    check_step(hash.step)?;
    let (lon_index, lat_index) = hash.cell();
    let (dx, dy) = direction.offsets();
    Ok(GeohashBits::from_cell(
        move_x(lon_index, dx, hash.step),
        move_y(lat_index, dy, hash.step),
        hash.step,
    ))
}

/// All eight cells adjacent to `hash`.
///
/// See [`neighbor`] for the behavior at the domain edges.
pub fn neighbors(hash: GeohashBits) -> Result<GeohashNeighbors> {
    Ok(GeohashNeighbors {
        north: neighbor(hash, Direction::North)?,
        east: neighbor(hash, Direction::East)?,
        west: neighbor(hash, Direction::West)?,
        south: neighbor(hash, Direction::South)?,
        south_west: neighbor(hash, Direction::SouthWest)?,
        south_east: neighbor(hash, Direction::SouthEast)?,
        north_west: neighbor(hash, Direction::NorthWest)?,
        north_east: neighbor(hash, Direction::NorthEast)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geohash::{decode_wgs84, encode_wgs84, WGS84_LAT_MAX, WGS84_LONG_MAX};

    #[test]
    fn east_then_west_is_identity() {
        for step in [3, 10, 26, 32] {
            let hash = encode_wgs84(13.361389, 38.115556, step).unwrap();
            let east = neighbors(hash).unwrap().east;
            let back = neighbors(east).unwrap().west;
            assert_eq!(
                decode_wgs84(back).unwrap(),
                decode_wgs84(hash).unwrap(),
                "step {step}"
            );
        }
    }

    #[test]
    fn neighbors_are_adjacent() {
        let hash = encode_wgs84(0.5, 0.5, 10).unwrap();
        let area = decode_wgs84(hash).unwrap();
        let n = neighbors(hash).unwrap();

        let north = decode_wgs84(n.north).unwrap();
        assert_eq!(north.longitude, area.longitude);
        assert!((north.latitude.min - area.latitude.max).abs() < 1e-9);

        let south_west = decode_wgs84(n.get(Direction::SouthWest)).unwrap();
        assert!((south_west.longitude.max - area.longitude.min).abs() < 1e-9);
        assert!((south_west.latitude.max - area.latitude.min).abs() < 1e-9);

        assert_eq!(n.iter().count(), 8);
        assert!(n.iter().all(|(_, h)| h.step == 10 && h != hash));
    }

    #[test]
    fn longitude_wraps_at_antimeridian() {
        let eastmost = encode_wgs84(WGS84_LONG_MAX, 0., 8).unwrap();
        let wrapped = neighbors(eastmost).unwrap().east;
        let area = decode_wgs84(wrapped).unwrap();
        assert_eq!(area.longitude.min, -180.);
    }

    #[test]
    fn latitude_clamps_at_edge() {
        let top = encode_wgs84(10., WGS84_LAT_MAX, 8).unwrap();
        let n = neighbors(top).unwrap();
        assert_eq!(n.north, top);
        assert_eq!(n.north_east, n.east);
    }

    #[test]
    fn walk_around_returns_home() {
        let start = encode_wgs84(2.35, 48.85, 18).unwrap();
        let mut cell = start;
        for direction in [Direction::East, Direction::North, Direction::West, Direction::South] {
            cell = neighbor(cell, direction).unwrap();
        }
        assert_eq!(cell, start);

        let area = decode_wgs84(start).unwrap();
        assert!(area.longitude.contains(2.35) && area.latitude.contains(48.85));
    }

    #[test]
    fn direction_codes() {
        assert_eq!(u8::from(Direction::North), 0);
        assert_eq!(u8::from(Direction::NorthEast), 7);
        assert_eq!(Direction::try_from(4u8).unwrap(), Direction::SouthWest);
        assert!(Direction::try_from(8u8).is_err());
    }
}
