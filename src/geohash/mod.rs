//! Fixed-precision integer geohashes.
//!
//! A point is mapped onto the quad subdivision of a rectangular domain by independently
//! bisecting the longitude and latitude ranges `step` times and interleaving the two bit
//! streams, longitude first. The resulting code is left-justified in a `u64`, so a coarser cell
//! is a bit prefix of every finer cell it covers and codes of equal `step` sort along the
//! Z-order curve.
//!
//! ```
//! use geodex::geohash::{decode_wgs84, encode_wgs84};
//!
//! let hash = encode_wgs84(13.361389, 38.115556, 26).unwrap();
//! let area = decode_wgs84(hash).unwrap();
//! assert!(area.longitude.contains(13.361389));
//! assert!(area.latitude.contains(38.115556));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeodexError, Result};
use crate::geometry::Coord;

pub use cover::{covering_cell_count, covering_cells};
pub use neighbors::{neighbor, neighbors, Direction, GeohashNeighbors};

mod cover;
pub(crate) mod interleave;
mod neighbors;

use interleave::{deinterleave64, interleave64};

/// Smallest meaningful precision, in bits per axis.
pub const MIN_STEP: u8 = 1;
/// Largest precision, in bits per axis; 64 bits in total.
pub const MAX_STEP: u8 = 32;

/// Longitude bound of the WGS84 domain.
pub const WGS84_LONG_MIN: f64 = -180.0;
pub const WGS84_LONG_MAX: f64 = 180.0;
/// Latitude bound of the WGS84 domain, limited to what Web Mercator can represent.
pub const WGS84_LAT_MIN: f64 = -85.05112878;
pub const WGS84_LAT_MAX: f64 = 85.05112878;

/// An interleaved geohash code of `step` bits per axis.
///
/// `bits` holds the `2 * step` code bits in its most significant positions; the remaining low
/// bits are zero. `step` is always within `1..=32`. Two codes are only ordered relative to each
/// other when their steps match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGeohashBits")]
pub struct GeohashBits {
    bits: u64,
    step: u8,
}

#[derive(Deserialize)]
struct RawGeohashBits {
    bits: u64,
    step: u8,
}

impl TryFrom<RawGeohashBits> for GeohashBits {
    type Error = GeodexError;

    fn try_from(raw: RawGeohashBits) -> Result<Self> {
        Self::try_new(raw.bits, raw.step)
    }
}

fn check_step(step: u8) -> Result<()> {
    if !(MIN_STEP..=MAX_STEP).contains(&step) {
        return Err(GeodexError::invalid(format!(
            "geohash step must be between {MIN_STEP} and {MAX_STEP}, got {step}"
        )));
    }
    Ok(())
}

/// Mask selecting the code bits of a left-justified hash of the given step.
#[inline]
fn step_mask(step: u8) -> u64 {
    match 64u32.checked_sub(2 * u32::from(step)) {
        Some(64) => 0,
        Some(shift) => u64::MAX << shift,
        None => u64::MAX,
    }
}

impl GeohashBits {
    /// Construct from raw left-justified bits, clearing anything below the code.
    ///
    /// # Errors
    ///
    /// - if `step` is outside `1..=32`
    pub fn try_new(bits: u64, step: u8) -> Result<Self> {
        check_step(step)?;
        Ok(Self {
            bits: bits & step_mask(step),
            step,
        })
    }

    /// The left-justified code.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Precision in bits per axis.
    pub fn step(&self) -> u8 {
        self.step
    }

    pub(crate) fn from_cell(lon_index: u32, lat_index: u32, step: u8) -> Self {
        let code = interleave64(lat_index, lon_index);
        Self {
            bits: code << (64 - 2 * step as u32),
            step,
        }
    }

    /// The column and row of this cell in its `2^step x 2^step` grid.
    pub(crate) fn cell(&self) -> (u32, u32) {
        let code = self.bits >> (64 - 2 * self.step as u32);
        let (lat_index, lon_index) = deinterleave64(code);
        (lon_index, lat_index)
    }

    /// The ancestor of this cell at a coarser `step`.
    ///
    /// # Errors
    ///
    /// - if `step` is outside `1..=self.step`
    pub fn truncate(&self, step: u8) -> Result<Self> {
        check_step(step)?;
        if step > self.step {
            return Err(GeodexError::invalid(format!(
                "cannot refine a step {} hash to step {step}",
                self.step
            )));
        }
        Ok(Self {
            bits: self.bits & step_mask(step),
            step,
        })
    }

    /// Whether `other` is this cell or one of its descendants.
    pub fn contains(&self, other: &GeohashBits) -> bool {
        other.step >= self.step && other.bits & step_mask(self.step) == self.bits
    }

    /// The inclusive span of left-justified 64-bit keys covered by this cell at any finer step.
    pub fn range(&self) -> (u64, u64) {
        (self.bits, self.bits | !step_mask(self.step))
    }
}

impl PartialOrd for GeohashBits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.step != other.step {
            return None;
        }
        Some(self.bits.cmp(&other.bits))
    }
}

impl fmt::Display for GeohashBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = 2 * self.step as usize;
        let code = if width == 0 { 0 } else { self.bits >> (64 - width) };
        write!(f, "{code:0width$b}")
    }
}

/// A closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeohashRange {
    pub min: f64,
    pub max: f64,
}

impl GeohashRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn wgs84_longitude() -> Self {
        Self::new(WGS84_LONG_MIN, WGS84_LONG_MAX)
    }

    pub fn wgs84_latitude() -> Self {
        Self::new(WGS84_LAT_MIN, WGS84_LAT_MAX)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(GeodexError::invalid(format!(
                "invalid geohash range [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// The index of the cell holding `value` when this range is split into `2^step` cells.
    ///
    /// Equivalent to bisecting `step` times and taking the upper half whenever `value` is at or
    /// above the midpoint. The upper bound belongs to the last cell.
    pub(crate) fn cell_index(&self, value: f64, step: u8) -> Result<u32> {
        if !self.contains(value) {
            return Err(GeodexError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        let cells = (1u64 << step) as f64;
        let offset = (value - self.min) / self.width();
        let index = (offset * cells) as u64;
        Ok(index.min((1u64 << step) - 1) as u32)
    }

    /// The sub-range of cell `index` when this range is split into `2^step` cells.
    pub(crate) fn cell_range(&self, index: u32, step: u8) -> GeohashRange {
        let cell = self.width() / (1u64 << step) as f64;
        let min = self.min + cell * index as f64;
        let max = self.min + cell * (index as f64 + 1.);
        GeohashRange {
            min: min.max(self.min),
            max: max.min(self.max),
        }
    }
}

/// The decoded extent of a geohash cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeohashArea {
    pub hash: GeohashBits,
    pub longitude: GeohashRange,
    pub latitude: GeohashRange,
}

/// Encode a position at `step` bits of precision per axis.
///
/// # Errors
///
/// - [`GeodexError::OutOfRange`] if the position lies outside the ranges
/// - [`GeodexError::InvalidArgument`] if `step` is outside `1..=32` or a range is degenerate
pub fn encode(
    long_range: GeohashRange,
    lat_range: GeohashRange,
    longitude: f64,
    latitude: f64,
    step: u8,
) -> Result<GeohashBits> {
    check_step(step)?;
    long_range.validate()?;
    lat_range.validate()?;

    let lon_index = long_range.cell_index(longitude, step)?;
    let lat_index = lat_range.cell_index(latitude, step)?;
    Ok(GeohashBits::from_cell(lon_index, lat_index, step))
}

/// Encode a position on the WGS84 domain.
pub fn encode_wgs84(longitude: f64, latitude: f64, step: u8) -> Result<GeohashBits> {
    encode(
        GeohashRange::wgs84_longitude(),
        GeohashRange::wgs84_latitude(),
        longitude,
        latitude,
        step,
    )
}

/// Decode a hash into the bounding box of its cell.
///
/// # Errors
///
/// - [`GeodexError::InvalidArgument`] if the hash step is outside `1..=32` or a range is
///   degenerate
pub fn decode(
    long_range: GeohashRange,
    lat_range: GeohashRange,
    hash: GeohashBits,
) -> Result<GeohashArea> {
    check_step(hash.step)?;
    long_range.validate()?;
    lat_range.validate()?;

    let (lon_index, lat_index) = hash.cell();
    Ok(GeohashArea {
        hash,
        longitude: long_range.cell_range(lon_index, hash.step),
        latitude: lat_range.cell_range(lat_index, hash.step),
    })
}

/// Decode a hash on the WGS84 domain.
pub fn decode_wgs84(hash: GeohashBits) -> Result<GeohashArea> {
    decode(
        GeohashRange::wgs84_longitude(),
        GeohashRange::wgs84_latitude(),
        hash,
    )
}

/// The midpoint of a decoded cell.
pub fn decode_area_to_coord(area: &GeohashArea) -> Coord {
    Coord::new(area.longitude.midpoint(), area.latitude.midpoint())
}

/// Decode a WGS84 hash straight to the midpoint of its cell.
pub fn decode_to_coord_wgs84(hash: GeohashBits) -> Result<Coord> {
    decode_wgs84(hash).map(|area| decode_area_to_coord(&area))
}
