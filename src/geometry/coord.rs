use std::fmt;

use crate::error::{GeodexError, Result};

/// A single XY coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns a tuple that contains the x/horizontal & y/vertical component of the coord.
    pub fn x_y(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// An ordered, fixed-length sequence of XY coordinates stored interleaved in a single buffer.
///
/// The length cannot change once constructed. Growth happens in whatever builds the `Vec` that
/// is handed to [`CoordSeq::try_new`].
#[derive(Clone, PartialEq, Default)]
pub struct CoordSeq {
    coords: Box<[f64]>,
}

fn check(coords: &[f64]) -> Result<()> {
    if coords.len() % 2 != 0 {
        return Err(GeodexError::invalid(
            "interleaved coordinate buffer must have an even number of values",
        ));
    }

    Ok(())
}

impl CoordSeq {
    /// Construct a new CoordSeq from interleaved `x, y, x, y, ...` values.
    ///
    /// # Errors
    ///
    /// - if the buffer has an odd number of values
    pub fn try_new(coords: Vec<f64>) -> Result<Self> {
        check(&coords)?;
        Ok(Self {
            coords: coords.into_boxed_slice(),
        })
    }

    /// The number of coordinates in this sequence.
    pub fn len(&self) -> usize {
        self.coords.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Access the coordinate at index `i`, if it exists.
    pub fn get(&self, i: usize) -> Option<Coord> {
        if i < self.len() {
            Some(self.value(i))
        } else {
            None
        }
    }

    /// Access the coordinate at index `i`.
    ///
    /// # Panics
    ///
    /// - if `i` is out of bounds
    pub fn value(&self, i: usize) -> Coord {
        Coord {
            x: self.coords[i * 2],
            y: self.coords[i * 2 + 1],
        }
    }

    pub fn first(&self) -> Option<Coord> {
        self.get(0)
    }

    pub fn last(&self) -> Option<Coord> {
        self.len().checked_sub(1).map(|i| self.value(i))
    }

    /// Whether the first and last coordinates are identical.
    pub fn is_closed(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Coord> + '_ {
        self.coords
            .chunks_exact(2)
            .map(|xy| Coord { x: xy[0], y: xy[1] })
    }

    /// The raw interleaved buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.coords.into_vec()
    }
}

impl fmt::Debug for CoordSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.x_y())).finish()
    }
}

impl From<Vec<Coord>> for CoordSeq {
    fn from(value: Vec<Coord>) -> Self {
        value.into_iter().collect()
    }
}

impl From<Vec<(f64, f64)>> for CoordSeq {
    fn from(value: Vec<(f64, f64)>) -> Self {
        value.into_iter().map(Coord::from).collect()
    }
}

impl From<&[(f64, f64)]> for CoordSeq {
    fn from(value: &[(f64, f64)]) -> Self {
        value.iter().copied().map(Coord::from).collect()
    }
}

impl FromIterator<Coord> for CoordSeq {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut coords = Vec::with_capacity(iter.size_hint().0 * 2);
        for coord in iter {
            coords.push(coord.x);
            coords.push(coord.y);
        }
        Self {
            coords: coords.into_boxed_slice(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn odd_buffer_rejected() {
        let err = CoordSeq::try_new(vec![1., 2., 3.]).unwrap_err();
        assert!(matches!(err, GeodexError::InvalidArgument(_)));
    }

    #[test]
    fn interleaved_access() {
        let seq = CoordSeq::try_new(vec![0., 1., 2., 3., 4., 5.]).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.value(1), Coord::new(2., 3.));
        assert_eq!(seq.last(), Some(Coord::new(4., 5.)));
        assert!(seq.get(3).is_none());
        assert!(!seq.is_closed());
    }
}
