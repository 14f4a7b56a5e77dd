use crate::error::{GeodexError, Result};
use crate::geometry::CoordSeq;

/// An open or closed sequence of at least two coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    coords: CoordSeq,
}

impl LineString {
    /// Construct a new LineString.
    ///
    /// # Errors
    ///
    /// - if fewer than two coordinates are given
    pub fn try_new(coords: impl Into<CoordSeq>) -> Result<Self> {
        let coords = coords.into();
        if coords.len() < 2 {
            return Err(GeodexError::invalid(format!(
                "a LineString needs at least 2 coordinates, got {}",
                coords.len()
            )));
        }
        Ok(Self { coords })
    }

    pub fn coords(&self) -> &CoordSeq {
        &self.coords
    }

    pub fn num_coords(&self) -> usize {
        self.coords.len()
    }

    pub fn is_closed(&self) -> bool {
        self.coords.is_closed()
    }

    pub fn into_coords(self) -> CoordSeq {
        self.coords
    }
}

/// A closed line: at least four coordinates, the first equal to the last.
///
/// Used as a polygon boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRing {
    coords: CoordSeq,
}

impl LinearRing {
    /// Construct a new LinearRing.
    ///
    /// # Errors
    ///
    /// - if fewer than four coordinates are given
    /// - if the first coordinate differs from the last
    pub fn try_new(coords: impl Into<CoordSeq>) -> Result<Self> {
        let coords = coords.into();
        if coords.len() < 4 {
            return Err(GeodexError::invalid(format!(
                "a LinearRing needs at least 4 coordinates, got {}",
                coords.len()
            )));
        }
        if !coords.is_closed() {
            return Err(GeodexError::invalid(
                "a LinearRing must start and end at the same coordinate",
            ));
        }
        Ok(Self { coords })
    }

    pub fn coords(&self) -> &CoordSeq {
        &self.coords
    }

    pub fn num_coords(&self) -> usize {
        self.coords.len()
    }

    pub fn into_coords(self) -> CoordSeq {
        self.coords
    }
}

impl TryFrom<LineString> for LinearRing {
    type Error = GeodexError;

    fn try_from(value: LineString) -> Result<Self> {
        LinearRing::try_new(value.into_coords())
    }
}

impl From<LinearRing> for LineString {
    fn from(value: LinearRing) -> Self {
        LineString {
            coords: value.coords,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn line_string_too_short() {
        let err = LineString::try_new(vec![(0., 0.)]).unwrap_err();
        assert!(matches!(err, GeodexError::InvalidArgument(_)));
    }

    #[test]
    fn ring_must_be_closed() {
        let open = vec![(0., 0.), (1., 0.), (1., 1.), (0., 1.)];
        assert!(LinearRing::try_new(open).is_err());

        let closed = vec![(0., 0.), (1., 0.), (1., 1.), (0., 0.)];
        assert!(LinearRing::try_new(closed).is_ok());
    }
}
