//! The in-memory geometry model.
//!
//! A [`Geometry`] is a [`GeometryValue`] plus an optional SRID. Every geometry exclusively owns
//! its coordinate sequences and child geometries; cloning is a deep copy and dropping releases
//! everything it owns.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{GeodexError, Result};

pub use coord::{Coord, CoordSeq};
pub use linestring::{LineString, LinearRing};
pub use point::Point;
pub use polygon::Polygon;

mod coord;
mod linestring;
mod point;
mod polygon;

/// The kind of a geometry.
///
/// The codes 1 to 7 match the 2D WKB geometry type codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    LinearRing = 101,
}

impl GeometryType {
    /// Whether this is one of the four multi/collection kinds.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint
                | GeometryType::MultiLineString
                | GeometryType::MultiPolygon
                | GeometryType::GeometryCollection
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
            GeometryType::LinearRing => "LinearRing",
        }
    }
}

/// The payload of a [`Geometry`].
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryValue {
    Point(Point),
    LineString(LineString),
    LinearRing(LinearRing),
    Polygon(Polygon),
    MultiPoint(Vec<Point>),
    MultiLineString(Vec<LineString>),
    MultiPolygon(Vec<Polygon>),
    GeometryCollection(Vec<Geometry>),
}

impl GeometryValue {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            GeometryValue::Point(_) => GeometryType::Point,
            GeometryValue::LineString(_) => GeometryType::LineString,
            GeometryValue::LinearRing(_) => GeometryType::LinearRing,
            GeometryValue::Polygon(_) => GeometryType::Polygon,
            GeometryValue::MultiPoint(_) => GeometryType::MultiPoint,
            GeometryValue::MultiLineString(_) => GeometryType::MultiLineString,
            GeometryValue::MultiPolygon(_) => GeometryType::MultiPolygon,
            GeometryValue::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }
}

/// A geometry value with an optional spatial reference identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    value: GeometryValue,
    srid: Option<i32>,
}

impl Geometry {
    pub fn new(value: GeometryValue) -> Self {
        Self { value, srid: None }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(GeometryValue::Point(Point::new(x, y)))
    }

    /// Create a LineString geometry.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::InvalidArgument`] if fewer than two coordinates are given
    pub fn line_string(coords: impl Into<CoordSeq>) -> Result<Self> {
        Ok(Self::new(GeometryValue::LineString(LineString::try_new(
            coords,
        )?)))
    }

    /// Create a LinearRing geometry.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::InvalidArgument`] if fewer than four coordinates are given or the
    ///   sequence is not closed
    pub fn linear_ring(coords: impl Into<CoordSeq>) -> Result<Self> {
        Ok(Self::new(GeometryValue::LinearRing(LinearRing::try_new(
            coords,
        )?)))
    }

    /// Create a Polygon, taking ownership of the shell and the holes.
    ///
    /// Each ring may be passed as a LinearRing or as a closed LineString.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::InvalidArgument`] if any ring is not a linear ring
    pub fn polygon(shell: Geometry, holes: Vec<Geometry>) -> Result<Self> {
        let shell = shell.into_ring()?;
        let holes = holes
            .into_iter()
            .map(Geometry::into_ring)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(GeometryValue::Polygon(Polygon::new(shell, holes))))
    }

    /// Create one of the multi kinds or a heterogeneous collection from owned parts.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::InvalidArgument`] if `kind` is not a collection kind, or a part does not
    ///   match the element kind of `kind`
    pub fn collection(kind: GeometryType, parts: Vec<Geometry>) -> Result<Self> {
        let value = match kind {
            GeometryType::MultiPoint => GeometryValue::MultiPoint(
                parts
                    .into_iter()
                    .map(|part| match part.value {
                        GeometryValue::Point(p) => Ok(p),
                        other => Err(part_mismatch(kind, other.geometry_type())),
                    })
                    .collect::<Result<_>>()?,
            ),
            GeometryType::MultiLineString => GeometryValue::MultiLineString(
                parts
                    .into_iter()
                    .map(|part| match part.value {
                        GeometryValue::LineString(ls) => Ok(ls),
                        other => Err(part_mismatch(kind, other.geometry_type())),
                    })
                    .collect::<Result<_>>()?,
            ),
            GeometryType::MultiPolygon => GeometryValue::MultiPolygon(
                parts
                    .into_iter()
                    .map(|part| match part.value {
                        GeometryValue::Polygon(p) => Ok(p),
                        other => Err(part_mismatch(kind, other.geometry_type())),
                    })
                    .collect::<Result<_>>()?,
            ),
            GeometryType::GeometryCollection => GeometryValue::GeometryCollection(parts),
            _ => {
                return Err(GeodexError::invalid(format!(
                    "{} is not a collection kind",
                    kind.name()
                )))
            }
        };
        Ok(Self::new(value))
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.srid = srid;
        self
    }

    pub fn srid(&self) -> Option<i32> {
        self.srid
    }

    pub fn set_srid(&mut self, srid: Option<i32>) {
        self.srid = srid;
    }

    pub fn value(&self) -> &GeometryValue {
        &self.value
    }

    pub fn into_value(self) -> GeometryValue {
        self.value
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.value.geometry_type()
    }

    /// Whether this geometry has no coordinates at all.
    ///
    /// Only multi kinds and collections can be empty.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            GeometryValue::MultiPoint(parts) => parts.is_empty(),
            GeometryValue::MultiLineString(parts) => parts.is_empty(),
            GeometryValue::MultiPolygon(parts) => parts.is_empty(),
            GeometryValue::GeometryCollection(parts) => parts.iter().all(|g| g.is_empty()),
            _ => false,
        }
    }

    /// Total number of coordinates, counting every ring and part.
    pub fn num_coords(&self) -> usize {
        self.coords().count()
    }

    /// Every coordinate of this geometry in storage order.
    pub fn coords(&self) -> Box<dyn Iterator<Item = Coord> + '_> {
        match &self.value {
            GeometryValue::Point(p) => Box::new(std::iter::once(p.coord())),
            GeometryValue::LineString(ls) => Box::new(ls.coords().iter()),
            GeometryValue::LinearRing(ring) => Box::new(ring.coords().iter()),
            GeometryValue::Polygon(polygon) => {
                Box::new(polygon.rings().flat_map(|ring| ring.coords().iter()))
            }
            GeometryValue::MultiPoint(points) => Box::new(points.iter().map(Point::coord)),
            GeometryValue::MultiLineString(lines) => {
                Box::new(lines.iter().flat_map(|ls| ls.coords().iter()))
            }
            GeometryValue::MultiPolygon(polygons) => Box::new(
                polygons
                    .iter()
                    .flat_map(|polygon| polygon.rings().flat_map(|ring| ring.coords().iter())),
            ),
            GeometryValue::GeometryCollection(parts) => {
                Box::new(parts.iter().flat_map(|g| g.coords()))
            }
        }
    }

    /// Consume this geometry as a polygon ring.
    fn into_ring(self) -> Result<LinearRing> {
        match self.value {
            GeometryValue::LinearRing(ring) => Ok(ring),
            GeometryValue::LineString(ls) => LinearRing::try_from(ls),
            other => Err(GeodexError::invalid(format!(
                "polygon rings must be linear rings, got {}",
                other.geometry_type().name()
            ))),
        }
    }
}

impl From<GeometryValue> for Geometry {
    fn from(value: GeometryValue) -> Self {
        Self::new(value)
    }
}

impl From<Point> for Geometry {
    fn from(value: Point) -> Self {
        Self::new(GeometryValue::Point(value))
    }
}

impl From<LineString> for Geometry {
    fn from(value: LineString) -> Self {
        Self::new(GeometryValue::LineString(value))
    }
}

impl From<LinearRing> for Geometry {
    fn from(value: LinearRing) -> Self {
        Self::new(GeometryValue::LinearRing(value))
    }
}

impl From<Polygon> for Geometry {
    fn from(value: Polygon) -> Self {
        Self::new(GeometryValue::Polygon(value))
    }
}

fn part_mismatch(kind: GeometryType, found: GeometryType) -> GeodexError {
    GeodexError::invalid(format!(
        "{} cannot hold a {} part",
        kind.name(),
        found.name()
    ))
}
