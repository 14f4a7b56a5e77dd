use serde::{Deserialize, Serialize};

use crate::geometry::{Coord, Geometry, GeometryValue};

/// An axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Envelope {
    /// Create an envelope from two corners, in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            minx: x0.min(x1),
            miny: y0.min(y1),
            maxx: x0.max(x1),
            maxy: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn center(&self) -> Coord {
        Coord::new(
            (self.minx + self.maxx) / 2.,
            (self.miny + self.maxy) / 2.,
        )
    }

    /// Whether `coord` lies inside or on the boundary of this envelope.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.minx && coord.x <= self.maxx && coord.y >= self.miny && coord.y <= self.maxy
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.minx <= other.maxx
            && self.maxx >= other.minx
            && self.miny <= other.maxy
            && self.maxy >= other.miny
    }

    /// Grow this envelope to also cover `other`.
    pub fn expand(&mut self, other: &Envelope) {
        self.minx = self.minx.min(other.minx);
        self.miny = self.miny.min(other.miny);
        self.maxx = self.maxx.max(other.maxx);
        self.maxy = self.maxy.max(other.maxy);
    }
}

/// Running extrema over a stream of coordinates.
///
/// x and y are tracked independently.
#[derive(Debug, Clone, Copy)]
struct BoundsBuilder {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl BoundsBuilder {
    fn new() -> Self {
        BoundsBuilder {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: -f64::INFINITY,
            maxy: -f64::INFINITY,
        }
    }

    fn update(&mut self, coord: Coord) {
        if coord.x < self.minx {
            self.minx = coord.x;
        }
        if coord.x > self.maxx {
            self.maxx = coord.x;
        }
        if coord.y < self.miny {
            self.miny = coord.y;
        }
        if coord.y > self.maxy {
            self.maxy = coord.y;
        }
    }

    fn finish(self) -> Option<Envelope> {
        if self.minx > self.maxx || self.miny > self.maxy {
            return None;
        }
        Some(Envelope {
            minx: self.minx,
            miny: self.miny,
            maxx: self.maxx,
            maxy: self.maxy,
        })
    }
}

/// Bounding rectangle and derived extents of a geometry.
pub trait BoundingRect {
    /// The envelope of every coordinate, computed in a single linear scan.
    ///
    /// Returns `None` for empty geometries.
    fn envelope(&self) -> Option<Envelope>;

    fn width(&self) -> f64 {
        self.envelope().map_or(0., |e| e.width())
    }

    fn height(&self) -> f64 {
        self.envelope().map_or(0., |e| e.height())
    }

    /// The position used to index this geometry: the point itself for a Point, otherwise the
    /// center of the envelope.
    fn representative_point(&self) -> Option<Coord>;
}

impl BoundingRect for Geometry {
    fn envelope(&self) -> Option<Envelope> {
        let mut bounds = BoundsBuilder::new();
        self.coords().for_each(|coord| bounds.update(coord));
        bounds.finish()
    }

    fn representative_point(&self) -> Option<Coord> {
        match self.value() {
            GeometryValue::Point(point) => Some(point.coord()),
            _ => self.envelope().map(|e| e.center()),
        }
    }
}
