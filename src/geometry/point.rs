use crate::geometry::Coord;

/// A single XY position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

impl From<Coord> for Point {
    fn from(value: Coord) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
