//! KML geometry elements: `<Point>`, `<LineString>`, `<LinearRing>`, `<Polygon>` and
//! `<MultiGeometry>`.
//!
//! KML coordinates are always longitude/latitude, so no SRID is read or written.

pub use reader::read_kml;
pub use writer::write_kml;

mod reader;
mod writer;
