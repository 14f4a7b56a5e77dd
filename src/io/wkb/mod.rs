//! Well-known binary, plus the PostGIS extended variant (EWKB) that carries an SRID.

pub use common::{Endianness, WKBType};
pub use reader::read_wkb;
pub use writer::{wkb_size, write_ewkb, write_geometry_as_wkb, write_wkb};

mod common;
mod reader;
mod writer;
