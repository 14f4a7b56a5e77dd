//! Well-known text, plus the PostGIS extended variant (EWKT) with an `SRID=<n>;` prefix.

pub use reader::read_wkt;
pub use writer::{write_ewkt, write_wkt};

mod reader;
mod writer;
