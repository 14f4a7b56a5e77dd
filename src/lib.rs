//! A 2D geometry model with WKT, WKB, GeoJSON, KML and GML codecs, an integer geohash engine,
//! and an in-memory table indexed by geohash.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use error::{ErrorKind, GeodexError, Result};
pub use geometry::{Geometry, GeometryType};
pub use io::Format;

pub mod algorithm;
pub mod error;
pub mod geohash;
pub mod geometry;
pub mod io;
pub mod table;
#[cfg(test)]
pub(crate) mod test;
