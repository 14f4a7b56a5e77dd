//! GeoJSON geometries, features and feature collections.
//!
//! An SRID is carried in the legacy named `crs` member,
//! `{"type": "name", "properties": {"name": "EPSG:<srid>"}}`.

pub use reader::{geometry_from_geojson, read_geojson, read_geojson_file};
pub use writer::{geometry_to_geojson, write_geojson, write_geojson_file};

mod reader;
mod writer;
