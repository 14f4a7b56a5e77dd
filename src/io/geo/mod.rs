//! Convert to [`geo`] scalars.

mod scalar;

pub use scalar::{
    coord_to_geo, geometry_to_geo, line_string_to_geo, linear_ring_to_geo, point_to_geo,
    polygon_to_geo,
};
