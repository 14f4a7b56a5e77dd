//! Algorithms implemented directly on the coordinate data.

mod envelope;

pub use envelope::{BoundingRect, Envelope};
