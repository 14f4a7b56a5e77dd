//! GML geometry elements, in the GML 3 and GML 2 dialects.
//!
//! One reader understands both dialects. The SRID travels in the `srsName` attribute of the
//! outermost geometry element.

pub use reader::read_gml;
pub use writer::{write_gml, GmlVersion};

mod reader;
mod writer;
