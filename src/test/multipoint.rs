use crate::geometry::{Geometry, GeometryValue, Point};

pub(crate) fn mp0() -> Geometry {
    GeometryValue::MultiPoint(vec![Point::new(10., 40.), Point::new(40., 30.)]).into()
}

pub(crate) fn empty() -> Geometry {
    GeometryValue::MultiPoint(vec![]).into()
}
