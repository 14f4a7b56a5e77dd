use crate::geometry::{Geometry, GeometryValue, LineString};

pub(crate) fn mls0() -> Geometry {
    GeometryValue::MultiLineString(vec![
        LineString::try_new(vec![(10., 10.), (20., 20.), (10., 40.)]).unwrap(),
        LineString::try_new(vec![(40., 40.), (30., 30.), (40., 20.), (30., 10.)]).unwrap(),
    ])
    .into()
}

pub(crate) fn empty() -> Geometry {
    GeometryValue::MultiLineString(vec![]).into()
}
