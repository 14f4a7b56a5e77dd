use crate::geometry::{LinearRing, Polygon};

pub(crate) fn p0() -> Polygon {
    let shell = LinearRing::try_new(vec![
        (30., 10.),
        (40., 40.),
        (20., 40.),
        (10., 20.),
        (30., 10.),
    ])
    .unwrap();
    Polygon::new(shell, vec![])
}

pub(crate) fn p_with_hole() -> Polygon {
    let shell = LinearRing::try_new(vec![
        (35., 10.),
        (45., 45.),
        (15., 40.),
        (10., 20.),
        (35., 10.),
    ])
    .unwrap();
    let hole = LinearRing::try_new(vec![(20., 30.), (35., 35.), (30., 20.), (20., 30.)]).unwrap();
    Polygon::new(shell, vec![hole])
}

/// 10 x 10 square at the origin.
pub(crate) fn square() -> Polygon {
    let shell =
        LinearRing::try_new(vec![(0., 0.), (10., 0.), (10., 10.), (0., 10.), (0., 0.)]).unwrap();
    Polygon::new(shell, vec![])
}
