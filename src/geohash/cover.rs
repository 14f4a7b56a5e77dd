use crate::algorithm::native::Envelope;
use crate::error::{GeodexError, Result};
use crate::geohash::{check_step, GeohashBits, GeohashRange};

/// Column and row spans of the cells touching `envelope`, or `None` if it misses the domain.
fn cell_spans(
    long_range: GeohashRange,
    lat_range: GeohashRange,
    envelope: &Envelope,
    step: u8,
) -> Result<Option<((u32, u32), (u32, u32))>> {
    check_step(step)?;
    long_range.validate()?;
    lat_range.validate()?;

    if envelope.maxx < long_range.min
        || envelope.minx > long_range.max
        || envelope.maxy < lat_range.min
        || envelope.miny > lat_range.max
    {
        return Ok(None);
    }

    let clamp_x = |x: f64| x.clamp(long_range.min, long_range.max);
    let clamp_y = |y: f64| y.clamp(lat_range.min, lat_range.max);
    let lon = (
        long_range.cell_index(clamp_x(envelope.minx), step)?,
        long_range.cell_index(clamp_x(envelope.maxx), step)?,
    );
    let lat = (
        lat_range.cell_index(clamp_y(envelope.miny), step)?,
        lat_range.cell_index(clamp_y(envelope.maxy), step)?,
    );
    Ok(Some((lon, lat)))
}

/// The number of cells at `step` that [`covering_cells`] would return.
pub fn covering_cell_count(
    long_range: GeohashRange,
    lat_range: GeohashRange,
    envelope: &Envelope,
    step: u8,
) -> Result<u64> {
    Ok(cell_spans(long_range, lat_range, envelope, step)?
        .map_or(0, |(lon, lat)| span_len(lon).saturating_mul(span_len(lat))))
}

fn span_len((first, last): (u32, u32)) -> u64 {
    u64::from(last) - u64::from(first) + 1
}

/// Every cell at `step` that overlaps `envelope`, in Z-order.
///
/// The envelope is clipped to the domain first; an envelope entirely outside the domain yields
/// no cells.
pub fn covering_cells(
    long_range: GeohashRange,
    lat_range: GeohashRange,
    envelope: &Envelope,
    step: u8,
) -> Result<Vec<GeohashBits>> {
    let Some(((x0, x1), (y0, y1))) = cell_spans(long_range, lat_range, envelope, step)? else {
        return Ok(vec![]);
    };
    let count = span_len((x0, x1)).saturating_mul(span_len((y0, y1)));
    let mut cells = Vec::new();
    cells.try_reserve_exact(usize::try_from(count).map_err(|_| GeodexError::OutOfMemory)?)?;
    for x in x0..=x1 {
        for y in y0..=y1 {
            cells.push(GeohashBits::from_cell(x, y, step));
        }
    }
    cells.sort_unstable_by_key(|cell| cell.bits);
    Ok(cells)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geohash::{decode, encode};

    fn unit() -> GeohashRange {
        GeohashRange::new(0., 16.)
    }

    #[test]
    fn covers_envelope() {
        let env = Envelope::new(1., 1., 5., 3.);
        let cells = covering_cells(unit(), unit(), &env, 3).unwrap();
        // cells are 2 x 2: columns 0..=2, rows 0..=1
        assert_eq!(cells.len(), 6);
        assert_eq!(covering_cell_count(unit(), unit(), &env, 3).unwrap(), 6);
        for cell in &cells {
            let area = decode(unit(), unit(), *cell).unwrap();
            let cell_env = Envelope::new(
                area.longitude.min,
                area.latitude.min,
                area.longitude.max,
                area.latitude.max,
            );
            assert!(cell_env.intersects(&env));
        }
        assert!(cells.contains(&encode(unit(), unit(), 4.5, 2.5, 3).unwrap()));
        assert!(cells.windows(2).all(|w| w[0].bits < w[1].bits));
    }

    #[test]
    fn clips_to_domain() {
        let env = Envelope::new(-100., -100., 1., 1.);
        let cells = covering_cells(unit(), unit(), &env, 2).unwrap();
        assert_eq!(cells.len(), 1);

        let outside = Envelope::new(20., 20., 30., 30.);
        assert!(covering_cells(unit(), unit(), &outside, 2).unwrap().is_empty());
        assert_eq!(covering_cell_count(unit(), unit(), &outside, 2).unwrap(), 0);
    }

    #[test]
    fn full_width_count_at_finest_step() {
        let world = Envelope::new(-180., 0., 180., 0.);
        let (lon, lat) = (GeohashRange::wgs84_longitude(), GeohashRange::wgs84_latitude());
        assert_eq!(covering_cell_count(lon, lat, &world, 32).unwrap(), 1 << 32);

        let everything = Envelope::new(0., 0., 16., 16.);
        assert_eq!(
            covering_cell_count(unit(), unit(), &everything, 32).unwrap(),
            u64::MAX
        );
        assert_eq!(
            covering_cells(unit(), unit(), &everything, 32).unwrap_err().kind(),
            crate::error::ErrorKind::OutOfMemory
        );
    }
}
