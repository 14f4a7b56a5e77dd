use criterion::{criterion_group, criterion_main, Criterion};
use geodex::geometry::{Geometry, GeometryType};
use geodex::io::wkb::{read_wkb, write_wkb};
use geodex::io::Endianness;

/// A multipolygon of `n` regular 64-gons, each with one hole.
fn make_multipolygon(n: usize) -> Geometry {
    let ring = |cx: f64, cy: f64, r: f64| {
        let mut coords: Vec<(f64, f64)> = (0..64)
            .map(|i| {
                let a = i as f64 / 64. * std::f64::consts::TAU;
                (cx + r * a.cos(), cy + r * a.sin())
            })
            .collect();
        coords.push(coords[0]);
        Geometry::linear_ring(coords).unwrap()
    };
    let polygons = (0..n)
        .map(|i| {
            let cx = (i % 100) as f64 * 3.;
            let cy = (i / 100) as f64 * 3.;
            Geometry::polygon(ring(cx, cy, 1.), vec![ring(cx, cy, 0.5)]).unwrap()
        })
        .collect();
    Geometry::collection(GeometryType::MultiPolygon, polygons).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let geom = make_multipolygon(1_000);
    let little = write_wkb(&geom, Endianness::LittleEndian).unwrap();
    let big = write_wkb(&geom, Endianness::BigEndian).unwrap();

    c.bench_function("write little-endian WKB multipolygon", |b| {
        b.iter(|| {
            let _bytes = write_wkb(&geom, Endianness::LittleEndian).unwrap();
        })
    });
    c.bench_function("read little-endian WKB multipolygon", |b| {
        b.iter(|| {
            let _geom = read_wkb(&little).unwrap();
        })
    });
    c.bench_function("read big-endian WKB multipolygon", |b| {
        b.iter(|| {
            let _geom = read_wkb(&big).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
