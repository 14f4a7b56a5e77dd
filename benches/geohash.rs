use criterion::{criterion_group, criterion_main, Criterion};
use geodex::geohash::{decode_wgs84, encode_wgs84, neighbors};
use geodex::geometry::Geometry;
use geodex::table::{Field, FieldType, Table, TableFlag};

fn make_points(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let f = i as f64 / n as f64;
            (-179. + 358. * f, -84. + 168. * ((f * 7.).fract()))
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let points = make_points(10_000);

    c.bench_function("encode 10k points at step 26", |b| {
        b.iter(|| {
            let _hashes: Vec<_> = points
                .iter()
                .map(|(x, y)| encode_wgs84(*x, *y, 26).unwrap())
                .collect();
        })
    });

    let hashes: Vec<_> = points
        .iter()
        .map(|(x, y)| encode_wgs84(*x, *y, 26).unwrap())
        .collect();
    c.bench_function("decode 10k hashes", |b| {
        b.iter(|| {
            let _areas: Vec<_> = hashes.iter().map(|h| decode_wgs84(*h).unwrap()).collect();
        })
    });
    c.bench_function("neighbors of 10k hashes", |b| {
        b.iter(|| {
            let _all: Vec<_> = hashes.iter().map(|h| neighbors(*h).unwrap()).collect();
        })
    });

    let mut table = Table::create(
        vec![Field::of_type("n", FieldType::Int32)],
        TableFlag::ReserveColumns,
    )
    .unwrap();
    for (x, y) in &points {
        let mut row = table.add_row().unwrap();
        row.set_geometry(Geometry::point(*x, *y));
    }
    c.bench_function("build geohash index over 10k rows", |b| {
        b.iter(|| {
            let _stats = table.create_spr_index().unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
