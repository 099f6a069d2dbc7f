use criterion::{Criterion, criterion_group, criterion_main};
use geo_types::{Coord, LineString};
use tab::{Feature, MapFile, PenDef};

fn roundtrip(vertex_count: usize, compress: bool) {
    let line = LineString::new(
        (0..vertex_count)
            .map(|i| Coord {
                x: i as f64,
                y: (i % 100) as f64,
            })
            .collect(),
    );
    let feature = Feature::polyline(line, PenDef::default(), false);
    let mut map = MapFile::memory();
    map.write_feature(&feature, compress).unwrap();
    map.rewind().unwrap();
    let _ = map.read_feature().unwrap();
}

fn bench_roundtrip(c: &mut Criterion) {
    c.bench_function("polyline 100", |b| b.iter(|| roundtrip(100, false)));
    c.bench_function("polyline 100 compressed", |b| b.iter(|| roundtrip(100, true)));
    c.bench_function("polyline 10000", |b| b.iter(|| roundtrip(10_000, false)));
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
