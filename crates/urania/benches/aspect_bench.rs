use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use urania::{AspectCalculator, AspectSettings, CelestialBody, Motion};

fn bench_classify(c: &mut Criterion) {
    let calculator = AspectCalculator::new();
    let settings = AspectSettings::default();

    c.bench_function("classify", |b| {
        b.iter(|| calculator.classify(black_box(100.0), black_box(222.0), black_box(&settings)))
    });
}

fn bench_compute_full_chart(c: &mut Criterion) {
    let calculator = AspectCalculator::new();
    let settings = AspectSettings::default();

    let keys = [
        "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune",
        "pluto", "northnode", "southnode", "lilith", "chiron", "midheaven",
    ];
    let bodies: HashMap<String, CelestialBody> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            (
                key.to_string(),
                CelestialBody::new(key, i as f64 * 29.7, Motion::Direct),
            )
        })
        .collect();

    c.bench_function("compute_full_chart", |b| {
        b.iter(|| calculator.compute(black_box(&bodies), black_box(&settings)))
    });
}

criterion_group!(benches, bench_classify, bench_compute_full_chart);
criterion_main!(benches);
