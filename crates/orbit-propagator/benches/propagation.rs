use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orbit_propagator::{
    predict_positions, predict_positions_parallel, solve_kepler_equation, ElementInput,
    OrbitalElementSet, OrbitalPropagator, TimeSampling,
};

fn molniya() -> OrbitalPropagator {
    let input = ElementInput {
        name: "MOLNIYA 1-93".to_string(),
        id: "28163".to_string(),
        inclination_deg: 63.4,
        eccentricity: 0.74,
        semi_major_axis_km: 26600.0,
        mean_anomaly_deg: 10.0,
        raan_deg: 120.0,
        argument_of_perigee_deg: 270.0,
        epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    };
    OrbitalPropagator::new(OrbitalElementSet::try_from(input).unwrap())
}

fn bench_kepler(c: &mut Criterion) {
    c.bench_function("solve_kepler e=0.74", |b| {
        b.iter(|| solve_kepler_equation(black_box(4.2), black_box(0.74)))
    });
}

fn bench_prediction(c: &mut Criterion) {
    let prop = molniya();
    let sampling = TimeSampling::new(86400.0, 10.0).unwrap();

    c.bench_function("predict_positions 1 day @ 10 s", |b| {
        b.iter(|| predict_positions(black_box(&prop), black_box(&sampling)).unwrap())
    });
    c.bench_function("predict_positions_parallel 1 day @ 10 s x4", |b| {
        b.iter(|| predict_positions_parallel(black_box(&prop), black_box(&sampling), 4).unwrap())
    });
}

criterion_group!(benches, bench_kepler, bench_prediction);
criterion_main!(benches);
