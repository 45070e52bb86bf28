//! End-to-end and per-stage synthesis benchmarks.
//!
//! Run with: `cargo bench --bench synthesis`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kardia::params::{resolve, resolve_diagnosis};
use kardia::prelude::*;
use kardia::rhythm::schedule;
use kardia::source::{SourceContext, SourceModel};
use kardia::utils::{Random, Stage};

fn request(dx: &str) -> SynthesisRequest {
    SynthesisRequest {
        age_years: 8.0,
        sex: None,
        dx: dx.to_string(),
        seed: 12345,
        options: SynthesisOptions::default(),
    }
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");
    for dx in ["Normal sinus", "LBBB", "Atrial flutter", "PVCs"] {
        group.bench_with_input(BenchmarkId::from_parameter(dx), dx, |b, dx| {
            let req = request(dx);
            b.iter(|| synthesize(black_box(&req)).unwrap());
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    group.bench_function("resolve", |b| {
        b.iter(|| resolve(black_box(8.0), None, "Normal sinus", 12345));
    });

    let params = resolve(8.0, None, "Normal sinus", 12345);
    let dx = resolve_diagnosis("Normal sinus");

    group.bench_function("schedule", |b| {
        b.iter(|| {
            let mut rng = Random::for_stage(12345, Stage::Rhythm);
            schedule(black_box(&params), dx, 10.0, &mut rng)
        });
    });

    let mut rhythm_rng = Random::for_stage(12345, Stage::Rhythm);
    let sched = schedule(&params, dx, 10.0, &mut rhythm_rng);

    group.bench_function("render_dipole", |b| {
        b.iter(|| {
            let ctx = SourceContext {
                schedule: &sched,
                params: &params,
                morphology: &dx.morphology,
                rhythm: dx.rhythm,
                duration_s: 10.0,
            };
            let mut rng = Random::for_stage(12345, Stage::Source);
            SourceKind::Dipole.build().render(black_box(&ctx), &mut rng)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_full_pipeline, bench_stages);
criterion_main!(benches);
