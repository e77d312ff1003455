//! Benchmarks for stage validation and health evaluation.

use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use interview_tracker::graph::validate_transition;
use interview_tracker::health::HealthEvaluator;
use interview_tracker::prelude::Stage;
use interview_tracker::testing::{fixed_now, PipelineFixture};

fn transition_benchmark(c: &mut Criterion) {
    c.bench_function("validate_all_pairs", |b| {
        b.iter(|| {
            let mut legal = 0;
            for from in Stage::ALL {
                for to in Stage::ALL {
                    if validate_transition(black_box(from), black_box(to)).is_ok() {
                        legal += 1;
                    }
                }
            }
            legal
        });
    });
}

fn health_benchmark(c: &mut Criterion) {
    let now = fixed_now();
    let evaluator = HealthEvaluator::default();
    let pipelines: Vec<_> = (0..100_i64)
        .map(|i| {
            PipelineFixture::new(format!("Company {i}"), now)
                .stage(Stage::TechRound2)
                .updated_days_ago(i % 15)
                .interview_in(Duration::days(i % 7 - 3))
                .build()
        })
        .collect();

    c.bench_function("attention_list_100", |b| {
        b.iter(|| evaluator.attention_list(black_box(&pipelines), now));
    });
}

criterion_group!(benches, transition_benchmark, health_benchmark);
criterion_main!(benches);
