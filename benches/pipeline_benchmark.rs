//! Criterion benchmarks for the preprocessing hot paths
//!
//! These benchmarks measure:
//! - SMOTE resampling over mixed numeric/categorical records
//! - Corpus normalization and term matrix construction

use attrition_pipeline::{
    data::{Attrition, Dataset, Feature, FeatureSchema, Record, Value},
    preprocessing::Resampler,
    text::{Corpus, StopWords, TextNormalizer, Vectorizer, Weighting},
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn training_set(n: usize) -> Dataset {
    let schema = FeatureSchema::new(vec![
        Feature::numeric("Age"),
        Feature::numeric("MonthlyIncome"),
        Feature::categorical(
            "BusinessTravel",
            vec![
                "Non-Travel".to_string(),
                "Travel_Frequently".to_string(),
                "Travel_Rarely".to_string(),
            ],
        ),
    ])
    .expect("valid schema");

    let travel = ["Non-Travel", "Travel_Frequently", "Travel_Rarely"];
    let records = (0..n)
        .map(|i| {
            Record::labeled(
                vec![
                    Value::Numeric(20.0 + (i % 40) as f64),
                    Value::Numeric(1_000.0 + (i * 37 % 9_000) as f64),
                    Value::Categorical(travel[i % 3].to_string()),
                ],
                if i % 6 == 0 {
                    Attrition::Left
                } else {
                    Attrition::Stayed
                },
            )
        })
        .collect();
    Dataset::new(schema, records).expect("valid records")
}

fn reviews(n: usize) -> Corpus {
    let templates = [
        "Great team and a supportive manager, but the pay could be better.",
        "Terrible management; 60 hour weeks and no growth in 2 years!",
        "Good benefits, flexible hours and friendly colleagues.",
        "Bad communication from leadership and constant reorganisations.",
    ];
    Corpus::from_texts((0..n).map(|i| templates[i % templates.len()]))
}

/// Benchmark SMOTE on growing training sets
fn bench_resampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("resampler");
    let resampler = Resampler::new(300, 150, 5, 42);

    for size in [200, 1_000] {
        let dataset = training_set(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| resampler.resample(black_box(dataset)).expect("resample"));
        });
    }
    group.finish();
}

/// Benchmark normalization followed by TF-IDF vectorization
fn bench_vectorizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorizer");
    let normalizer = TextNormalizer::monolingual(&StopWords::english()).expect("stop words");
    let vectorizer = Vectorizer::new(Weighting::TfIdf, 0.01);

    for size in [500, 5_000] {
        let corpus = reviews(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &corpus, |b, corpus| {
            b.iter(|| {
                let normalized = normalizer.normalize(corpus.clone()).expect("normalize");
                vectorizer.vectorize(black_box(&normalized)).expect("vectorize")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resampler, bench_vectorizer);
criterion_main!(benches);
