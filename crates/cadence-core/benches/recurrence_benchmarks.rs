use cadence_core::coordinator::SeriesEditCoordinator;
use cadence_core::matching::{MatcherConfig, MerchantMatcher, MerchantRule};
use cadence_core::models::{
    EditScope, NewSeriesData, OccurrenceEdits, RecurrenceRule, SeriesKind,
};
use cadence_core::recurrence::RecurrenceEngine;
use cadence_core::unit_of_work::UnitOfWork;
use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn daily_series(days: u64) -> NewSeriesData {
    NewSeriesData {
        kind: SeriesKind::Income,
        title: "Benchmark income".to_string(),
        amount: Decimal::new(100, 0),
        is_planned: true,
        rule: RecurrenceRule::daily(1),
        start_date: start(),
        end_date: Some(start() + Days::new(days)),
    }
}

fn bench_occurrence_generation(c: &mut Criterion) {
    let rules = [
        ("daily", RecurrenceRule::daily(1)),
        ("weekly", RecurrenceRule::weekly(2, 6)),
        ("monthly", RecurrenceRule::monthly(1, 31)),
        ("yearly", RecurrenceRule::yearly(1, 2, 29)),
    ];
    let end = start() + Days::new(3650);

    let mut group = c.benchmark_group("occurrence_generation");
    for (name, rule) in rules {
        let engine = RecurrenceEngine::new(rule, start(), end);
        group.bench_with_input(BenchmarkId::new("ten_years", name), &engine, |b, engine| {
            b.iter(|| black_box(engine).occurrences())
        });
    }
    group.finish();
}

fn bench_regeneration(c: &mut Criterion) {
    let mut group = c.benchmark_group("regeneration");
    for days in [30u64, 365, 1825] {
        let mut uow = UnitOfWork::new();
        let series = SeriesEditCoordinator::new(&mut uow)
            .create_series(&daily_series(days))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, _| {
            b.iter(|| {
                let mut staged = uow.clone();
                SeriesEditCoordinator::new(&mut staged)
                    .regenerate(black_box(series.id), true)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut uow = UnitOfWork::new();
    let series = SeriesEditCoordinator::new(&mut uow)
        .create_series(&daily_series(365))
        .unwrap();
    let midpoint = uow
        .occurrences_of(series.id)
        .into_iter()
        .find(|o| o.date == start() + Days::new(182))
        .map(|o| o.id)
        .unwrap();
    let edits = OccurrenceEdits {
        amount: Some(Decimal::new(120, 0)),
        ..Default::default()
    };

    c.bench_function("split_daily_year", |b| {
        b.iter(|| {
            let mut staged = uow.clone();
            SeriesEditCoordinator::new(&mut staged)
                .apply_edit_scope(black_box(midpoint), &edits, EditScope::ThisAndFuture)
                .unwrap()
        })
    });
}

fn bench_merchant_suggestion(c: &mut Criterion) {
    let rules = (0..200).map(|i| MerchantRule {
        merchant: format!("merchant number {}", i),
        category: format!("category {}", i % 12),
    });
    let matcher = MerchantMatcher::new(MatcherConfig::default(), rules);

    c.bench_function("merchant_suggestion", |b| {
        b.iter(|| matcher.suggest(black_box("Merchant Number 117 #42")))
    });
}

criterion_group!(
    benches,
    bench_occurrence_generation,
    bench_regeneration,
    bench_split,
    bench_merchant_suggestion
);
criterion_main!(benches);
