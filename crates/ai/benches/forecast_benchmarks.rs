use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Days, NaiveDate, TimeZone, Utc};
use stockcast_ai::{DailySalesPoint, ForecastEngine, ForecastInput, ReorderAdvisor};
use stockcast_core::ProductId;

/// Noisy upward trend, newest first (the order the sales store returns it in).
fn history(len: usize) -> Vec<DailySalesPoint> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..len)
        .rev()
        .map(|i| {
            let noise = ((i * 7919) % 5) as i64;
            DailySalesPoint::new(start + Days::new(i as u64), 3 + (i as i64) / 2 + noise)
        })
        .collect()
}

fn bench_forecast(c: &mut Criterion) {
    let engine = ForecastEngine::default();
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();

    let mut group = c.benchmark_group("forecast");
    for len in [0usize, 1, 2, 7, 30] {
        let input = ForecastInput::new(ProductId::new(1), 500, history(len));
        group.throughput(Throughput::Elements(len.max(1) as u64));
        group.bench_with_input(BenchmarkId::new("history_len", len), &input, |b, input| {
            b.iter(|| engine.forecast(black_box(input), now).unwrap())
        });
    }
    group.finish();
}

fn bench_forecast_and_advise(c: &mut Criterion) {
    let engine = ForecastEngine::default();
    let advisor = ReorderAdvisor::default();
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    let inputs: Vec<ForecastInput> = (0..100)
        .map(|i| ForecastInput::new(ProductId::new(i), i * 3, history(30)))
        .collect();

    c.bench_function("catalog_100_products", |b| {
        b.iter(|| {
            inputs
                .iter()
                .filter_map(|input| engine.forecast(black_box(input), now).ok())
                .filter_map(|result| advisor.suggest(&result))
                .count()
        })
    });
}

criterion_group!(benches, bench_forecast, bench_forecast_and_advise);
criterion_main!(benches);
