//! Print catalog forecasts and reorder suggestions as JSON.
//!
//! Usage: `forecast-report [--watch] [snapshot.json]`. Without a snapshot a
//! small demo catalog with two weeks of sales is used.
//!
//! With `--watch` the report is printed once, then the refresh runner keeps
//! printing one batch per line every `STOCKCAST_REFRESH_INTERVAL_SECS`. Each
//! line on stdin triggers a refresh; end of input stops the runner.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use stockcast_core::{CatalogProduct, Clock, ProductId, SystemClock};
use stockcast_infra::{
    ForecastBatch, ForecastInsightSink, ForecastRefreshRunner, ForecastService, InMemoryStore,
    Settings, StoreSnapshot,
};
use stockcast_vision::{
    ScanService, SimulatedDetector, VisionLogReader, ANOMALY_LOG_LIMIT, RECENT_LOG_LIMIT,
};

const DEMO_SCANS: usize = 3;

/// Prints each refreshed batch as one JSON line.
struct StdoutBatchSink;

impl ForecastInsightSink for StdoutBatchSink {
    fn emit(&self, batch: ForecastBatch) {
        match serde_json::to_string(&batch) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode forecast batch"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    stockcast_observability::init();

    let settings = Settings::from_env();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut watch = false;
    let mut snapshot_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--watch" => watch = true,
            _ => snapshot_path = Some(arg),
        }
    }

    let store = match snapshot_path {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read snapshot {path}"))?;
            let snapshot: StoreSnapshot = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse snapshot {path}"))?;
            InMemoryStore::from_snapshot(snapshot)
        }
        None => {
            tracing::warn!("no snapshot given; using demo catalog");
            demo_store(clock.now())
        }
    };
    let store = Arc::new(store);

    let scans = ScanService::new(store.clone(), store.clone(), store.clone(), clock.clone());
    let mut detector = SimulatedDetector::with_default_skus(settings.detector_seed);
    for _ in 0..DEMO_SCANS {
        scans.scan(&mut detector)?;
    }

    let service = Arc::new(ForecastService::new(
        store.clone(),
        clock,
        settings.forecast.clone(),
    )?);
    let batch = service.forecast_all()?;
    let reorders = service.reorders_for(&batch);

    let report = json!({
        "generated_at": batch.generated_at,
        "forecasts": batch.forecasts,
        "reorder_count": reorders.len(),
        "reorder_suggestions": reorders,
        "vision_logs": store.recent(RECENT_LOG_LIMIT, None)?,
        "anomalies": store.anomalies(ANOMALY_LOG_LIMIT)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if watch {
        let handle = ForecastRefreshRunner::from_settings(&settings)
            .spawn("forecast-refresh", service, Arc::new(StdoutBatchSink))
            .context("failed to start forecast refresh runner")?;
        for line in std::io::stdin().lock().lines() {
            line.context("failed to read stdin")?;
            handle.trigger();
        }
        handle.shutdown();
    }

    Ok(())
}

fn demo_store(now: DateTime<Utc>) -> InMemoryStore {
    let store = InMemoryStore::new();
    let chair = ProductId::new(1);
    let table = ProductId::new(2);
    let shelf = ProductId::new(3);

    store.add_product(CatalogProduct::new(chair, "Oak Dining Chair", "PROD-001"), 60);
    store.add_product(CatalogProduct::new(table, "Walnut Side Table", "PROD-002"), 12);
    store.add_product(CatalogProduct::new(shelf, "Pine Wall Shelf", "PROD-003"), 9);

    // chairs: steady growth, every day
    for day in 1..=14 {
        store.record_sale(chair, 1 + (14 - day) / 4, now - Duration::days(day));
    }
    // tables: a few scattered sales
    for (day, qty) in [(12, 1), (8, 2), (5, 2), (2, 3)] {
        store.record_sale(table, qty, now - Duration::days(day));
    }
    // shelves: a single sale, too sparse to fit
    store.record_sale(shelf, 4, now - Duration::days(3));

    store
}
