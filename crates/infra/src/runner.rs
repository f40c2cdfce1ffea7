use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Settings;
use crate::ports::ForecastStore;
use crate::service::{ForecastBatch, ForecastService};

/// Sink for catalog forecast batches.
///
/// Batches are read-side insights: emitting one never mutates the catalog.
pub trait ForecastInsightSink: Send + Sync + 'static {
    fn emit(&self, batch: ForecastBatch);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryForecastInsightSink {
    inner: Mutex<Vec<ForecastBatch>>,
}

impl InMemoryForecastInsightSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ForecastBatch> {
        self.inner.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl ForecastInsightSink for InMemoryForecastInsightSink {
    fn emit(&self, batch: ForecastBatch) {
        if let Ok(mut batches) = self.inner.lock() {
            batches.push(batch);
        }
    }
}

/// Config for the periodic catalog forecast.
///
/// This is the caller-side retry policy: the engine and service never retry,
/// the runner retries upstream failures with bounded exponential backoff.
#[derive(Debug, Clone)]
pub struct ForecastRefreshRunner {
    /// Must be non-zero; [`ForecastRefreshRunner::spawn`] rejects a zero interval.
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for ForecastRefreshRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            max_retries: 5,
            base_backoff: Duration::from_millis(250),
        }
    }
}

/// Longest wait between checks for shutdown and triggers.
const POLL: Duration = Duration::from_millis(50);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Handle for the running refresh thread (shutdown + trigger hook).
///
/// Dropping the handle without [`ForecastRefreshHandle::shutdown`] also stops
/// the thread, but does not wait for it.
#[derive(Debug)]
pub struct ForecastRefreshHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl ForecastRefreshHandle {
    /// Request a refresh now, e.g. after a sale or restock.
    ///
    /// Triggers are coalesced: if a run is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the runner thread and wait for it.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl ForecastRefreshRunner {
    /// Runner on the configured refresh interval, with default retry policy.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: settings.refresh_interval.max(Duration::from_secs(1)),
            ..Self::default()
        }
    }

    /// Spawn the refresh thread.
    ///
    /// - Schedule: runs once on startup, then `interval` after each finished run
    /// - Event-trigger: call `handle.trigger()` after stock or sales change
    /// - Failures: upstream errors are retried with backoff; invalid input is
    ///   logged and waits for the next tick
    pub fn spawn<S, K>(
        &self,
        name: &'static str,
        service: Arc<ForecastService<S>>,
        sink: Arc<K>,
    ) -> io::Result<ForecastRefreshHandle>
    where
        S: ForecastStore,
        K: ForecastInsightSink,
    {
        if self.interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "forecast refresh interval must be non-zero",
            ));
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.clone();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || cfg.run(name, shutdown_rx, trigger_rx, &service, &*sink))?;

        Ok(ForecastRefreshHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }

    fn run<S, K>(
        &self,
        name: &'static str,
        shutdown_rx: mpsc::Receiver<()>,
        trigger_rx: mpsc::Receiver<()>,
        service: &ForecastService<S>,
        sink: &K,
    ) where
        S: ForecastStore,
        K: ForecastInsightSink,
    {
        info!(
            runner = name,
            interval_ms = self.interval.as_millis() as u64,
            "forecast refresh runner started"
        );

        let mut next_run = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let now = Instant::now();
            // a retry already pending absorbs any trigger
            if trigger_rx.try_recv().is_ok() && attempt == 0 {
                next_run = now;
            }

            if now < next_run {
                match shutdown_rx.recv_timeout((next_run - now).min(POLL)) {
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            match shutdown_rx.try_recv() {
                Err(mpsc::TryRecvError::Empty) => {}
                Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
            }

            next_run = match service.forecast_all() {
                Ok(batch) => {
                    attempt = 0;
                    sink.emit(batch);
                    Instant::now() + self.interval
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(runner = name, error = %e, attempt, "catalog forecast failed; retrying");
                    Instant::now() + backoff(self.base_backoff, attempt)
                }
                Err(e) => {
                    warn!(runner = name, error = %e, "catalog forecast failed; waiting for next tick");
                    attempt = 0;
                    Instant::now() + self.interval
                }
            };
        }

        info!(runner = name, "forecast refresh runner stopped");
    }
}

/// `base * 2^(attempt - 1)`, capped at [`MAX_BACKOFF`].
fn backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}
