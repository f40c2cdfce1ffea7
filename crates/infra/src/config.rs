//! Configuration loading from the process environment.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use stockcast_ai::ForecastConfig;

/// Runtime settings for the forecast service, refresh runner and scan simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub forecast: ForecastConfig,
    pub refresh_interval: Duration,
    pub detector_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            forecast: ForecastConfig::default(),
            refresh_interval: Duration::from_secs(3600),
            detector_seed: 0,
        }
    }
}

impl Settings {
    /// Read `STOCKCAST_*` variables, keeping defaults for anything unset or malformed.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let forecast = &mut settings.forecast;

        if let Some(v) = parse(&lookup, "STOCKCAST_HORIZON_DAYS") {
            forecast.horizon_days = v;
        }
        if let Some(v) = parse(&lookup, "STOCKCAST_LOOKBACK_DAYS") {
            forecast.lookback_days = v;
        }
        if let Some(v) = parse(&lookup, "STOCKCAST_LOW_STOCK_THRESHOLD") {
            forecast.low_stock_threshold = v;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "STOCKCAST_REFRESH_INTERVAL_SECS") {
            settings.refresh_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(v) = parse(&lookup, "STOCKCAST_DETECTOR_SEED") {
            settings.detector_seed = v;
        }

        if let Err(e) = settings.forecast.validate() {
            warn!(error = %e, "invalid forecast settings in environment; using defaults");
            settings.forecast = ForecastConfig::default();
        }

        settings
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring malformed setting");
            None
        }
    }
}
