use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::debug;

use stockcast_core::{DomainError, DomainResult};

use crate::config::ForecastConfig;
use crate::model::{DailySalesPoint, ForecastDay, ForecastInput, ForecastMethod, ForecastResult};
use crate::regression::LinearFit;

/// Confidence reported when exactly two sale-days were fitted (R² would trivially be 1).
const TWO_POINT_CONFIDENCE: f64 = 0.5;

/// Deterministic demand forecaster.
///
/// Model:
/// - Normalize history: ascending by date, one point per date.
/// - Too few sale-days: flat baseline demand per day, no confidence.
/// - Otherwise: OLS line over the positional index of observed sale-days,
///   extrapolated past the last observation and truncated to whole units.
/// - Drain current stock by each day's demand, floored at zero.
///
/// Gaps between sale-days are not zero-filled: the line is fitted against
/// sale-days, not calendar days.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Project demand and stock for `input.horizon_days` days after `now`.
    ///
    /// `now` only labels the predicted dates; identical inputs always give
    /// identical results.
    pub fn forecast(&self, input: &ForecastInput, now: DateTime<Utc>) -> DomainResult<ForecastResult> {
        validate(input)?;

        let history = normalize(&input.history);
        let today = now.date_naive();

        let (demands, method, model_confidence) = match self.fit(&history) {
            Some((fit, ys)) => {
                let last_index = (ys.len() - 1) as f64;
                let demands = (1..=input.horizon_days)
                    .map(|k| whole_units(fit.predict(last_index + f64::from(k))))
                    .collect::<Vec<_>>();
                let confidence = if ys.len() > 2 {
                    fit.r_squared(&ys)
                } else {
                    TWO_POINT_CONFIDENCE
                };
                (demands, ForecastMethod::LinearRegression, Some(confidence))
            }
            None => {
                let demands = vec![self.config.sparse_daily_demand; input.horizon_days as usize];
                (demands, ForecastMethod::FlatBaseline, None)
            }
        };

        let days = project(input.current_stock, &demands, today)?;
        let total_predicted_demand = days
            .iter()
            .fold(0i64, |acc, d| acc.saturating_add(d.predicted_demand));
        let final_stock = days.last().map(|d| d.predicted_stock).unwrap_or(input.current_stock);
        let needs_reorder = final_stock < self.config.low_stock_threshold;

        debug!(
            product_id = %input.product_id,
            method = ?method,
            sale_days = history.len(),
            total_predicted_demand,
            final_stock,
            needs_reorder,
            "forecast computed"
        );

        Ok(ForecastResult {
            product_id: input.product_id,
            current_stock: input.current_stock,
            days,
            total_predicted_demand,
            needs_reorder,
            model_confidence,
            method,
        })
    }

    fn fit(&self, history: &[DailySalesPoint]) -> Option<(LinearFit, Vec<f64>)> {
        if history.len() < self.config.min_regression_points.max(2) {
            return None;
        }
        let ys = history.iter().map(|p| p.quantity as f64).collect::<Vec<_>>();
        LinearFit::fit(&ys).map(|fit| (fit, ys))
    }
}

fn validate(input: &ForecastInput) -> DomainResult<()> {
    if input.horizon_days == 0 {
        return Err(DomainError::invalid_input("horizon_days must be >= 1"));
    }
    if input.current_stock < 0 {
        return Err(DomainError::invalid_input(format!(
            "current_stock must be >= 0 (got {})",
            input.current_stock
        )));
    }
    if let Some(p) = input.history.iter().find(|p| p.quantity < 0) {
        return Err(DomainError::invalid_input(format!(
            "sales quantity must be >= 0 (got {} on {})",
            p.quantity, p.date
        )));
    }
    Ok(())
}

/// Ascending by date, duplicate dates summed.
fn normalize(history: &[DailySalesPoint]) -> Vec<DailySalesPoint> {
    let mut points = history.to_vec();
    points.sort_by_key(|p| p.date);

    let mut merged: Vec<DailySalesPoint> = Vec::with_capacity(points.len());
    for p in points {
        match merged.last_mut() {
            Some(last) if last.date == p.date => {
                last.quantity = last.quantity.saturating_add(p.quantity);
            }
            _ => merged.push(p),
        }
    }
    merged
}

/// Truncate toward zero, never negative.
fn whole_units(raw: f64) -> i64 {
    if !raw.is_finite() {
        return 0;
    }
    (raw.trunc() as i64).max(0)
}

fn project(current_stock: i64, demands: &[i64], today: NaiveDate) -> DomainResult<Vec<ForecastDay>> {
    let mut stock = current_stock;
    let mut days = Vec::with_capacity(demands.len());

    for (i, &demand) in demands.iter().enumerate() {
        let day_offset = (i + 1) as u32;
        let date = today
            .checked_add_days(Days::new(u64::from(day_offset)))
            .ok_or_else(|| DomainError::invalid_input("forecast horizon runs past the calendar"))?;

        stock = stock.saturating_sub(demand).max(0);
        days.push(ForecastDay {
            day_offset,
            date,
            predicted_demand: demand,
            predicted_stock: stock,
        });
    }

    Ok(days)
}
