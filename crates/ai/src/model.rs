//! Forecast records.
//!
//! All records are transient: created per forecast request and never mutated
//! afterwards. Persisting them is a collaborator concern.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockcast_core::ProductId;

/// Units sold on one calendar date.
///
/// Providers only report dates with at least one sale, so a series has gaps
/// wherever nothing sold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySalesPoint {
    pub date: NaiveDate,
    pub quantity: i64,
}

impl DailySalesPoint {
    pub fn new(date: NaiveDate, quantity: i64) -> Self {
        Self { date, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastInput {
    pub product_id: ProductId,
    pub current_stock: i64,
    /// Daily sales over the lookback window, in any order.
    pub history: Vec<DailySalesPoint>,
    pub horizon_days: u32,
}

impl ForecastInput {
    pub const DEFAULT_HORIZON_DAYS: u32 = 7;

    pub fn new(product_id: ProductId, current_stock: i64, history: Vec<DailySalesPoint>) -> Self {
        Self {
            product_id,
            current_stock,
            history,
            horizon_days: Self::DEFAULT_HORIZON_DAYS,
        }
    }

    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }
}

/// One projected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// 1-based offset from today.
    pub day_offset: u32,
    pub date: NaiveDate,
    pub predicted_demand: i64,
    /// Stock left after this day's demand, floored at zero.
    pub predicted_stock: i64,
}

/// Which branch produced a forecast.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Too few sale-days to fit; flat baseline demand.
    FlatBaseline,
    /// Ordinary least squares over the observed sale-days.
    LinearRegression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub product_id: ProductId,
    pub current_stock: i64,
    pub days: Vec<ForecastDay>,
    pub total_predicted_demand: i64,
    pub needs_reorder: bool,
    /// Goodness of fit in \[0, 1\]. Absent on the flat-baseline path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_confidence: Option<f64>,
    pub method: ForecastMethod,
}

impl ForecastResult {
    /// Stock projected for the last day of the horizon.
    pub fn final_stock(&self) -> i64 {
        self.days
            .last()
            .map(|d| d.predicted_stock)
            .unwrap_or(self.current_stock)
    }

    pub fn horizon_days(&self) -> usize {
        self.days.len()
    }
}

/// Reorder advice for a product projected to run low.
///
/// `predicted_demand_7d` and `predicted_stock_7d` cover the forecast horizon,
/// which is 7 days unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub product_id: ProductId,
    pub current_stock: i64,
    pub predicted_demand_7d: i64,
    pub predicted_stock_7d: i64,
    pub suggested_reorder_quantity: i64,
}
