use serde::{Deserialize, Serialize};

use stockcast_core::DomainError;

/// Tunables for forecasting and reorder advice.
///
/// Defaults reproduce the production behaviour: a 7-day horizon over a 30-day
/// lookback, reorder when fewer than 5 units are projected to remain, and
/// order at least 10 units or twice the projected demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    /// How far back sales history is requested from the provider.
    pub lookback_days: u32,
    /// Projected last-day stock strictly below this triggers a reorder.
    pub low_stock_threshold: i64,
    /// Flat per-day demand assumed when history is too sparse to fit.
    pub sparse_daily_demand: i64,
    /// Minimum distinct sale-days required for the regression path.
    pub min_regression_points: usize,
    pub min_reorder_quantity: i64,
    pub reorder_multiplier: i64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            lookback_days: 30,
            low_stock_threshold: 5,
            sparse_daily_demand: 1,
            min_regression_points: 2,
            min_reorder_quantity: 10,
            reorder_multiplier: 2,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.horizon_days == 0 {
            return Err(DomainError::invalid_input("horizon_days must be >= 1"));
        }
        if self.lookback_days == 0 {
            return Err(DomainError::invalid_input("lookback_days must be >= 1"));
        }
        // A line needs two points.
        if self.min_regression_points < 2 {
            return Err(DomainError::invalid_input(
                "min_regression_points must be >= 2",
            ));
        }
        if self.sparse_daily_demand < 0 {
            return Err(DomainError::invalid_input(
                "sparse_daily_demand must be >= 0",
            ));
        }
        if self.min_reorder_quantity < 0 || self.reorder_multiplier < 0 {
            return Err(DomainError::invalid_input(
                "reorder quantities must be non-negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ForecastConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let cfg = ForecastConfig {
            horizon_days: 0,
            ..ForecastConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn single_point_regression_is_rejected() {
        let cfg = ForecastConfig {
            min_regression_points: 1,
            ..ForecastConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: ForecastConfig = serde_json::from_str(r#"{"horizon_days": 14}"#).unwrap();
        assert_eq!(cfg.horizon_days, 14);
        assert_eq!(cfg.lookback_days, 30);
        assert_eq!(cfg.low_stock_threshold, 5);
    }
}
