use crate::config::ForecastConfig;
use crate::model::{ForecastResult, ReorderSuggestion};

/// Turns a forecast that needs a reorder into an order quantity.
///
/// Orders twice the projected demand, but never fewer than the configured minimum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReorderAdvisor {
    min_quantity: i64,
    multiplier: i64,
}

impl Default for ReorderAdvisor {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

impl ReorderAdvisor {
    pub fn new(min_quantity: i64, multiplier: i64) -> Self {
        Self {
            min_quantity,
            multiplier,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.min_reorder_quantity, config.reorder_multiplier)
    }

    pub fn suggest(&self, result: &ForecastResult) -> Option<ReorderSuggestion> {
        if !result.needs_reorder {
            return None;
        }

        let suggested = result
            .total_predicted_demand
            .saturating_mul(self.multiplier)
            .max(self.min_quantity);

        Some(ReorderSuggestion {
            product_id: result.product_id,
            current_stock: result.current_stock,
            predicted_demand_7d: result.total_predicted_demand,
            predicted_stock_7d: result.final_stock(),
            suggested_reorder_quantity: suggested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastDay, ForecastMethod};
    use chrono::NaiveDate;
    use stockcast_core::ProductId;

    fn result(total: i64, final_stock: i64, needs_reorder: bool) -> ForecastResult {
        ForecastResult {
            product_id: ProductId::new(7),
            current_stock: final_stock + total,
            days: vec![ForecastDay {
                day_offset: 1,
                date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
                predicted_demand: total,
                predicted_stock: final_stock,
            }],
            total_predicted_demand: total,
            needs_reorder,
            model_confidence: None,
            method: ForecastMethod::FlatBaseline,
        }
    }

    #[test]
    fn no_suggestion_without_reorder_flag() {
        assert_eq!(ReorderAdvisor::default().suggest(&result(50, 40, false)), None);
    }

    #[test]
    fn small_demand_orders_the_minimum() {
        let s = ReorderAdvisor::default().suggest(&result(3, 2, true)).unwrap();
        assert_eq!(s.suggested_reorder_quantity, 10);
        assert_eq!(s.predicted_demand_7d, 3);
        assert_eq!(s.predicted_stock_7d, 2);
        assert_eq!(s.current_stock, 5);
        assert_eq!(s.product_id, ProductId::new(7));
    }

    #[test]
    fn large_demand_orders_double() {
        let s = ReorderAdvisor::default().suggest(&result(20, 0, true)).unwrap();
        assert_eq!(s.suggested_reorder_quantity, 40);
    }

    #[test]
    fn zero_demand_still_orders_the_minimum() {
        let s = ReorderAdvisor::default().suggest(&result(0, 1, true)).unwrap();
        assert_eq!(s.suggested_reorder_quantity, 10);
    }
}
