use std::sync::Arc;

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use stockcast_ai::{
    ForecastConfig, ForecastEngine, ForecastInput, ForecastMethod, ForecastResult, ReorderAdvisor,
    ReorderSuggestion,
};
use stockcast_core::{CatalogProduct, Clock, DomainError, DomainResult, ProductId};

use crate::ports::ForecastStore;

/// A forecast labeled with catalog identity.
///
/// `product_name` and `sku` are absent when the catalog does not know the
/// product; batch runs always label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductForecast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(flatten)]
    pub forecast: ForecastResult,
}

impl ProductForecast {
    fn new(product: Option<CatalogProduct>, forecast: ForecastResult) -> Self {
        let (product_name, sku) = match product {
            Some(p) => (Some(p.name), Some(p.sku)),
            None => (None, None),
        };
        Self {
            product_name,
            sku,
            forecast,
        }
    }
}

/// Forecasts for the whole catalog from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBatch {
    pub generated_at: DateTime<Utc>,
    pub forecasts: Vec<ProductForecast>,
}

impl ForecastBatch {
    pub fn needing_reorder(&self) -> impl Iterator<Item = &ProductForecast> {
        self.forecasts.iter().filter(|f| f.forecast.needs_reorder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReorder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(flatten)]
    pub suggestion: ReorderSuggestion,
}

/// Wires storage collaborators to the forecast engine.
///
/// The engine itself stays pure; this service owns the lookups and the single
/// delegated write of a fitted forecast back onto the product.
pub struct ForecastService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    engine: ForecastEngine,
    advisor: ReorderAdvisor,
}

impl<S: ForecastStore> ForecastService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: ForecastConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            advisor: ReorderAdvisor::from_config(&config),
            engine: ForecastEngine::new(config),
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        self.engine.config()
    }

    /// Forecast one product over `horizon_days` (or the configured default).
    ///
    /// The result carries the catalog name and sku when the product is known.
    /// A fitted forecast is written back through the prediction sink. If that
    /// write fails the failure is logged and the forecast is still returned.
    pub fn forecast_product(
        &self,
        product_id: ProductId,
        horizon_days: Option<u32>,
    ) -> DomainResult<ProductForecast> {
        let now = self.clock.now();
        let product = self.store.find_product(product_id)?;
        let forecast = self.forecast_at(product_id, horizon_days, now)?;
        Ok(ProductForecast::new(product, forecast))
    }

    /// Forecast every catalog product with the default horizon.
    pub fn forecast_all(&self) -> DomainResult<ForecastBatch> {
        let now = self.clock.now();
        let span = info_span!("forecast_all", generated_at = %now);
        let _enter = span.enter();

        let products = self.store.list_products()?;
        let forecasts = products
            .into_iter()
            .map(|product| {
                let forecast = self.forecast_at(product.id, None, now)?;
                Ok(ProductForecast::new(Some(product), forecast))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        info!(
            products = forecasts.len(),
            needing_reorder = forecasts.iter().filter(|f| f.forecast.needs_reorder).count(),
            "catalog forecast complete"
        );

        Ok(ForecastBatch {
            generated_at: now,
            forecasts,
        })
    }

    /// Reorder advice for every catalog product projected to run low.
    pub fn reorder_suggestions(&self) -> DomainResult<Vec<ProductReorder>> {
        let batch = self.forecast_all()?;
        Ok(self.reorders_for(&batch))
    }

    /// Reorder advice derived from an existing batch, without forecasting again.
    pub fn reorders_for(&self, batch: &ForecastBatch) -> Vec<ProductReorder> {
        batch
            .needing_reorder()
            .filter_map(|f| {
                self.advisor.suggest(&f.forecast).map(|suggestion| ProductReorder {
                    product_name: f.product_name.clone(),
                    sku: f.sku.clone(),
                    suggestion,
                })
            })
            .collect()
    }

    fn forecast_at(
        &self,
        product_id: ProductId,
        horizon_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> DomainResult<ForecastResult> {
        let config = self.engine.config();
        let since = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(config.lookback_days)))
            .ok_or_else(|| DomainError::invalid_input("lookback window runs past the calendar"))?;

        let history = self.store.daily_sales(product_id, since)?;
        let current_stock = match self.store.current_stock(product_id)? {
            Some(stock) => stock,
            None => {
                warn!(product_id = %product_id, "product has no stock record; forecasting from zero");
                0
            }
        };

        let input = ForecastInput::new(product_id, current_stock, history)
            .with_horizon(horizon_days.unwrap_or(config.horizon_days));
        let result = self.engine.forecast(&input, now)?;

        if result.method == ForecastMethod::LinearRegression {
            if let Err(e) = self.store.record_prediction(
                product_id,
                result.final_stock(),
                result.total_predicted_demand,
            ) {
                warn!(product_id = %product_id, error = %e, "failed to record prediction");
            }
        }

        Ok(result)
    }
}
