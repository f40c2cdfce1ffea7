//! Collaborator contracts the forecast service depends on.
//!
//! Every method reports failure as an [`UpstreamError`]; the service lifts
//! those into `DomainError::Upstream` so callers can tell them apart from bad
//! input.

use chrono::NaiveDate;

use stockcast_ai::DailySalesPoint;
use stockcast_core::{CatalogProduct, ProductId, UpstreamError};

/// Sale quantities grouped by calendar date.
pub trait SalesHistoryProvider: Send + Sync + 'static {
    /// One point per date on or after `since` with at least one sale.
    ///
    /// Order is unspecified; the engine sorts.
    fn daily_sales(
        &self,
        product_id: ProductId,
        since: NaiveDate,
    ) -> Result<Vec<DailySalesPoint>, UpstreamError>;
}

/// On-hand quantity at call time.
pub trait StockLevelProvider: Send + Sync + 'static {
    /// `None` when the product is unknown.
    fn current_stock(&self, product_id: ProductId) -> Result<Option<i64>, UpstreamError>;
}

/// Receives the rolling estimate produced by a fitted forecast.
///
/// Last writer wins; the value is an estimate, not a ledger.
pub trait PredictionSink: Send + Sync + 'static {
    fn record_prediction(
        &self,
        product_id: ProductId,
        predicted_stock: i64,
        predicted_demand: i64,
    ) -> Result<(), UpstreamError>;
}

/// Products to forecast in batch runs.
pub trait ProductCatalog: Send + Sync + 'static {
    fn list_products(&self) -> Result<Vec<CatalogProduct>, UpstreamError>;

    /// `None` when the catalog does not know the product.
    fn find_product(&self, product_id: ProductId) -> Result<Option<CatalogProduct>, UpstreamError>;
}

/// Everything [`crate::ForecastService`] needs from storage.
pub trait ForecastStore:
    SalesHistoryProvider + StockLevelProvider + PredictionSink + ProductCatalog
{
}

impl<T> ForecastStore for T where
    T: SalesHistoryProvider + StockLevelProvider + PredictionSink + ProductCatalog
{
}
