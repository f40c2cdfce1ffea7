use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockcast_ai::DailySalesPoint;
use stockcast_core::{CatalogProduct, Collaborator, ProductId, UpstreamError};
use stockcast_vision::{
    DetectionStatus, ObservedAttributes, ProductLookup, ScanNotification, ScanNotifier,
    VisionLogReader, VisionLogSink, VisionStatusLog,
};

use crate::ports::{PredictionSink, ProductCatalog, SalesHistoryProvider, StockLevelProvider};

/// Product row as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(flatten)]
    pub product: CatalogProduct,
    pub quantity: i64,
    #[serde(default)]
    pub predicted_stock: Option<i64>,
    #[serde(default)]
    pub predicted_demand: Option<i64>,
    #[serde(default)]
    pub last_scan: Option<ObservedAttributes>,
}

impl ProductRecord {
    pub fn new(product: CatalogProduct, quantity: i64) -> Self {
        Self {
            product,
            quantity,
            predicted_stock: None,
            predicted_demand: None,
            last_scan: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product_id: ProductId,
    pub quantity: i64,
    pub sold_at: DateTime<Utc>,
}

/// Serializable seed data for [`InMemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
}

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, ProductRecord>,
    sales: Vec<SaleRecord>,
    vision_logs: Vec<VisionStatusLog>,
    notifications: Vec<ScanNotification>,
    prediction_writes: u64,
}

/// In-memory implementation of every collaborator, for tests/dev.
///
/// Failures can be injected per collaborator with [`InMemoryStore::fail`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    failing: RwLock<HashSet<Collaborator>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.write() {
            for record in snapshot.products {
                state.products.insert(record.product.id, record);
            }
            state.sales = snapshot.sales;
        }
        store
    }

    pub fn add_product(&self, product: CatalogProduct, quantity: i64) {
        if let Ok(mut state) = self.state.write() {
            state
                .products
                .insert(product.id, ProductRecord::new(product, quantity));
        }
    }

    pub fn record_sale(&self, product_id: ProductId, quantity: i64, sold_at: DateTime<Utc>) {
        if let Ok(mut state) = self.state.write() {
            state.sales.push(SaleRecord {
                product_id,
                quantity,
                sold_at,
            });
        }
    }

    pub fn product(&self, product_id: ProductId) -> Option<ProductRecord> {
        self.state.read().ok()?.products.get(&product_id).cloned()
    }

    pub fn vision_logs(&self) -> Vec<VisionStatusLog> {
        self.state
            .read()
            .map(|s| s.vision_logs.clone())
            .unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<ScanNotification> {
        self.state
            .read()
            .map(|s| s.notifications.clone())
            .unwrap_or_default()
    }

    /// Number of successful prediction writes so far.
    pub fn prediction_writes(&self) -> u64 {
        self.state.read().map(|s| s.prediction_writes).unwrap_or(0)
    }

    /// Make every call to `collaborator` fail until [`InMemoryStore::heal`].
    pub fn fail(&self, collaborator: Collaborator) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(collaborator);
        }
    }

    pub fn heal(&self, collaborator: Collaborator) {
        if let Ok(mut failing) = self.failing.write() {
            failing.remove(&collaborator);
        }
    }

    fn check(&self, collaborator: Collaborator) -> Result<(), UpstreamError> {
        let failing = self
            .failing
            .read()
            .map_err(|_| UpstreamError::new(collaborator, "failure registry poisoned"))?;
        if failing.contains(&collaborator) {
            return Err(UpstreamError::new(collaborator, "injected failure"));
        }
        Ok(())
    }

    fn read(&self, collaborator: Collaborator) -> Result<RwLockReadGuard<'_, State>, UpstreamError> {
        self.check(collaborator)?;
        self.state
            .read()
            .map_err(|_| UpstreamError::new(collaborator, "store lock poisoned"))
    }

    fn write(
        &self,
        collaborator: Collaborator,
    ) -> Result<RwLockWriteGuard<'_, State>, UpstreamError> {
        self.check(collaborator)?;
        self.state
            .write()
            .map_err(|_| UpstreamError::new(collaborator, "store lock poisoned"))
    }
}

impl SalesHistoryProvider for InMemoryStore {
    /// Newest date first, like the SQL store this stands in for.
    fn daily_sales(
        &self,
        product_id: ProductId,
        since: NaiveDate,
    ) -> Result<Vec<DailySalesPoint>, UpstreamError> {
        let state = self.read(Collaborator::SalesHistory)?;

        let mut by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for sale in state
            .sales
            .iter()
            .filter(|s| s.product_id == product_id && s.sold_at.date_naive() >= since)
        {
            *by_date.entry(sale.sold_at.date_naive()).or_insert(0) += sale.quantity;
        }

        Ok(by_date
            .into_iter()
            .rev()
            .map(|(date, quantity)| DailySalesPoint::new(date, quantity))
            .collect())
    }
}

impl StockLevelProvider for InMemoryStore {
    fn current_stock(&self, product_id: ProductId) -> Result<Option<i64>, UpstreamError> {
        let state = self.read(Collaborator::StockLevel)?;
        Ok(state.products.get(&product_id).map(|p| p.quantity))
    }
}

impl PredictionSink for InMemoryStore {
    fn record_prediction(
        &self,
        product_id: ProductId,
        predicted_stock: i64,
        predicted_demand: i64,
    ) -> Result<(), UpstreamError> {
        let mut state = self.write(Collaborator::PredictionSink)?;
        let record = state.products.get_mut(&product_id).ok_or_else(|| {
            UpstreamError::new(
                Collaborator::PredictionSink,
                format!("product {product_id} not found"),
            )
        })?;
        record.predicted_stock = Some(predicted_stock);
        record.predicted_demand = Some(predicted_demand);
        state.prediction_writes += 1;
        Ok(())
    }
}

impl ProductCatalog for InMemoryStore {
    fn list_products(&self) -> Result<Vec<CatalogProduct>, UpstreamError> {
        let state = self.read(Collaborator::ProductCatalog)?;
        Ok(state.products.values().map(|r| r.product.clone()).collect())
    }

    fn find_product(&self, product_id: ProductId) -> Result<Option<CatalogProduct>, UpstreamError> {
        let state = self.read(Collaborator::ProductCatalog)?;
        Ok(state.products.get(&product_id).map(|r| r.product.clone()))
    }
}

impl ProductLookup for InMemoryStore {
    fn find_by_sku(&self, sku: &str) -> Result<Option<CatalogProduct>, UpstreamError> {
        let state = self.read(Collaborator::ProductCatalog)?;
        Ok(state
            .products
            .values()
            .find(|r| r.product.sku == sku)
            .map(|r| r.product.clone()))
    }
}

impl VisionLogSink for InMemoryStore {
    fn append(&self, log: VisionStatusLog) -> Result<(), UpstreamError> {
        self.write(Collaborator::VisionLog)?.vision_logs.push(log);
        Ok(())
    }
}

impl InMemoryStore {
    fn newest_logs<F>(&self, limit: usize, keep: F) -> Result<Vec<VisionStatusLog>, UpstreamError>
    where
        F: Fn(&VisionStatusLog) -> bool,
    {
        let state = self.read(Collaborator::VisionLog)?;
        // later appends win ties on the timestamp
        let mut logs: Vec<_> = state
            .vision_logs
            .iter()
            .rev()
            .filter(|l| keep(l))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        logs.truncate(limit);
        Ok(logs)
    }
}

impl VisionLogReader for InMemoryStore {
    fn recent(
        &self,
        limit: usize,
        status: Option<DetectionStatus>,
    ) -> Result<Vec<VisionStatusLog>, UpstreamError> {
        self.newest_logs(limit, |log| status.is_none_or(|s| log.status == s))
    }

    fn anomalies(&self, limit: usize) -> Result<Vec<VisionStatusLog>, UpstreamError> {
        self.newest_logs(limit, |log| log.status.is_anomaly())
    }
}

impl ScanNotifier for InMemoryStore {
    /// Stamps the observed attributes onto the matching product.
    fn notify(&self, notification: &ScanNotification) -> Result<(), UpstreamError> {
        let mut state = self.write(Collaborator::ScanNotifier)?;
        if let Some(record) = state
            .products
            .values_mut()
            .find(|r| r.product.sku == notification.sku)
        {
            record.last_scan = Some(notification.observed.clone());
        }
        state.notifications.push(notification.clone());
        Ok(())
    }
}
