//! Infrastructure layer: collaborator contracts, in-memory adapters, the
//! forecast service and its background refresh runner.

pub mod config;
pub mod memory;
pub mod ports;
pub mod runner;
pub mod service;

pub use config::Settings;
pub use memory::{InMemoryStore, ProductRecord, SaleRecord, StoreSnapshot};
pub use ports::{
    ForecastStore, PredictionSink, ProductCatalog, SalesHistoryProvider, StockLevelProvider,
};
pub use runner::{
    ForecastInsightSink, ForecastRefreshHandle, ForecastRefreshRunner, InMemoryForecastInsightSink,
};
pub use service::{ForecastBatch, ForecastService, ProductForecast, ProductReorder};
