//! `stockcast-ai`
//!
//! **Responsibility:** demand forecasting and reorder decisions.
//!
//! This crate is deliberately pure:
//! - It performs no IO and reads no clock; "now" is passed in.
//! - It never persists its results; writing predictions back is the caller's job.
//! - It emits **forecast records**, not side effects.

pub mod config;
pub mod engine;
pub mod model;
pub mod regression;
pub mod reorder;

pub use config::ForecastConfig;
pub use engine::ForecastEngine;
pub use model::{
    DailySalesPoint, ForecastDay, ForecastInput, ForecastMethod, ForecastResult, ReorderSuggestion,
};
pub use regression::LinearFit;
pub use reorder::ReorderAdvisor;
