//! `stockcast-core` — shared building blocks.
//!
//! This crate contains **pure** primitives (no infrastructure concerns):
//! identifiers, the error model, catalog records and the calendar clock.

pub mod clock;
pub mod error;
pub mod id;
pub mod product;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Collaborator, DomainError, DomainResult, UpstreamError};
pub use id::{DetectionId, ProductId};
pub use product::CatalogProduct;
