//! Error model.

use thiserror::Error;

/// Result type used across the forecasting and scanning layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// External collaborator that produced an [`UpstreamError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Collaborator {
    SalesHistory,
    StockLevel,
    PredictionSink,
    ProductCatalog,
    VisionLog,
    ScanNotifier,
}

impl core::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Collaborator::SalesHistory => "sales history provider",
            Collaborator::StockLevel => "stock level provider",
            Collaborator::PredictionSink => "prediction sink",
            Collaborator::ProductCatalog => "product catalog",
            Collaborator::VisionLog => "vision log sink",
            Collaborator::ScanNotifier => "scan notifier",
        };
        f.write_str(name)
    }
}

/// Failure reported by a collaborator (storage, lookup, notification).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{collaborator} failed: {message}")]
pub struct UpstreamError {
    pub collaborator: Collaborator,
    pub message: String,
}

impl UpstreamError {
    pub fn new(collaborator: Collaborator, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

/// Domain-level error.
///
/// Not having enough sales history is *not* an error: the engine falls back to
/// a flat baseline instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input. Fatal to the call, never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A collaborator failed while serving the call.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn upstream(collaborator: Collaborator, msg: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::new(collaborator, msg))
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Upstream failures may succeed on a later attempt; input errors never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_names_the_collaborator() {
        let err = DomainError::upstream(Collaborator::StockLevel, "connection refused");
        assert_eq!(
            err.to_string(),
            "stock level provider failed: connection refused"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_input_is_not_retryable() {
        let err = DomainError::invalid_input("horizon_days must be >= 1");
        assert_eq!(err.to_string(), "invalid input: horizon_days must be >= 1");
        assert!(!err.is_retryable());
    }
}
