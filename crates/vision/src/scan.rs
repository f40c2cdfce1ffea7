use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stockcast_core::{CatalogProduct, Clock, DetectionId, DomainResult, ProductId, UpstreamError};

use crate::detection::{BoundingBox, Detection, DetectionStatus, ObservedAttributes};
use crate::source::DetectionSource;

/// Resolves detected SKUs against the catalog.
pub trait ProductLookup: Send + Sync + 'static {
    fn find_by_sku(&self, sku: &str) -> Result<Option<CatalogProduct>, UpstreamError>;
}

/// Append-only store of detection events.
pub trait VisionLogSink: Send + Sync + 'static {
    fn append(&self, log: VisionStatusLog) -> Result<(), UpstreamError>;
}

/// Default page size for [`VisionLogReader::recent`].
pub const RECENT_LOG_LIMIT: usize = 50;
/// Default page size for [`VisionLogReader::anomalies`].
pub const ANOMALY_LOG_LIMIT: usize = 100;

/// Read side of the detection log. Results are newest first.
pub trait VisionLogReader: Send + Sync + 'static {
    /// Up to `limit` logs, optionally only those with `status`.
    fn recent(
        &self,
        limit: usize,
        status: Option<DetectionStatus>,
    ) -> Result<Vec<VisionStatusLog>, UpstreamError>;

    /// Up to `limit` logs whose status is an anomaly (see [`DetectionStatus::is_anomaly`]).
    fn anomalies(&self, limit: usize) -> Result<Vec<VisionStatusLog>, UpstreamError>;
}

/// Forwards a clean scan of a known product to the catalog service.
///
/// Best effort: called at most once per scan, never retried, and a failure is
/// never surfaced to the caller of [`ScanService::scan`].
pub trait ScanNotifier: Send + Sync + 'static {
    fn notify(&self, notification: &ScanNotification) -> Result<(), UpstreamError>;
}

/// One logged detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionStatusLog {
    pub id: DetectionId,
    pub logged_at: DateTime<Utc>,
    /// `None` when the SKU is not in the catalog.
    pub product_id: Option<ProductId>,
    pub sku: String,
    pub status: DetectionStatus,
    pub confidence_score: f64,
    pub detected_class: String,
    pub bounding_box: BoundingBox,
    pub notes: Option<String>,
}

/// Payload forwarded on a clean scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanNotification {
    pub sku: String,
    #[serde(flatten)]
    pub observed: ObservedAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub log_id: DetectionId,
    pub detection: Detection,
    pub product: Option<CatalogProduct>,
    /// The log write succeeded.
    pub logged: bool,
    /// A notification was delivered.
    pub notified: bool,
}

/// Runs one detection and records it.
pub struct ScanService<P, L, N> {
    lookup: Arc<P>,
    logs: Arc<L>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<P, L, N> ScanService<P, L, N>
where
    P: ProductLookup,
    L: VisionLogSink,
    N: ScanNotifier,
{
    pub fn new(lookup: Arc<P>, logs: Arc<L>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            lookup,
            logs,
            notifier,
            clock,
        }
    }

    /// Detect, resolve against the catalog, log, and notify on a clean scan.
    ///
    /// Only a failed catalog lookup is an error. Log and notification
    /// failures are reported through `logged` / `notified`.
    pub fn scan(&self, source: &mut dyn DetectionSource) -> DomainResult<ScanOutcome> {
        let detection = source.detect();
        let product = self.lookup.find_by_sku(&detection.sku)?;

        let log_id = DetectionId::new();
        let log = VisionStatusLog {
            id: log_id,
            logged_at: self.clock.now(),
            product_id: product.as_ref().map(|p| p.id),
            sku: detection.sku.clone(),
            status: detection.status,
            confidence_score: detection.confidence,
            detected_class: detection.detected_class.clone(),
            bounding_box: detection.bounding_box,
            notes: detection.notes.clone(),
        };

        let logged = match self.logs.append(log) {
            Ok(()) => true,
            Err(e) => {
                warn!(sku = %detection.sku, error = %e, "failed to log vision status");
                false
            }
        };

        let notified = match &product {
            Some(_) if detection.status == DetectionStatus::Ok => {
                let notification = ScanNotification {
                    sku: detection.sku.clone(),
                    observed: detection.observed.clone(),
                };
                match self.notifier.notify(&notification) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(sku = %detection.sku, error = %e, "scan notification dropped");
                        false
                    }
                }
            }
            _ => false,
        };

        info!(
            sku = %detection.sku,
            status = %detection.status,
            confidence = detection.confidence,
            known_product = product.is_some(),
            logged,
            notified,
            "scan processed"
        );

        Ok(ScanOutcome {
            log_id,
            detection,
            product,
            logged,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use stockcast_core::{Collaborator, DomainError, FixedClock};

    struct FixedSource(Detection);

    impl DetectionSource for FixedSource {
        fn detect(&mut self) -> Detection {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct Fakes {
        products: Vec<CatalogProduct>,
        fail_lookup: bool,
        fail_log: bool,
        fail_notify: bool,
        logs: Mutex<Vec<VisionStatusLog>>,
        notifications: Mutex<Vec<ScanNotification>>,
        notify_calls: Mutex<u32>,
    }

    impl ProductLookup for Fakes {
        fn find_by_sku(&self, sku: &str) -> Result<Option<CatalogProduct>, UpstreamError> {
            if self.fail_lookup {
                return Err(UpstreamError::new(Collaborator::ProductCatalog, "down"));
            }
            Ok(self.products.iter().find(|p| p.sku == sku).cloned())
        }
    }

    impl VisionLogSink for Fakes {
        fn append(&self, log: VisionStatusLog) -> Result<(), UpstreamError> {
            if self.fail_log {
                return Err(UpstreamError::new(Collaborator::VisionLog, "disk full"));
            }
            self.logs.lock().unwrap().push(log);
            Ok(())
        }
    }

    impl ScanNotifier for Fakes {
        fn notify(&self, notification: &ScanNotification) -> Result<(), UpstreamError> {
            *self.notify_calls.lock().unwrap() += 1;
            if self.fail_notify {
                return Err(UpstreamError::new(Collaborator::ScanNotifier, "timeout"));
            }
            self.notifications.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn detection(sku: &str, status: DetectionStatus) -> Detection {
        Detection {
            sku: sku.to_string(),
            confidence: 0.9,
            status,
            detected_class: "001".to_string(),
            bounding_box: BoundingBox {
                x: 60,
                y: 70,
                width: 120,
                height: 140,
            },
            notes: None,
            observed: ObservedAttributes {
                detected_color: "Oak Brown".to_string(),
                detected_texture: "Smooth".to_string(),
                detected_dimensions: "50x50x90".to_string(),
            },
        }
    }

    fn service(fakes: Fakes) -> (ScanService<Fakes, Fakes, Fakes>, Arc<Fakes>) {
        let fakes = Arc::new(fakes);
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
        (
            ScanService::new(fakes.clone(), fakes.clone(), fakes.clone(), clock),
            fakes,
        )
    }

    fn chair() -> CatalogProduct {
        CatalogProduct::new(ProductId::new(1), "Oak Chair", "PROD-001")
    }

    #[test]
    fn clean_scan_of_known_product_logs_and_notifies() {
        let (svc, fakes) = service(Fakes {
            products: vec![chair()],
            ..Fakes::default()
        });
        let mut source = FixedSource(detection("PROD-001", DetectionStatus::Ok));

        let outcome = svc.scan(&mut source).unwrap();
        assert!(outcome.logged);
        assert!(outcome.notified);
        assert_eq!(outcome.product, Some(chair()));

        let logs = fakes.logs.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, outcome.log_id);
        assert_eq!(logs[0].product_id, Some(ProductId::new(1)));

        let notes = fakes.notifications.lock().unwrap();
        assert_eq!(notes[0].sku, "PROD-001");
        assert_eq!(notes[0].observed.detected_color, "Oak Brown");
    }

    #[test]
    fn damaged_item_is_logged_but_not_forwarded() {
        let (svc, fakes) = service(Fakes {
            products: vec![chair()],
            ..Fakes::default()
        });
        let mut source = FixedSource(detection("PROD-001", DetectionStatus::Damaged));

        let outcome = svc.scan(&mut source).unwrap();
        assert!(outcome.logged);
        assert!(!outcome.notified);
        assert_eq!(*fakes.notify_calls.lock().unwrap(), 0);
    }

    #[test]
    fn unknown_sku_is_logged_without_product() {
        let (svc, fakes) = service(Fakes::default());
        let mut source = FixedSource(detection("PROD-404", DetectionStatus::Ok));

        let outcome = svc.scan(&mut source).unwrap();
        assert_eq!(outcome.product, None);
        assert!(!outcome.notified);
        assert_eq!(fakes.logs.lock().unwrap()[0].product_id, None);
    }

    #[test]
    fn notification_failure_is_swallowed_and_not_retried() {
        let (svc, fakes) = service(Fakes {
            products: vec![chair()],
            fail_notify: true,
            ..Fakes::default()
        });
        let mut source = FixedSource(detection("PROD-001", DetectionStatus::Ok));

        let outcome = svc.scan(&mut source).unwrap();
        assert!(!outcome.notified);
        assert!(outcome.logged);
        assert_eq!(*fakes.notify_calls.lock().unwrap(), 1);
    }

    #[test]
    fn log_failure_is_reported_not_raised() {
        let (svc, _fakes) = service(Fakes {
            products: vec![chair()],
            fail_log: true,
            ..Fakes::default()
        });
        let mut source = FixedSource(detection("PROD-001", DetectionStatus::Ok));

        let outcome = svc.scan(&mut source).unwrap();
        assert!(!outcome.logged);
        assert!(outcome.notified);
    }

    #[test]
    fn lookup_failure_propagates_as_upstream() {
        let (svc, fakes) = service(Fakes {
            fail_lookup: true,
            ..Fakes::default()
        });
        let mut source = FixedSource(detection("PROD-001", DetectionStatus::Ok));

        let err = svc.scan(&mut source).unwrap_err();
        assert!(matches!(err, DomainError::Upstream(_)));
        assert!(fakes.logs.lock().unwrap().is_empty());
    }

    #[test]
    fn notification_serializes_with_flattened_attributes() {
        let n = ScanNotification {
            sku: "PROD-002".to_string(),
            observed: detection("PROD-002", DetectionStatus::Ok).observed,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["sku"], "PROD-002");
        assert_eq!(json["detectedColor"], "Oak Brown");
        assert_eq!(json["detectedDimensions"], "50x50x90");
    }
}
