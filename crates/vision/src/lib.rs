//! `stockcast-vision`
//!
//! **Responsibility:** log object-detection events against the product catalog.
//!
//! Detections come from an injected [`DetectionSource`]. The only source shipped
//! here is [`SimulatedDetector`], which is seeded so scan flows stay reproducible
//! in tests. Running a real vision model is out of scope; a model-backed source
//! plugs in behind the same trait.

pub mod detection;
pub mod scan;
pub mod source;

pub use detection::{BoundingBox, Detection, DetectionStatus, ObservedAttributes};
pub use scan::{
    ProductLookup, ScanNotification, ScanNotifier, ScanOutcome, ScanService, VisionLogReader,
    VisionLogSink, VisionStatusLog, ANOMALY_LOG_LIMIT, RECENT_LOG_LIMIT,
};
pub use source::{DetectionSource, SimulatedDetector};
