use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use stockcast_core::{DomainError, DomainResult};

use crate::detection::{BoundingBox, Detection, DetectionStatus, ObservedAttributes};

/// Where detections come from.
///
/// Injected into [`crate::ScanService`] so scanning never reaches for global state.
pub trait DetectionSource: Send {
    /// Classify the next frame.
    fn detect(&mut self) -> Detection;
}

const COLORS: &[&str] = &["Oak Brown", "Steel Gray", "Natural Wood", "Matte Black", "Glossy White"];
const TEXTURES: &[&str] = &["Smooth", "Rough", "Polished", "Grainy", "Textured"];
const DIMENSIONS: &[&str] = &["50x50x90", "120x80x75", "60x20x30", "80x40x45"];

/// Seeded stand-in for a camera + detector.
///
/// Model:
/// - Pick a SKU uniformly from the known catalog codes.
/// - Draw confidence uniformly from \[0.65, 0.98).
/// - Below `low_confidence` the item is `Unknown`; otherwise 10% are flagged
///   `Damaged` and 5% of the rest `NonStandard`.
///
/// Two detectors built from the same seed and SKUs emit the same sequence.
#[derive(Debug, Clone)]
pub struct SimulatedDetector {
    rng: StdRng,
    known_skus: Vec<String>,
    low_confidence: f64,
    damage_rate: f64,
    non_standard_rate: f64,
}

impl SimulatedDetector {
    pub const DEFAULT_SKUS: [&'static str; 3] = ["PROD-001", "PROD-002", "PROD-003"];

    pub fn new(seed: u64, known_skus: Vec<String>) -> DomainResult<Self> {
        if known_skus.is_empty() {
            return Err(DomainError::invalid_input(
                "simulated detector needs at least one known sku",
            ));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            known_skus,
            low_confidence: 0.5,
            damage_rate: 0.1,
            non_standard_rate: 0.05,
        })
    }

    pub fn with_default_skus(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            known_skus: Self::DEFAULT_SKUS.iter().map(|s| s.to_string()).collect(),
            low_confidence: 0.5,
            damage_rate: 0.1,
            non_standard_rate: 0.05,
        }
    }

    pub fn with_low_confidence(mut self, low_confidence: f64) -> Self {
        self.low_confidence = low_confidence;
        self
    }

    /// Both rates are probabilities and must lie in \[0, 1\].
    pub fn with_rates(mut self, damage_rate: f64, non_standard_rate: f64) -> DomainResult<Self> {
        for (name, rate) in [("damage", damage_rate), ("non-standard", non_standard_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(DomainError::invalid_input(format!(
                    "{name} rate must be within [0, 1], got {rate}"
                )));
            }
        }
        self.damage_rate = damage_rate;
        self.non_standard_rate = non_standard_rate;
        Ok(self)
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options
            .choose(&mut self.rng)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

impl DetectionSource for SimulatedDetector {
    fn detect(&mut self) -> Detection {
        let sku = self
            .known_skus
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let confidence: f64 = self.rng.gen_range(0.65..0.98);

        let bounding_box = BoundingBox {
            x: self.rng.gen_range(50..=200),
            y: self.rng.gen_range(50..=200),
            width: self.rng.gen_range(100..=300),
            height: self.rng.gen_range(100..=300),
        };

        let (status, notes) = if confidence < self.low_confidence {
            (
                DetectionStatus::Unknown,
                Some("Low confidence detection - manual review recommended"),
            )
        } else if self.rng.gen_bool(self.damage_rate) {
            (
                DetectionStatus::Damaged,
                Some("Potential damage detected - surface irregularities observed"),
            )
        } else if self.rng.gen_bool(self.non_standard_rate) {
            (
                DetectionStatus::NonStandard,
                Some("Dimensions or appearance do not match standard specifications"),
            )
        } else {
            (DetectionStatus::Ok, None)
        };

        let observed = ObservedAttributes {
            detected_color: self.pick(COLORS),
            detected_texture: self.pick(TEXTURES),
            detected_dimensions: self.pick(DIMENSIONS),
        };

        Detection {
            detected_class: class_of(&sku),
            sku,
            confidence,
            status,
            bounding_box,
            notes: notes.map(str::to_string),
            observed,
        }
    }
}

/// `PROD-002` -> `002`; codes without a dash are their own class.
fn class_of(sku: &str) -> String {
    sku.split_once('-')
        .map(|(_, class)| class)
        .unwrap_or(sku)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimulatedDetector::with_default_skus(42);
        let mut b = SimulatedDetector::with_default_skus(42);
        for _ in 0..20 {
            assert_eq!(a.detect(), b.detect());
        }
    }

    #[test]
    fn detections_stay_within_bounds() {
        let mut detector = SimulatedDetector::with_default_skus(7);
        for _ in 0..200 {
            let d = detector.detect();
            assert!(SimulatedDetector::DEFAULT_SKUS.contains(&d.sku.as_str()));
            assert!((0.65..0.98).contains(&d.confidence));
            assert!((50..=200).contains(&d.bounding_box.x));
            assert!((100..=300).contains(&d.bounding_box.height));
            assert_eq!(d.detected_class.as_str(), &d.sku["PROD-".len()..]);
            assert_eq!(d.notes.is_some(), d.status != DetectionStatus::Ok);
        }
    }

    #[test]
    fn low_confidence_threshold_marks_unknown() {
        let mut detector = SimulatedDetector::with_default_skus(3).with_low_confidence(0.99);
        for _ in 0..50 {
            assert_eq!(detector.detect().status, DetectionStatus::Unknown);
        }
    }

    #[test]
    fn zero_rates_always_report_ok() {
        let mut detector = SimulatedDetector::with_default_skus(11)
            .with_rates(0.0, 0.0)
            .unwrap();
        for _ in 0..50 {
            assert_eq!(detector.detect().status, DetectionStatus::Ok);
        }
    }

    #[test]
    fn certain_damage_rate_reports_damaged() {
        let mut detector = SimulatedDetector::with_default_skus(11)
            .with_rates(1.0, 0.0)
            .unwrap();
        assert_eq!(detector.detect().status, DetectionStatus::Damaged);
    }

    #[test]
    fn rates_outside_probability_range_are_rejected() {
        for (damage, non_standard) in [(f64::NAN, 0.0), (0.1, f64::INFINITY), (-0.1, 0.0), (0.0, 1.5)] {
            let err = SimulatedDetector::with_default_skus(1)
                .with_rates(damage, non_standard)
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidInput(_)));
        }
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = SimulatedDetector::new(1, Vec::new()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn custom_skus_are_used() {
        let mut detector = SimulatedDetector::new(5, vec!["CHAIR".to_string()]).unwrap();
        let d = detector.detect();
        assert_eq!(d.sku, "CHAIR");
        assert_eq!(d.detected_class, "CHAIR");
    }
}
