use serde::{Deserialize, Serialize};

/// Condition assigned to a detected item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionStatus {
    Ok,
    Damaged,
    NonStandard,
    /// Confidence too low to trust the classification.
    Unknown,
}

impl DetectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionStatus::Ok => "OK",
            DetectionStatus::Damaged => "DAMAGED",
            DetectionStatus::NonStandard => "NON_STANDARD",
            DetectionStatus::Unknown => "UNKNOWN",
        }
    }

    /// Anything other than a clean `Ok` needs a human to look at it.
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, DetectionStatus::Ok)
    }
}

impl core::fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel-space box around the detected item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Surface attributes read off the item, forwarded to the catalog on a clean scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedAttributes {
    pub detected_color: String,
    pub detected_texture: String,
    pub detected_dimensions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub sku: String,
    /// Classifier confidence in \[0, 1\].
    pub confidence: f64,
    pub status: DetectionStatus,
    pub detected_class: String,
    pub bounding_box: BoundingBox,
    pub notes: Option<String>,
    pub observed: ObservedAttributes,
}
