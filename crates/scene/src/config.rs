//! Detector configuration and class tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::{Category, Label};
use crate::ConfigError;

/// Which kind of detector a configuration describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// General-purpose object model (vehicles and people)
    GeneralObjects,
    /// Traffic-light colour specialist
    TrafficLights,
    /// Zebra-crossing specialist
    ZebraCrossings,
}

impl DetectorKind {
    /// Whether labels of `category` may come out of this kind of detector
    pub fn accepts(&self, category: Category) -> bool {
        match self {
            DetectorKind::GeneralObjects => {
                matches!(category, Category::Vehicle | Category::Person)
            }
            DetectorKind::TrafficLights => category == Category::TrafficLight,
            DetectorKind::ZebraCrossings => category == Category::ZebraCrossing,
        }
    }
}

/// Immutable class id to label table of one model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTable(BTreeMap<u32, Label>);

impl ClassTable {
    pub fn new(entries: impl IntoIterator<Item = (u32, Label)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// COCO ids of the general object model that matter for guidance
    pub fn coco() -> Self {
        Self::new([
            (0, Label::Person),
            (1, Label::Bicycle),
            (2, Label::Car),
            (3, Label::Motorcycle),
            (5, Label::Bus),
            (7, Label::Truck),
        ])
    }

    pub fn traffic_lights() -> Self {
        Self::new([
            (2, Label::GreenLight),
            (3, Label::RedLight),
            (4, Label::YellowLight),
        ])
    }

    pub fn zebra_crossing() -> Self {
        Self::new([(8, Label::ZebraCrossing)])
    }

    pub fn label(&self, class_id: u32) -> Option<Label> {
        self.0.get(&class_id).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.0.values().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Caller-owned parameters of one detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Name used in logs and diagnostics
    pub name: String,
    pub kind: DetectorKind,
    pub classes: ClassTable,
    /// Minimum confidence the model itself reports
    pub min_confidence: f32,
    /// NMS IoU threshold
    pub iou_threshold: f32,
    /// Maximum boxes per frame
    pub max_detections: usize,
}

impl DetectorConfig {
    pub fn new(name: impl Into<String>, kind: DetectorKind, classes: ClassTable) -> Self {
        Self {
            name: name.into(),
            kind,
            classes,
            min_confidence: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }

    pub fn general() -> Self {
        Self::new("general", DetectorKind::GeneralObjects, ClassTable::coco())
    }

    pub fn traffic_lights() -> Self {
        Self::new(
            "traffic-lights",
            DetectorKind::TrafficLights,
            ClassTable::traffic_lights(),
        )
    }

    pub fn zebra_crossing() -> Self {
        Self::new(
            "zebra-crossing",
            DetectorKind::ZebraCrossings,
            ClassTable::zebra_crossing(),
        )
    }

    /// Default configuration for a detector kind
    pub fn for_kind(kind: DetectorKind) -> Self {
        match kind {
            DetectorKind::GeneralObjects => Self::general(),
            DetectorKind::TrafficLights => Self::traffic_lights(),
            DetectorKind::ZebraCrossings => Self::zebra_crossing(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classes.is_empty() {
            return Err(ConfigError::EmptyClassTable {
                detector: self.name.clone(),
            });
        }
        if let Some(label) = self.classes.labels().find(|l| !self.kind.accepts(l.category())) {
            return Err(ConfigError::LabelOutsideKind {
                detector: self.name.clone(),
                label,
                kind: self.kind,
            });
        }
        for (field, value) in [
            ("min_confidence", self.min_confidence),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    detector: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}
