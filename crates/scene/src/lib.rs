//! Street scene model
//!
//! Turns raw detector output into typed, spatially classified detections:
//! - Object labels and categories (vehicles, traffic lights, crossings, people)
//! - Horizontal and depth zones from box geometry
//! - Per-detector class tables and normalization
//! - The detector seam and a replay detector for recorded output

pub mod config;
pub mod detector;
pub mod geometry;
pub mod normalizer;
pub mod object;
pub mod replay;

pub use config::{ClassTable, DetectorConfig, DetectorKind};
pub use detector::{Detector, DetectorSlot, RawDetection};
pub use geometry::{DepthZone, FrameGeometry, HorizontalZone};
pub use normalizer::Normalizer;
pub use object::{BoundingBox, Category, Detection, Label};
pub use replay::ReplayDetector;

use thiserror::Error;

/// Detector error types
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid frame format")]
    InvalidFrame,

    #[error("Recorded detections unreadable: {0}")]
    Replay(String),
}

/// Detector configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{detector}: label {label:?} is not produced by a {kind:?} detector")]
    LabelOutsideKind {
        detector: String,
        label: Label,
        kind: DetectorKind,
    },

    #[error("{detector}: {field} value {value} is out of range [0, 1]")]
    OutOfRange {
        detector: String,
        field: &'static str,
        value: f32,
    },

    #[error("{detector}: class table is empty")]
    EmptyClassTable { detector: String },
}
