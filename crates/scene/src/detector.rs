//! Detector seam: a model turning a frame into raw boxes

use frame_io::VideoFrame;
use serde::{Deserialize, Serialize};

use crate::config::DetectorConfig;
use crate::{ConfigError, DetectorError};

/// Raw detector output for one box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f32,
    /// Corners `[x1, y1, x2, y2]` in pixels
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
}

impl RawDetection {
    pub fn new(class_id: u32, confidence: f32, bbox: [f32; 4]) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }
}

/// An object detector (YOLO or similar), treated as a black box.
///
/// Implementations may be slow; the pipeline only calls them on sampled frames.
pub trait Detector: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<RawDetection>, DetectorError>;
}

impl<F> Detector for F
where
    F: FnMut(&VideoFrame) -> Result<Vec<RawDetection>, DetectorError> + Send,
{
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<RawDetection>, DetectorError> {
        self(frame)
    }
}

/// A detector paired with the configuration that tags its output
pub struct DetectorSlot {
    pub config: DetectorConfig,
    pub detector: Box<dyn Detector>,
}

impl DetectorSlot {
    /// Pair a detector with a validated configuration
    pub fn new(config: DetectorConfig, detector: impl Detector + 'static) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            detector: Box::new(detector),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<RawDetection>, DetectorError> {
        self.detector.detect(frame)
    }
}

impl std::fmt::Debug for DetectorSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorSlot")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
