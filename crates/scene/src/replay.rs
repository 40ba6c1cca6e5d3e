//! Replay of recorded detector output
//!
//! Recordings are JSON Lines, one object per frame:
//!
//! ```text
//! {"frame": 0, "detections": [{"class_id": 2, "confidence": 0.91, "box": [350, 300, 550, 560]}]}
//! ```
//!
//! Frames without a line produce no detections.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use frame_io::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detector::{Detector, RawDetection};
use crate::DetectorError;

/// One recorded frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub frame: u64,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// Detector answering from a recording keyed by frame sequence
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    frames: HashMap<u64, Vec<RawDetection>>,
}

impl ReplayDetector {
    pub fn from_records(records: impl IntoIterator<Item = RecordedFrame>) -> Self {
        let mut frames: HashMap<u64, Vec<RawDetection>> = HashMap::new();
        for record in records {
            frames.entry(record.frame).or_default().extend(record.detections);
        }
        Self { frames }
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, DetectorError> {
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| DetectorError::Replay(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RecordedFrame = serde_json::from_str(&line)
                .map_err(|e| DetectorError::Replay(format!("line {}: {}", n + 1, e)))?;
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| DetectorError::Replay(format!("{}: {}", path.display(), e)))?;
        let detector = Self::from_reader(std::io::BufReader::new(file))?;
        debug!("Loaded {} recorded frames from {}", detector.len(), path.display());
        Ok(detector)
    }

    /// Number of frames with recorded output
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Detector for ReplayDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<RawDetection>, DetectorError> {
        Ok(self.frames.get(&frame.sequence).cloned().unwrap_or_default())
    }
}
