//! Raw detector output to uniform detection records

use tracing::trace;

use crate::config::DetectorConfig;
use crate::detector::RawDetection;
use crate::geometry::FrameGeometry;
use crate::object::{BoundingBox, Detection};

/// Converts raw boxes of any detector into [`Detection`]s for one frame.
///
/// This is a structural transform: confidences pass through untouched and
/// only class ids missing from the detector's table are dropped.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    frame: FrameGeometry,
}

impl Normalizer {
    pub fn new(frame: FrameGeometry) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> FrameGeometry {
        self.frame
    }

    /// Normalize one detector's output
    pub fn normalize(&self, config: &DetectorConfig, raw: &[RawDetection]) -> Vec<Detection> {
        raw.iter()
            .filter_map(|r| match config.classes.label(r.class_id) {
                Some(label) => Some(Detection::new(
                    label,
                    r.confidence,
                    BoundingBox::from_corners(r.bbox),
                    self.frame,
                )),
                None => {
                    trace!("{}: ignoring unmapped class {}", config.name, r.class_id);
                    None
                }
            })
            .collect()
    }

    /// Normalize several detectors' output into one per-frame list
    pub fn merge<'a>(
        &self,
        outputs: impl IntoIterator<Item = (&'a DetectorConfig, &'a [RawDetection])>,
    ) -> Vec<Detection> {
        outputs
            .into_iter()
            .flat_map(|(config, raw)| self.normalize(config, raw))
            .collect()
    }
}
