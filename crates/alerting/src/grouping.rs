//! Same-frame grouping of detections into buckets

use std::collections::BTreeMap;

use scene::{Detection, DepthZone, HorizontalZone, Label};
use serde::{Deserialize, Serialize};

/// Identity of a bucket within a frame and of its announcement state across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    pub label: Label,
    pub horizontal: HorizontalZone,
    pub depth: DepthZone,
}

impl BucketKey {
    pub fn of(detection: &Detection) -> Self {
        Self {
            label: detection.label,
            horizontal: detection.horizontal,
            depth: detection.depth,
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.label.display_name(),
            self.horizontal.as_str(),
            self.depth.as_str()
        )
    }
}

/// Detections sharing one key, highest confidence first
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    detections: Vec<Detection>,
}

impl Bucket {
    /// The detection that speaks for the bucket: highest confidence,
    /// earliest encountered among equals
    pub fn representative(&self) -> &Detection {
        &self.detections[0]
    }

    pub fn count(&self) -> usize {
        self.detections.len()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn confidence(&self) -> f32 {
        self.representative().confidence
    }

    pub fn proximity(&self) -> f32 {
        self.representative().proximity
    }
}

/// All buckets of one frame, iterated in key order
pub type Buckets = BTreeMap<BucketKey, Bucket>;

/// Sort key for confidences; NaN ranks below every real value
fn rank(confidence: f32) -> f32 {
    if confidence.is_nan() {
        f32::NEG_INFINITY
    } else {
        confidence
    }
}

/// Group detections by (label, horizontal zone, depth zone).
///
/// Pure: grouping the flattened result again yields the same buckets.
pub fn group(detections: &[Detection]) -> Buckets {
    let mut members: BTreeMap<BucketKey, Vec<Detection>> = BTreeMap::new();
    for det in detections {
        members.entry(BucketKey::of(det)).or_default().push(det.clone());
    }

    members
        .into_iter()
        .map(|(key, mut detections)| {
            // stable, so equal confidences keep arrival order
            detections.sort_by(|a, b| rank(b.confidence).total_cmp(&rank(a.confidence)));
            (key, Bucket { key, detections })
        })
        .collect()
}

/// Detections of all buckets in bucket order
pub fn flatten(buckets: &Buckets) -> Vec<Detection> {
    buckets
        .values()
        .flat_map(|b| b.detections.iter().cloned())
        .collect()
}
