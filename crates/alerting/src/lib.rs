//! Alerting System
//!
//! Groups same-frame detections into buckets and decides, across frames,
//! which buckets may be announced again.

mod grouping;
mod tracker;

pub use grouping::{flatten, group, Bucket, BucketKey, Buckets};
pub use tracker::{AnnounceConfig, AnnouncementState, AnnouncementStatus, AnnouncementTracker};

use thiserror::Error;

/// Announcement configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertingError {
    #[error("Re-announcement window must be at least one frame")]
    ZeroWindow,

    #[error("Confidence threshold {0} is out of range [0, 1]")]
    ThresholdOutOfRange(f32),
}
