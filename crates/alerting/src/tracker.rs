//! Announcement Tracker Implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::grouping::BucketKey;
use crate::AlertingError;

/// Announcement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Minimum frame gap before the same bucket may be announced again (default: 120)
    pub reannounce_window: u64,
    /// Confidence a bucket needs to be considered at all (default: 0.7)
    pub confidence_threshold: f32,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            reannounce_window: 120,
            confidence_threshold: 0.7,
        }
    }
}

impl AnnounceConfig {
    pub fn validate(&self) -> Result<(), AlertingError> {
        if self.reannounce_window == 0 {
            return Err(AlertingError::ZeroWindow);
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(AlertingError::ThresholdOutOfRange(self.confidence_threshold));
        }
        Ok(())
    }

    /// Whether a bucket with this representative confidence is eligible
    pub fn is_confident(&self, confidence: f32) -> bool {
        confidence >= self.confidence_threshold
    }
}

/// Cross-frame state of one bucket key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementState {
    pub first_seen_frame: u64,
    pub last_seen_frame: u64,
    pub last_announced_frame: u64,
    pub occurrence_count: u64,
}

/// Where a key stands in its announcement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementStatus {
    /// Never seen this session
    Unseen,
    /// Announced recently; `remaining` frames until it may speak again
    CoolingDown { remaining: u64 },
    /// May be announced on its next occurrence
    Ready,
}

/// Session-scoped tracker rate-limiting repeated announcements
#[derive(Debug, Default)]
pub struct AnnouncementTracker {
    config: AnnounceConfig,
    states: HashMap<BucketKey, AnnouncementState>,
}

impl AnnouncementTracker {
    /// Create a new tracker
    pub fn new(config: AnnounceConfig) -> Self {
        debug!("Creating announcement tracker with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AnnounceConfig {
        &self.config
    }

    /// Record an occurrence of `key` at `current_frame` and decide whether to announce it.
    ///
    /// First occurrences always announce. Later ones announce only once
    /// `reannounce_window` frames have passed since the last announcement.
    pub fn should_announce(&mut self, key: BucketKey, current_frame: u64) -> bool {
        let window = self.config.reannounce_window;
        match self.states.get_mut(&key) {
            None => {
                self.states.insert(
                    key,
                    AnnouncementState {
                        first_seen_frame: current_frame,
                        last_seen_frame: current_frame,
                        last_announced_frame: current_frame,
                        occurrence_count: 1,
                    },
                );
                info!("First sighting of {} at frame {}", key, current_frame);
                true
            }
            Some(state) => {
                state.last_seen_frame = current_frame;
                state.occurrence_count += 1;

                let since = current_frame.saturating_sub(state.last_announced_frame);
                if since >= window {
                    state.last_announced_frame = current_frame;
                    debug!("Re-announcing {} after {} frames", key, since);
                    true
                } else {
                    debug!("{} suppressed: announced {} frames ago", key, since);
                    false
                }
            }
        }
    }

    /// Read-only view of where `key` stands at `current_frame`
    pub fn status(&self, key: &BucketKey, current_frame: u64) -> AnnouncementStatus {
        match self.states.get(key) {
            None => AnnouncementStatus::Unseen,
            Some(state) => {
                let since = current_frame.saturating_sub(state.last_announced_frame);
                if since >= self.config.reannounce_window {
                    AnnouncementStatus::Ready
                } else {
                    AnnouncementStatus::CoolingDown {
                        remaining: self.config.reannounce_window - since,
                    }
                }
            }
        }
    }

    pub fn state(&self, key: &BucketKey) -> Option<&AnnouncementState> {
        self.states.get(key)
    }

    /// Number of keys seen this session
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scene::{DepthZone, HorizontalZone, Label};

    fn key(label: Label) -> BucketKey {
        BucketKey {
            label,
            horizontal: HorizontalZone::Center,
            depth: DepthZone::VeryClose,
        }
    }

    #[test]
    fn test_first_occurrence_announces() {
        let mut tracker = AnnouncementTracker::default();
        assert!(tracker.should_announce(key(Label::Car), 10));

        let state = tracker.state(&key(Label::Car)).unwrap();
        assert_eq!(state.first_seen_frame, 10);
        assert_eq!(state.last_announced_frame, 10);
        assert_eq!(state.occurrence_count, 1);
    }

    #[test]
    fn test_deduplication() {
        let mut tracker = AnnouncementTracker::default();
        assert!(tracker.should_announce(key(Label::Car), 0));
        assert!(!tracker.should_announce(key(Label::Car), 1));
        assert!(!tracker.should_announce(key(Label::Car), 119));
        assert!(tracker.should_announce(key(Label::Car), 120));
        assert!(!tracker.should_announce(key(Label::Car), 200));
        assert!(tracker.should_announce(key(Label::Car), 240));

        let state = tracker.state(&key(Label::Car)).unwrap();
        assert_eq!(state.last_seen_frame, 240);
        assert_eq!(state.last_announced_frame, 240);
        assert_eq!(state.occurrence_count, 6);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut tracker = AnnouncementTracker::default();
        assert!(tracker.should_announce(key(Label::Car), 0));
        assert!(tracker.should_announce(key(Label::Bus), 1));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_status_transitions() {
        let mut tracker = AnnouncementTracker::new(AnnounceConfig {
            reannounce_window: 10,
            ..Default::default()
        });
        let k = key(Label::Truck);
        assert_eq!(tracker.status(&k, 0), AnnouncementStatus::Unseen);

        tracker.should_announce(k, 5);
        assert_eq!(tracker.status(&k, 8), AnnouncementStatus::CoolingDown { remaining: 7 });
        assert_eq!(tracker.status(&k, 15), AnnouncementStatus::Ready);

        // sightings during cooldown do not extend it
        tracker.should_announce(k, 9);
        assert_eq!(tracker.status(&k, 15), AnnouncementStatus::Ready);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let config = AnnounceConfig::default();
        assert!(config.is_confident(0.7));
        assert!(!config.is_confident(0.69));
    }

    #[test]
    fn test_config_validation() {
        assert!(AnnounceConfig::default().validate().is_ok());
        let zero = AnnounceConfig {
            reannounce_window: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(AlertingError::ZeroWindow));
    }

    proptest! {
        #[test]
        fn announcements_respect_window(
            gaps in prop::collection::vec(1u64..60, 1..200),
            window in 1u64..150,
        ) {
            let mut tracker = AnnouncementTracker::new(AnnounceConfig {
                reannounce_window: window,
                ..Default::default()
            });
            let k = key(Label::Car);
            let mut frame = 0;
            let mut announced = Vec::new();
            for gap in gaps {
                frame += gap;
                if tracker.should_announce(k, frame) {
                    announced.push(frame);
                }
            }
            prop_assert!(!announced.is_empty());
            for pair in announced.windows(2) {
                prop_assert!(pair[1] - pair[0] >= window);
            }
        }
    }
}
