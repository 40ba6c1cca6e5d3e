//! Priority arbitration: at most one message per frame

use alerting::{AnnouncementTracker, Bucket, Buckets};
use scene::{Category, HorizontalZone, Label};
use tracing::debug;

use crate::message::{GuidanceKind, GuidanceMessage};

/// Proximity above which an object is very close
pub const VERY_CLOSE: f32 = 0.75;
/// Proximity above which a vehicle is worth announcing at all
pub const APPROACHING: f32 = 0.5;
/// Proximity of any vehicle that makes a zebra crossing unsafe
pub const CROSSING_BLOCKED_BY: f32 = 0.6;

/// Light colours in evaluation order; earlier colours win priority ties
const LIGHT_ORDER: [(Label, GuidanceKind); 3] = [
    (Label::RedLight, GuidanceKind::RedLight),
    (Label::YellowLight, GuidanceKind::YellowLight),
    (Label::GreenLight, GuidanceKind::GreenLight),
];

/// Vehicle zones in evaluation order
const ZONE_ORDER: [HorizontalZone; 3] = [
    HorizontalZone::Center,
    HorizontalZone::Left,
    HorizontalZone::Right,
];

/// Position of the frame being arbitrated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Source frame index; suppression windows are measured in these
    pub index: u64,
    /// Source frame rate
    pub fps: f64,
}

impl FrameContext {
    pub fn new(index: u64, fps: f64) -> Self {
        Self { index, fps }
    }

    /// Media time of the frame in seconds
    pub fn seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.index as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Highest-proximity bucket; the first one wins ties
fn nearest<'a>(buckets: impl Iterator<Item = &'a Bucket>) -> Option<&'a Bucket> {
    buckets.fold(None, |best, b| match best {
        Some(current) if current.proximity() >= b.proximity() => Some(current),
        _ => Some(b),
    })
}

/// Pick the single message for this frame.
///
/// Buckets whose representative confidence is below the tracker's threshold
/// are ignored by every stage. Every candidate must pass
/// [`AnnouncementTracker::should_announce`], so evaluating a candidate that
/// later loses arbitration still starts its cooldown.
pub fn arbitrate(
    buckets: &Buckets,
    frame: FrameContext,
    tracker: &mut AnnouncementTracker,
) -> Option<GuidanceMessage> {
    let config = tracker.config().clone();
    let eligible: Vec<&Bucket> = buckets
        .values()
        .filter(|b| config.is_confident(b.confidence()))
        .collect();
    let of_category = |category: Category| {
        eligible
            .iter()
            .copied()
            .filter(move |b| b.key.label.category() == category)
    };

    let mut candidates: Vec<GuidanceMessage> = Vec::new();
    let mut propose = |tracker: &mut AnnouncementTracker, kind: GuidanceKind, bucket: &Bucket| {
        if tracker.should_announce(bucket.key, frame.index) {
            candidates.push(GuidanceMessage::render(kind, bucket.key, bucket.count()));
        }
    };

    // traffic lights
    for (label, kind) in LIGHT_ORDER {
        for bucket in of_category(Category::TrafficLight).filter(|b| b.key.label == label) {
            propose(&mut *tracker, kind, bucket);
        }
    }

    // vehicles, nearest per zone
    for zone in ZONE_ORDER {
        let Some(bucket) = nearest(of_category(Category::Vehicle).filter(|b| b.key.horizontal == zone))
        else {
            continue;
        };
        let proximity = bucket.proximity();
        let kind = match (zone, proximity) {
            (_, p) if p <= APPROACHING => continue,
            (HorizontalZone::Center, p) if p > VERY_CLOSE => GuidanceKind::VehicleInFront,
            (HorizontalZone::Center, _) => GuidanceKind::VehicleComingTowards,
            (_, p) if p > VERY_CLOSE => GuidanceKind::VehicleBeside,
            _ => GuidanceKind::VehicleApproachingSide,
        };
        propose(&mut *tracker, kind, bucket);
    }

    // zebra crossing
    if let Some(crossing) = nearest(of_category(Category::ZebraCrossing)) {
        let blocked = of_category(Category::Vehicle).any(|v| v.proximity() > CROSSING_BLOCKED_BY);
        let kind = if blocked {
            GuidanceKind::CrossingBlocked
        } else {
            GuidanceKind::CrossingClear
        };
        propose(&mut *tracker, kind, crossing);
    }

    // people, only when very close
    if let Some(person) = nearest(of_category(Category::Person)) {
        if person.proximity() > VERY_CLOSE {
            propose(&mut *tracker, GuidanceKind::PersonNearby, person);
        }
    }

    for c in &candidates {
        debug!(
            "frame {} ({:.2}s): candidate p{} {:?}",
            frame.index,
            frame.seconds(),
            c.priority.0,
            c.text
        );
    }

    // stable max: the earliest candidate wins among equal priorities
    candidates
        .into_iter()
        .reduce(|best, c| if c.priority > best.priority { c } else { best })
}
