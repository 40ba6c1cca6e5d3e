//! Guidance messages and their canonical English templates

use alerting::BucketKey;
use scene::{HorizontalZone, Label};
use serde::{Deserialize, Serialize};

/// Message priority, higher is more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority(pub u8);

impl Priority {
    pub const PERSON: Priority = Priority(4);
    pub const SIDE_APPROACHING: Priority = Priority(7);
    pub const CROSSING_CLEAR: Priority = Priority(7);
    pub const FRONT_APPROACHING: Priority = Priority(8);
    pub const CROSSING_BLOCKED: Priority = Priority(8);
    pub const SIDE_CLOSE: Priority = Priority(9);
    pub const AMBER_OR_GREEN: Priority = Priority(9);
    pub const FRONT_CLOSE: Priority = Priority(10);
    pub const RED_LIGHT: Priority = Priority(10);
}

/// Stable message identity, independent of the rendered language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidanceKind {
    RedLight,
    YellowLight,
    GreenLight,
    VehicleInFront,
    VehicleComingTowards,
    VehicleBeside,
    VehicleApproachingSide,
    CrossingClear,
    CrossingBlocked,
    PersonNearby,
}

impl GuidanceKind {
    /// Key for downstream translation tables
    pub fn key(&self) -> &'static str {
        match self {
            GuidanceKind::RedLight => "traffic_light.red",
            GuidanceKind::YellowLight => "traffic_light.yellow",
            GuidanceKind::GreenLight => "traffic_light.green",
            GuidanceKind::VehicleInFront => "vehicle.front.very_close",
            GuidanceKind::VehicleComingTowards => "vehicle.front.approaching",
            GuidanceKind::VehicleBeside => "vehicle.side.very_close",
            GuidanceKind::VehicleApproachingSide => "vehicle.side.approaching",
            GuidanceKind::CrossingClear => "zebra_crossing.clear",
            GuidanceKind::CrossingBlocked => "zebra_crossing.vehicles_nearby",
            GuidanceKind::PersonNearby => "person.very_close",
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            GuidanceKind::RedLight => Priority::RED_LIGHT,
            GuidanceKind::YellowLight | GuidanceKind::GreenLight => Priority::AMBER_OR_GREEN,
            GuidanceKind::VehicleInFront => Priority::FRONT_CLOSE,
            GuidanceKind::VehicleComingTowards => Priority::FRONT_APPROACHING,
            GuidanceKind::VehicleBeside => Priority::SIDE_CLOSE,
            GuidanceKind::VehicleApproachingSide => Priority::SIDE_APPROACHING,
            GuidanceKind::CrossingClear => Priority::CROSSING_CLEAR,
            GuidanceKind::CrossingBlocked => Priority::CROSSING_BLOCKED,
            GuidanceKind::PersonNearby => Priority::PERSON,
        }
    }
}

/// One spoken guidance message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceMessage {
    pub kind: GuidanceKind,
    /// Canonical English rendering
    pub text: String,
    pub priority: Priority,
    /// Bucket the message announces
    pub key: BucketKey,
    /// Number of objects in that bucket
    pub count: usize,
}

impl GuidanceMessage {
    /// Render the message for a bucket
    pub fn render(kind: GuidanceKind, key: BucketKey, count: usize) -> Self {
        let text = match kind {
            GuidanceKind::RedLight => "Red light ahead. Stop and wait.".to_string(),
            GuidanceKind::YellowLight => "Yellow light ahead. Prepare to stop.".to_string(),
            GuidanceKind::GreenLight => "Green light ahead. It's safe to cross.".to_string(),
            GuidanceKind::VehicleInFront => format!(
                "Watch out! {} right in front of you! Stay where you are!",
                vehicle_phrase(key.label, count)
            ),
            GuidanceKind::VehicleComingTowards => {
                format!("Careful! {} coming towards you.", vehicle_phrase(key.label, count))
            }
            GuidanceKind::VehicleBeside => format!(
                "Warning! {} on your {} side! Don't move!",
                vehicle_phrase(key.label, count),
                key.horizontal.as_str()
            ),
            GuidanceKind::VehicleApproachingSide => format!(
                "{} approaching on your {}.",
                vehicle_phrase(key.label, count),
                key.horizontal.as_str()
            ),
            GuidanceKind::CrossingClear => {
                "Zebra crossing in front of you. No vehicles nearby. You can cross now.".to_string()
            }
            GuidanceKind::CrossingBlocked => {
                "Zebra crossing ahead, but vehicles are nearby. Wait for them to pass.".to_string()
            }
            GuidanceKind::PersonNearby => {
                format!("{} {}.", person_phrase(count), person_direction(key.horizontal))
            }
        };

        Self {
            kind,
            text,
            priority: kind.priority(),
            key,
            count,
        }
    }
}

/// "A Car" or "3 Cars"
fn vehicle_phrase(label: Label, count: usize) -> String {
    if count > 1 {
        format!("{} {}", count, label.plural_name())
    } else {
        format!("A {}", label.display_name())
    }
}

/// "Person" or "3 people"
fn person_phrase(count: usize) -> String {
    if count > 1 {
        format!("{} people", count)
    } else {
        "Person".to_string()
    }
}

fn person_direction(zone: HorizontalZone) -> &'static str {
    match zone {
        HorizontalZone::Center => "ahead",
        HorizontalZone::Left => "left",
        HorizontalZone::Right => "right",
    }
}
