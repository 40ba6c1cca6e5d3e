//! Guidance Engine
//!
//! Turns the grouped detections of a frame into at most one spoken message.
//! Candidates are gathered category by category:
//! - Traffic lights
//! - Vehicles (front, left, right)
//! - Zebra crossings
//! - Nearby people
//!
//! and the highest-priority candidate wins.

pub mod arbitration;
pub mod message;

pub use arbitration::{arbitrate, FrameContext};
pub use message::{GuidanceKind, GuidanceMessage, Priority};
