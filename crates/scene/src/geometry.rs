//! Spatial classification of boxes within a frame
//!
//! The frame is split into vertical thirds for the horizontal zone. Depth is
//! read off the box's bottom edge: the lower it reaches in the image, the
//! nearer the object is to the camera.

use serde::{Deserialize, Serialize};

/// Bottom edge beyond this fraction of frame height is very close
pub const VERY_CLOSE_FRACTION: f32 = 0.75;
/// Bottom edge beyond this fraction of frame height is approaching
pub const APPROACHING_FRACTION: f32 = 0.5;

/// Horizontal position of an object relative to the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HorizontalZone {
    Left,
    Center,
    Right,
}

/// Coarse distance band of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepthZone {
    Far,
    Approaching,
    VeryClose,
}

impl HorizontalZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalZone::Left => "left",
            HorizontalZone::Center => "center",
            HorizontalZone::Right => "right",
        }
    }
}

impl DepthZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthZone::Far => "far",
            DepthZone::Approaching => "approaching",
            DepthZone::VeryClose => "very close",
        }
    }
}

fn usable(dim: f32) -> bool {
    dim.is_finite() && dim > 0.0
}

/// Classify a box by centroid and bottom edge.
///
/// A degenerate frame (zero, negative or non-finite size) classifies as
/// center/far instead of failing.
pub fn classify(
    cx: f32,
    _cy: f32,
    y2: f32,
    frame_w: f32,
    frame_h: f32,
) -> (HorizontalZone, DepthZone) {
    let horizontal = if !usable(frame_w) {
        HorizontalZone::Center
    } else if cx < frame_w / 3.0 {
        HorizontalZone::Left
    } else if cx > 2.0 * frame_w / 3.0 {
        HorizontalZone::Right
    } else {
        HorizontalZone::Center
    };

    let depth = if !usable(frame_h) {
        DepthZone::Far
    } else if y2 > VERY_CLOSE_FRACTION * frame_h {
        DepthZone::VeryClose
    } else if y2 > APPROACHING_FRACTION * frame_h {
        DepthZone::Approaching
    } else {
        DepthZone::Far
    };

    (horizontal, depth)
}

/// Nearness score `y2 / frame_h`, clamped to [0, 1]
pub fn proximity(y2: f32, frame_h: f32) -> f32 {
    if !usable(frame_h) || !y2.is_finite() {
        return 0.0;
    }
    (y2 / frame_h).clamp(0.0, 1.0)
}

/// Frame dimensions used to classify detections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: f32,
    pub height: f32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn classify(&self, cx: f32, cy: f32, y2: f32) -> (HorizontalZone, DepthZone) {
        classify(cx, cy, y2, self.width, self.height)
    }

    pub fn proximity(&self, y2: f32) -> f32 {
        proximity(y2, self.height)
    }
}
