//! Detected objects (vehicles, traffic lights, zebra crossings, pedestrians)

use serde::{Deserialize, Serialize};

use crate::geometry::{DepthZone, FrameGeometry, HorizontalZone};

/// Object label understood by the guidance engine.
///
/// Ordering follows declaration order and is what makes bucket iteration
/// deterministic downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Person,
    Bicycle,
    Car,
    Motorcycle,
    Bus,
    Truck,
    GreenLight,
    RedLight,
    YellowLight,
    ZebraCrossing,
}

/// Guidance category of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Vehicle,
    TrafficLight,
    ZebraCrossing,
    Person,
}

impl Label {
    pub const ALL: [Label; 10] = [
        Label::Person,
        Label::Bicycle,
        Label::Car,
        Label::Motorcycle,
        Label::Bus,
        Label::Truck,
        Label::GreenLight,
        Label::RedLight,
        Label::YellowLight,
        Label::ZebraCrossing,
    ];

    pub fn category(&self) -> Category {
        match self {
            Label::Person => Category::Person,
            Label::Bicycle | Label::Car | Label::Motorcycle | Label::Bus | Label::Truck => {
                Category::Vehicle
            }
            Label::GreenLight | Label::RedLight | Label::YellowLight => Category::TrafficLight,
            Label::ZebraCrossing => Category::ZebraCrossing,
        }
    }

    /// Name used in spoken messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Person => "Person",
            Label::Bicycle => "Bicycle",
            Label::Car => "Car",
            Label::Motorcycle => "Motorcycle",
            Label::Bus => "Bus",
            Label::Truck => "Truck",
            Label::GreenLight => "Green Light",
            Label::RedLight => "Red Light",
            Label::YellowLight => "Yellow Light",
            Label::ZebraCrossing => "Zebra Crossing",
        }
    }

    pub fn plural_name(&self) -> &'static str {
        match self {
            Label::Person => "People",
            Label::Bicycle => "Bicycles",
            Label::Car => "Cars",
            Label::Motorcycle => "Motorcycles",
            Label::Bus => "Buses",
            Label::Truck => "Trucks",
            Label::GreenLight => "Green Lights",
            Label::RedLight => "Red Lights",
            Label::YellowLight => "Yellow Lights",
            Label::ZebraCrossing => "Zebra Crossings",
        }
    }

    pub fn is_vehicle(&self) -> bool {
        self.category() == Category::Vehicle
    }
}

/// Axis-aligned box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Build a box, swapping corners so that x1 <= x2 and y1 <= y2
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn from_corners(corners: [f32; 4]) -> Self {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }

    pub fn centroid(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// One object seen in one frame, with its spatial classification.
///
/// Created fresh per frame and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: Label,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub horizontal: HorizontalZone,
    pub depth: DepthZone,
    /// Nearness proxy in [0, 1] from the box's bottom edge
    pub proximity: f32,
}

impl Detection {
    /// Classify a box against the frame it was found in
    pub fn new(label: Label, confidence: f32, bbox: BoundingBox, frame: FrameGeometry) -> Self {
        let (cx, cy) = bbox.centroid();
        let (horizontal, depth) = frame.classify(cx, cy, bbox.y2);
        Self {
            label,
            confidence,
            bbox,
            horizontal,
            depth,
            proximity: frame.proximity(bbox.y2),
        }
    }

    pub fn category(&self) -> Category {
        self.label.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(Label::Car.category(), Category::Vehicle);
        assert_eq!(Label::Bicycle.category(), Category::Vehicle);
        assert_eq!(Label::RedLight.category(), Category::TrafficLight);
        assert_eq!(Label::ZebraCrossing.category(), Category::ZebraCrossing);
        assert_eq!(Label::Person.category(), Category::Person);
    }

    #[test]
    fn test_plural_names() {
        assert_eq!(Label::Car.plural_name(), "Cars");
        assert_eq!(Label::Bus.plural_name(), "Buses");
        assert_eq!(Label::Person.plural_name(), "People");
    }

    #[test]
    fn test_box_corners_are_normalized() {
        let b = BoundingBox::new(50.0, 80.0, 10.0, 20.0);
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (10.0, 20.0, 50.0, 80.0));
        assert_eq!(b.centroid(), (30.0, 50.0));
    }

    #[test]
    fn test_detection_classifies_box() {
        let frame = FrameGeometry::new(900, 600);
        let det = Detection::new(
            Label::Car,
            0.9,
            BoundingBox::new(350.0, 300.0, 550.0, 560.0),
            frame,
        );
        assert_eq!(det.horizontal, HorizontalZone::Center);
        assert_eq!(det.depth, DepthZone::VeryClose);
        assert!((det.proximity - 0.9333).abs() < 1e-3);
    }
}
