//! Detection box overlay for annotated output

use frame_io::{FrameError, VideoFrame};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use scene::{Category, Detection};

/// Draws detection boxes onto frames, one colour per category
#[derive(Debug, Clone)]
pub struct BoxOverlay {
    /// Border thickness in pixels
    pub thickness: u32,
}

impl Default for BoxOverlay {
    fn default() -> Self {
        Self { thickness: 2 }
    }
}

impl BoxOverlay {
    pub fn new(thickness: u32) -> Self {
        Self {
            thickness: thickness.max(1),
        }
    }

    pub fn color(category: Category) -> Rgb<u8> {
        match category {
            Category::Vehicle => Rgb([255, 64, 64]),
            Category::TrafficLight => Rgb([255, 200, 0]),
            Category::ZebraCrossing => Rgb([255, 255, 255]),
            Category::Person => Rgb([64, 200, 255]),
        }
    }

    /// Return `frame` with every detection outlined
    pub fn draw(&self, frame: VideoFrame, detections: &[Detection]) -> Result<VideoFrame, FrameError> {
        if detections.is_empty() {
            return Ok(frame);
        }
        let (timestamp_ns, sequence) = (frame.timestamp_ns, frame.sequence);
        let mut image = frame.into_rgb_image()?;
        for detection in detections {
            self.draw_box(&mut image, detection);
        }
        Ok(VideoFrame::from_rgb_image(image, timestamp_ns, sequence))
    }

    fn draw_box(&self, image: &mut RgbImage, detection: &Detection) {
        let color = Self::color(detection.category());
        let (img_w, img_h) = (image.width() as f32, image.height() as f32);
        let bbox = &detection.bbox;

        let x1 = bbox.x1.clamp(0.0, img_w) as i32;
        let y1 = bbox.y1.clamp(0.0, img_h) as i32;
        let x2 = bbox.x2.clamp(0.0, img_w) as i32;
        let y2 = bbox.y2.clamp(0.0, img_h) as i32;

        for inset in 0..self.thickness as i32 {
            let width = x2 - x1 - 2 * inset;
            let height = y2 - y1 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(x1 + inset, y1 + inset).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}
