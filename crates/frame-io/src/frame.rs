//! Video frame type

use image::RgbImage;

use crate::FrameError;

/// Decoded RGB video frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Presentation timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame index within its source, starting at 0
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ns: u64,
        sequence: u64,
    ) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::Invalid(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        })
    }

    /// Black frame of the given size
    pub fn blank(width: u32, height: u32, sequence: u64) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 3],
            width,
            height,
            timestamp_ns: 0,
            sequence,
        }
    }

    /// Wrap a decoded image
    pub fn from_rgb_image(image: RgbImage, timestamp_ns: u64, sequence: u64) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Borrow-free conversion into an `image` buffer for drawing or encoding
    pub fn into_rgb_image(self) -> Result<RgbImage, FrameError> {
        let sequence = self.sequence;
        RgbImage::from_raw(self.width, self.height, self.data).ok_or(FrameError::Decode {
            sequence,
            reason: "pixel buffer does not match dimensions".to_string(),
        })
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// True when the frame has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Timestamp of frame `sequence` for a stream at `fps`
pub fn timestamp_for(sequence: u64, fps: f64) -> u64 {
    if fps <= 0.0 || !fps.is_finite() {
        return 0;
    }
    (sequence as f64 / fps * 1_000_000_000.0) as u64
}
