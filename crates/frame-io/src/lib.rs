//! Frame I/O for the guidance pipeline
//!
//! Provides the frame types and the source/sink seams the orchestrator talks to:
//! - Decoded RGB frames
//! - Frame sources (still images, image sequences, in-memory)
//! - Frame sinks for annotated output

pub mod frame;
pub mod memory;
pub mod sequence;
pub mod sink;

pub use frame::VideoFrame;
pub use memory::{MemorySink, MemorySource};
pub use sequence::{ImageFileSource, ImageSequenceSource};
pub use sink::ImageDirectorySink;

use thiserror::Error;

/// Frame I/O error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to open source: {0}")]
    Open(String),

    #[error("Source not opened")]
    NotOpened,

    #[error("Failed to decode frame {sequence}: {reason}")]
    Decode { sequence: u64, reason: String },

    #[error("Invalid frame: {0}")]
    Invalid(String),

    #[error("Failed to write frame: {0}")]
    Write(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Media properties reported by a source once opened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMetadata {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second of the source media
    pub fps: f64,
    /// Total number of frames, when known up front
    pub frame_count: Option<u64>,
}

/// A finite, ordered supply of frames.
///
/// Sources are opened lazily so that an unopenable medium surfaces as an
/// error from [`FrameSource::open`] rather than at construction. Resources are
/// released when the source is dropped.
pub trait FrameSource {
    /// Open the underlying medium and report its metadata
    fn open(&mut self) -> Result<SourceMetadata, FrameError>;

    /// Read the next frame, `Ok(None)` at end of stream
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError>;
}

/// Accepts frames in source order, e.g. for annotated-video reconstruction
pub trait FrameSink {
    /// Write one frame
    fn write(&mut self, frame: VideoFrame) -> Result<(), FrameError>;

    /// Flush anything buffered; called once after the last frame
    fn finish(&mut self) -> Result<(), FrameError> {
        Ok(())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<SourceMetadata, FrameError> {
        (**self).open()
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        (**self).next_frame()
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn write(&mut self, frame: VideoFrame) -> Result<(), FrameError> {
        (**self).write(frame)
    }

    fn finish(&mut self) -> Result<(), FrameError> {
        (**self).finish()
    }
}
