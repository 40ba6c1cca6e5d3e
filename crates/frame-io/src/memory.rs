//! In-memory frame source and sink

use std::collections::VecDeque;

use crate::{FrameError, FrameSink, FrameSource, SourceMetadata, VideoFrame};

/// Frame source backed by a list of frames
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<VideoFrame>,
    width: u32,
    height: u32,
    fps: f64,
    unavailable: Option<String>,
    fail_at: Option<u64>,
    opened: bool,
}

impl MemorySource {
    /// Source over `frames` played back at `fps`
    pub fn new(frames: Vec<VideoFrame>, fps: f64) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0));
        Self {
            frames: frames.into(),
            width,
            height,
            fps,
            ..Default::default()
        }
    }

    /// `count` blank frames of the given size
    pub fn blank(count: u64, width: u32, height: u32, fps: f64) -> Self {
        let frames = (0..count)
            .map(|i| {
                let mut frame = VideoFrame::blank(width, height, i);
                frame.timestamp_ns = crate::frame::timestamp_for(i, fps);
                frame
            })
            .collect();
        let mut source = Self::new(frames, fps);
        source.width = width;
        source.height = height;
        source
    }

    /// A source whose `open` always fails
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Make `next_frame` fail when frame `sequence` would be returned
    pub fn fail_at(mut self, sequence: u64) -> Self {
        self.fail_at = Some(sequence);
        self
    }
}

impl FrameSource for MemorySource {
    fn open(&mut self) -> Result<SourceMetadata, FrameError> {
        if let Some(reason) = &self.unavailable {
            return Err(FrameError::Open(reason.clone()));
        }
        self.opened = true;
        Ok(SourceMetadata {
            width: self.width,
            height: self.height,
            fps: self.fps,
            frame_count: Some(self.frames.len() as u64),
        })
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        if !self.opened {
            return Err(FrameError::NotOpened);
        }
        match self.frames.front() {
            Some(frame) if Some(frame.sequence) == self.fail_at => Err(FrameError::Decode {
                sequence: frame.sequence,
                reason: "corrupt frame".to_string(),
            }),
            _ => Ok(self.frames.pop_front()),
        }
    }
}

/// Frame sink collecting everything it receives
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Frames in arrival order
    pub frames: Vec<VideoFrame>,
    /// Whether `finish` was called
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for MemorySink {
    fn write(&mut self, frame: VideoFrame) -> Result<(), FrameError> {
        self.frames.push(frame);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), FrameError> {
        self.finished = true;
        Ok(())
    }
}
