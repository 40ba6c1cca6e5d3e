//! File-backed frame sources: a single still image or a directory of frames

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::frame::timestamp_for;
use crate::{FrameError, FrameSource, SourceMetadata, VideoFrame};

/// Extensions accepted as frame images
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(path: &Path, sequence: u64, fps: f64) -> Result<VideoFrame, FrameError> {
    let image = image::open(path).map_err(|e| FrameError::Decode {
        sequence,
        reason: format!("{}: {}", path.display(), e),
    })?;
    Ok(VideoFrame::from_rgb_image(
        image.to_rgb8(),
        timestamp_for(sequence, fps),
        sequence,
    ))
}

/// A still image processed as a one-frame session
pub struct ImageFileSource {
    path: PathBuf,
    pending: Option<VideoFrame>,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: None,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<SourceMetadata, FrameError> {
        if !is_image(&self.path) {
            return Err(FrameError::Open(format!(
                "{}: unsupported image format",
                self.path.display()
            )));
        }
        let frame = load_frame(&self.path, 0, 1.0)
            .map_err(|e| FrameError::Open(e.to_string()))?;
        let meta = SourceMetadata {
            width: frame.width,
            height: frame.height,
            fps: 1.0,
            frame_count: Some(1),
        };
        info!("Opened image {} ({}x{})", self.path.display(), meta.width, meta.height);
        self.pending = Some(frame);
        Ok(meta)
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        Ok(self.pending.take())
    }
}

/// Ordered directory of frame images standing in for decoded video.
///
/// Files are played back in lexicographic order of their names, so frames
/// should be zero-padded (`frame_00001.png`).
pub struct ImageSequenceSource {
    dir: PathBuf,
    fps: f64,
    files: Vec<PathBuf>,
    cursor: usize,
    opened: bool,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>, fps: f64) -> Self {
        Self {
            dir: dir.into(),
            fps,
            files: Vec::new(),
            cursor: 0,
            opened: false,
        }
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<SourceMetadata, FrameError> {
        if !(self.fps > 0.0 && self.fps.is_finite()) {
            return Err(FrameError::Open(format!("invalid frame rate {}", self.fps)));
        }
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| FrameError::Open(format!("{}: {}", self.dir.display(), e)))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        files.sort();

        let first = files
            .first()
            .ok_or_else(|| FrameError::Open(format!("{}: no frames", self.dir.display())))?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| FrameError::Open(format!("{}: {}", first.display(), e)))?;

        debug!("Found {} frames in {}", files.len(), self.dir.display());
        self.files = files;
        self.cursor = 0;
        self.opened = true;

        Ok(SourceMetadata {
            width,
            height,
            fps: self.fps,
            frame_count: Some(self.files.len() as u64),
        })
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        if !self.opened {
            return Err(FrameError::NotOpened);
        }
        let Some(path) = self.files.get(self.cursor) else {
            return Ok(None);
        };
        let frame = load_frame(path, self.cursor as u64, self.fps)?;
        self.cursor += 1;
        Ok(Some(frame))
    }
}
