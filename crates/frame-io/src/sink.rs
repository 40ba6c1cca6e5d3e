//! Frame sink writing numbered PNG files

use std::path::PathBuf;

use tracing::{debug, info};

use crate::{FrameError, FrameSink, VideoFrame};

/// Writes every frame as `frame_NNNNNN.png` into a directory
pub struct ImageDirectorySink {
    dir: PathBuf,
    written: u64,
}

impl ImageDirectorySink {
    /// Create the sink, creating `dir` if needed
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, FrameError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    /// Number of frames written so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for ImageDirectorySink {
    fn write(&mut self, frame: VideoFrame) -> Result<(), FrameError> {
        let path = self.dir.join(format!("frame_{:06}.png", frame.sequence));
        let image = frame.into_rgb_image()?;
        image
            .save(&path)
            .map_err(|e| FrameError::Write(format!("{}: {}", path.display(), e)))?;
        self.written += 1;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), FrameError> {
        info!("Wrote {} frames to {}", self.written, self.dir.display());
        Ok(())
    }
}
