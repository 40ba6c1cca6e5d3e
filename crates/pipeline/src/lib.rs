//! Guidance Pipeline
//!
//! Drives one processing session over a frame source:
//! - Frame sampling and detector invocation
//! - Normalization, grouping and arbitration per sampled frame
//! - Session-scoped message log and progress reporting
//! - Optional box overlay for annotated output

pub mod config;
pub mod orchestrator;
pub mod overlay;
pub mod progress;
pub mod runner;
pub mod session;

pub use crate::config::PipelineConfig;
pub use orchestrator::{sampling_stride, Pipeline, SessionOutcome, SessionReport};
pub use overlay::BoxOverlay;
pub use progress::{progress_channel, ProgressError, ProgressHandle, ProgressSink, ProgressUpdate};
pub use runner::{spawn_session, SessionHandle};
pub use session::Session;

use frame_io::FrameError;
use scene::DetectorError;
use thiserror::Error;

/// Log entry returned when the source cannot be opened
pub const SOURCE_UNAVAILABLE_MESSAGE: &str = "Error: Could not open video file.";

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Could not open source: {0}")]
    SourceUnavailable(#[source] FrameError),

    #[error("Frame read failed: {0}")]
    Frame(#[source] FrameError),

    #[error("Detector {detector} failed: {source}")]
    Detector {
        detector: String,
        #[source]
        source: DetectorError,
    },

    #[error("Frame sink failed: {0}")]
    Sink(#[source] FrameError),

    #[error("Frame {index} arrived after frame {last}")]
    OutOfOrder { index: u64, last: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration loading failed: {0}")]
    Settings(#[from] ::config::ConfigError),
}

impl PipelineError {
    /// Log entry recorded when a session aborts on this error
    pub fn diagnostic(&self) -> String {
        format!("An error occurred during processing: {}", self)
    }
}
