//! Session-scoped progress reporting

use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

/// Progress reporting errors; never fatal to a session
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Progress receiver dropped")]
    Closed,

    #[error("Progress sink failed: {0}")]
    Failed(String),
}

/// One progress report
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Completion in percent, monotonic within a session
    pub percent: f32,
    pub message: String,
}

/// Receives progress of a running session
pub trait ProgressSink {
    fn report(&self, percent: f32, message: &str) -> Result<(), ProgressError>;
}

impl<F> ProgressSink for F
where
    F: Fn(f32, &str),
{
    fn report(&self, percent: f32, message: &str) -> Result<(), ProgressError> {
        self(percent, message);
        Ok(())
    }
}

/// Sending half of a progress channel
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    tx: watch::Sender<ProgressUpdate>,
}

/// Create a progress channel for one session.
///
/// The receiver always holds the latest report, starting at 0%.
pub fn progress_channel() -> (ProgressHandle, watch::Receiver<ProgressUpdate>) {
    let (tx, rx) = watch::channel(ProgressUpdate {
        percent: 0.0,
        message: "Waiting to start".to_string(),
    });
    (ProgressHandle { tx }, rx)
}

impl ProgressSink for ProgressHandle {
    fn report(&self, percent: f32, message: &str) -> Result<(), ProgressError> {
        self.tx
            .send(ProgressUpdate {
                percent,
                message: message.to_string(),
            })
            .map_err(|_| ProgressError::Closed)
    }
}

/// Paces progress reports for the orchestrator and swallows sink failures
pub(crate) struct ProgressReporter<'a> {
    sink: Option<&'a dyn ProgressSink>,
    total_frames: Option<u64>,
    interval: u64,
    last_percent: f32,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(
        sink: Option<&'a dyn ProgressSink>,
        total_frames: Option<u64>,
        interval: u64,
    ) -> Self {
        Self {
            sink,
            total_frames: total_frames.filter(|&t| t > 0),
            interval: interval.max(1),
            last_percent: 0.0,
        }
    }

    /// Called after each sampled frame; reports every `interval` sampled frames
    pub(crate) fn frame_done(&mut self, frame_index: u64, sampled: u64) {
        if sampled % self.interval != 0 {
            return;
        }
        let read = frame_index + 1;
        let (percent, message) = match self.total_frames {
            Some(total) => (
                frame_index as f32 * 100.0 / total as f32,
                format!("Processing frame {}/{}", read, total),
            ),
            None => (self.last_percent, format!("Processed {} frames", read)),
        };
        self.emit(percent, &message);
    }

    pub(crate) fn complete(&mut self, message: &str) {
        self.emit(100.0, message);
    }

    fn emit(&mut self, percent: f32, message: &str) {
        let Some(sink) = self.sink else {
            return;
        };
        let percent = percent.clamp(self.last_percent, 100.0);
        self.last_percent = percent;

        match catch_unwind(AssertUnwindSafe(|| sink.report(percent, message))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Ignoring progress failure: {}", e),
            Err(_) => warn!("Ignoring panic in progress callback"),
        }
    }
}
