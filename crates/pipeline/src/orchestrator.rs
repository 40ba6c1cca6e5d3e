//! Frame-pipeline orchestrator

use std::sync::atomic::{AtomicBool, Ordering};

use frame_io::{FrameSink, FrameSource, VideoFrame};
use guidance::FrameContext;
use scene::{DetectorSlot, FrameGeometry, Normalizer};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::overlay::BoxOverlay;
use crate::progress::{ProgressReporter, ProgressSink};
use crate::session::Session;
use crate::{PipelineError, SOURCE_UNAVAILABLE_MESSAGE};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Every frame was consumed
    Completed,
    /// The source could not be opened; the log holds a single sentinel entry
    SourceUnavailable,
    /// A mid-stream failure stopped the session; the log ends with a diagnostic
    Aborted,
    /// The caller stopped the session between frames; no diagnostic is added
    Cancelled,
}

/// Result of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Guidance messages and diagnostics in emission order
    pub messages: Vec<String>,
    pub frames_read: u64,
    pub frames_sampled: u64,
    pub outcome: SessionOutcome,
}

impl SessionReport {
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == SessionOutcome::Completed
    }
}

/// Number of source frames per detector invocation.
///
/// `round(source_fps / target_fps)`, never below 1. Without a target, or with
/// an unusable source rate, every frame is sampled.
pub fn sampling_stride(source_fps: f64, target_fps: Option<f64>) -> u64 {
    match target_fps {
        Some(target) if target > 0.0 && source_fps > 0.0 && source_fps.is_finite() => {
            (source_fps / target).round().max(1.0) as u64
        }
        _ => 1,
    }
}

/// Detectors plus configuration; runs any number of sessions, one at a time
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    detectors: Vec<DetectorSlot>,
    overlay: Option<BoxOverlay>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, detectors: Vec<DetectorSlot>) -> Result<Self, PipelineError> {
        config.validate()?;
        if detectors.is_empty() {
            warn!("Pipeline has no detectors; sessions will produce no guidance");
        }
        let overlay = config.annotate.then(BoxOverlay::default);
        Ok(Self {
            config,
            detectors,
            overlay,
        })
    }

    /// Draw boxes on sampled frames before they reach a sink
    pub fn with_overlay(mut self, overlay: BoxOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detectors(&self) -> &[DetectorSlot] {
        &self.detectors
    }

    /// Run one session over `source`.
    ///
    /// Never fails: an unopenable source yields the single sentinel message,
    /// and a mid-stream failure appends a diagnostic to the messages gathered
    /// so far. The source is dropped on return.
    pub fn run<S: FrameSource>(
        &mut self,
        source: S,
        sink: Option<&mut dyn FrameSink>,
        progress: Option<&dyn ProgressSink>,
    ) -> SessionReport {
        self.run_until(source, sink, progress, &AtomicBool::new(false))
    }

    /// Run one session, stopping before the next frame read once `cancel` is set.
    ///
    /// A cancelled session keeps the messages gathered so far, still finishes
    /// the sink and sends no completion report.
    pub fn run_until<S: FrameSource>(
        &mut self,
        mut source: S,
        mut sink: Option<&mut dyn FrameSink>,
        progress: Option<&dyn ProgressSink>,
        cancel: &AtomicBool,
    ) -> SessionReport {
        let metadata = match source.open() {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("{}", PipelineError::SourceUnavailable(e));
                return SessionReport {
                    messages: vec![SOURCE_UNAVAILABLE_MESSAGE.to_string()],
                    frames_read: 0,
                    frames_sampled: 0,
                    outcome: SessionOutcome::SourceUnavailable,
                };
            }
        };

        let stride = sampling_stride(metadata.fps, self.config.target_fps);
        info!(
            "Starting session: {}x{} @ {:.2} fps, {:?} frames, stride {}",
            metadata.width, metadata.height, metadata.fps, metadata.frame_count, stride
        );

        let mut session = Session::new(self.config.announce.clone());
        let mut reporter = ProgressReporter::new(
            progress,
            metadata.frame_count,
            self.config.progress_interval,
        );
        let annotate = sink.is_some();
        let mut frames_read = 0u64;
        let mut frames_sampled = 0u64;

        let mut cancelled = false;
        let mut failure = loop {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break None;
            }
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break None,
                Err(e) => break Some(PipelineError::Frame(e)),
            };
            let index = frames_read;
            frames_read += 1;

            let sampled = index % stride == 0;
            let frame = if sampled {
                frames_sampled += 1;
                let context = FrameContext::new(index, metadata.fps);
                match self.process_sampled(&mut session, context, frame, annotate) {
                    Ok(frame) => frame,
                    Err(e) => break Some(e),
                }
            } else {
                frame
            };

            if let Some(sink) = sink.as_deref_mut() {
                if let Err(e) = sink.write(frame) {
                    break Some(PipelineError::Sink(e));
                }
            }
            if sampled {
                reporter.frame_done(index, frames_sampled);
            }
        };

        if let Some(sink) = sink.as_deref_mut() {
            if let Err(e) = sink.finish() {
                failure.get_or_insert(PipelineError::Sink(e));
            }
        }

        let outcome = match failure {
            Some(e) => {
                error!("Session aborted after {} frames: {}", frames_read, e);
                session.record_diagnostic(e.diagnostic());
                SessionOutcome::Aborted
            }
            None if cancelled => {
                warn!("Session cancelled after {} frames", frames_read);
                SessionOutcome::Cancelled
            }
            None => {
                reporter.complete("Processing complete");
                SessionOutcome::Completed
            }
        };

        info!(
            "Session finished ({:?}): {} frames read, {} sampled, {} messages",
            outcome,
            frames_read,
            frames_sampled,
            session.messages().len()
        );

        SessionReport {
            messages: session.into_messages(),
            frames_read,
            frames_sampled,
            outcome,
        }
    }

    /// Detect, normalize and arbitrate one sampled frame
    fn process_sampled(
        &mut self,
        session: &mut Session,
        context: FrameContext,
        frame: VideoFrame,
        annotate: bool,
    ) -> Result<VideoFrame, PipelineError> {
        let normalizer = Normalizer::new(FrameGeometry::new(frame.width, frame.height));
        let mut detections = Vec::new();
        for slot in &mut self.detectors {
            let raw = slot
                .detect(&frame)
                .map_err(|source| PipelineError::Detector {
                    detector: slot.name().to_string(),
                    source,
                })?;
            detections.extend(normalizer.normalize(&slot.config, &raw));
        }

        session.process_frame(context, &detections)?;

        match &self.overlay {
            Some(overlay) if annotate => overlay
                .draw(frame, &detections)
                .map_err(PipelineError::Frame),
            _ => Ok(frame),
        }
    }
}
