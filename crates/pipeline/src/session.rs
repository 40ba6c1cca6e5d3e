//! Per-session guidance state

use alerting::{group, AnnounceConfig, AnnouncementTracker};
use guidance::{arbitrate, FrameContext, GuidanceMessage};
use scene::Detection;
use tracing::debug;

use crate::PipelineError;

/// One processing session: tracker, frame counter and message log.
///
/// Sessions are never shared; two sessions fed the same detections produce
/// the same log.
#[derive(Debug)]
pub struct Session {
    tracker: AnnouncementTracker,
    messages: Vec<String>,
    last_frame: Option<u64>,
    frames_processed: u64,
}

impl Session {
    pub fn new(config: AnnounceConfig) -> Self {
        Self {
            tracker: AnnouncementTracker::new(config),
            messages: Vec::new(),
            last_frame: None,
            frames_processed: 0,
        }
    }

    /// Group and arbitrate one sampled frame, logging any message produced.
    ///
    /// Frame indices must strictly increase within a session.
    pub fn process_frame(
        &mut self,
        frame: FrameContext,
        detections: &[Detection],
    ) -> Result<Option<GuidanceMessage>, PipelineError> {
        if let Some(last) = self.last_frame {
            if frame.index <= last {
                return Err(PipelineError::OutOfOrder {
                    index: frame.index,
                    last,
                });
            }
        }
        self.last_frame = Some(frame.index);
        self.frames_processed += 1;

        if detections.is_empty() {
            return Ok(None);
        }

        let buckets = group(detections);
        let message = arbitrate(&buckets, frame, &mut self.tracker);
        if let Some(message) = &message {
            debug!(
                "Frame {} ({:.2}s): {} [{}]",
                frame.index,
                frame.seconds(),
                message.text,
                message.kind.key()
            );
            self.messages.push(message.text.clone());
        }
        Ok(message)
    }

    /// Append a diagnostic entry to the log
    pub fn record_diagnostic(&mut self, entry: impl Into<String>) {
        self.messages.push(entry.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Number of frames handed to [`Session::process_frame`]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn tracker(&self) -> &AnnouncementTracker {
        &self.tracker
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnnounceConfig::default())
    }
}
