//! Async session runner for hosts serving concurrent requests

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use frame_io::{FrameSink, FrameSource};
use tokio::sync::OwnedSemaphorePermit;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::orchestrator::{Pipeline, SessionReport};
use crate::progress::{ProgressHandle, ProgressSink};

/// Handle to a running session.
///
/// Awaiting it yields the pipeline and the report. Dropping it, or calling
/// [`SessionHandle::cancel`], stops the session before its next frame read,
/// which releases the admission permit.
#[derive(Debug)]
pub struct SessionHandle {
    join: JoinHandle<(Pipeline, SessionReport)>,
    cancel: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Ask the session to stop; it ends with `SessionOutcome::Cancelled`
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Future for SessionHandle {
    type Output = Result<(Pipeline, SessionReport), JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.join).poll(cx)
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run a session on the blocking pool.
///
/// `permit` is the caller's admission grant and is released when the session
/// ends. The pipeline is handed back with the report so its detectors can
/// serve the next session.
pub fn spawn_session<S>(
    mut pipeline: Pipeline,
    source: S,
    mut sink: Option<Box<dyn FrameSink + Send>>,
    progress: Option<ProgressHandle>,
    permit: OwnedSemaphorePermit,
) -> SessionHandle
where
    S: FrameSource + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    let join = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let sink = sink.as_mut().map(|s| &mut **s as &mut dyn FrameSink);
        let progress = progress.as_ref().map(|p| p as &dyn ProgressSink);
        let report = pipeline.run_until(source, sink, progress, &flag);
        debug!("Releasing session permit");
        (pipeline, report)
    });
    SessionHandle { join, cancel }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::orchestrator::SessionOutcome;
    use crate::progress::progress_channel;
    use crate::SOURCE_UNAVAILABLE_MESSAGE;
    use frame_io::{MemorySink, MemorySource, VideoFrame};
    use scene::{DetectorConfig, DetectorError, DetectorSlot, RawDetection};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default(), Vec::new()).unwrap()
    }

    #[tokio::test]
    async fn test_permit_held_for_session() {
        let gate = Arc::new(Semaphore::new(1));
        let permit = gate.clone().acquire_owned().await.unwrap();

        let handle = spawn_session(
            pipeline(),
            MemorySource::blank(10, 64, 48, 30.0),
            Some(Box::new(MemorySink::new())),
            None,
            permit,
        );
        let (_pipeline, report) = handle.await.unwrap();

        assert_eq!(report.outcome, SessionOutcome::Completed);
        assert_eq!(report.frames_read, 10);
        assert_eq!(gate.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_progress_channel_reaches_completion() {
        let gate = Arc::new(Semaphore::new(1));
        let permit = gate.clone().acquire_owned().await.unwrap();
        let (handle, rx) = progress_channel();

        let (_pipeline, report) = spawn_session(
            pipeline(),
            MemorySource::blank(45, 16, 16, 30.0),
            None,
            Some(handle),
            permit,
        )
        .await
        .unwrap();

        assert!(report.is_complete());
        let last = rx.borrow().clone();
        assert_eq!(last.percent, 100.0);
    }

    #[tokio::test]
    async fn test_unavailable_source_reports_sentinel() {
        let gate = Arc::new(Semaphore::new(2));
        let permit = gate.clone().acquire_owned().await.unwrap();

        let (_pipeline, report) = spawn_session(
            pipeline(),
            MemorySource::unavailable("missing.mp4"),
            None,
            None,
            permit,
        )
        .await
        .unwrap();

        assert_eq!(report.messages, vec![SOURCE_UNAVAILABLE_MESSAGE.to_string()]);
        assert_eq!(report.outcome, SessionOutcome::SourceUnavailable);
    }

    /// Pipeline whose detector takes 5 ms per call and counts its calls
    fn slow_pipeline(calls: Arc<AtomicUsize>) -> Pipeline {
        let slot = DetectorSlot::new(
            DetectorConfig::general(),
            move |_: &VideoFrame| -> Result<Vec<RawDetection>, DetectorError> {
                calls.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                Ok(Vec::new())
            },
        )
        .unwrap();
        Pipeline::new(PipelineConfig::default(), vec![slot]).unwrap()
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_session_and_frees_permit() {
        let gate = Arc::new(Semaphore::new(1));
        let permit = gate.clone().acquire_owned().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let handle = spawn_session(
            slow_pipeline(calls.clone()),
            MemorySource::blank(200, 16, 16, 30.0),
            None,
            None,
            permit,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(handle);

        for _ in 0..200 {
            if gate.available_permits() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(gate.available_permits(), 1);
        assert!(calls.load(Ordering::SeqCst) < 200);
    }

    #[tokio::test]
    async fn test_cancelled_session_reports_partial_log() {
        let gate = Arc::new(Semaphore::new(1));
        let permit = gate.clone().acquire_owned().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let handle = spawn_session(
            slow_pipeline(calls.clone()),
            MemorySource::blank(200, 16, 16, 30.0),
            Some(Box::new(MemorySink::new())),
            None,
            permit,
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        let (_pipeline, report) = handle.await.unwrap();

        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert!(report.frames_read < 200);
        assert!(report.messages.is_empty());
        assert_eq!(gate.available_permits(), 1);
    }
}
