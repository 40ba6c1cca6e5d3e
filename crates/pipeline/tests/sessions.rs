//! End-to-end sessions over in-memory sources

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use frame_io::{MemorySink, MemorySource, VideoFrame};
use pipeline::{
    BoxOverlay, Pipeline, PipelineConfig, SessionOutcome, SOURCE_UNAVAILABLE_MESSAGE,
};
use scene::replay::RecordedFrame;
use scene::{DetectorConfig, DetectorError, DetectorSlot, RawDetection, ReplayDetector};

const CAR_IN_FRONT: &str = "Watch out! A Car right in front of you! Stay where you are!";
const RED_LIGHT: &str = "Red light ahead. Stop and wait.";

fn car_box() -> RawDetection {
    RawDetection::new(2, 0.9, [400.0, 300.0, 500.0, 560.0])
}

/// General-objects slot answering every frame with the same boxes
fn constant_general(boxes: Vec<RawDetection>) -> DetectorSlot {
    DetectorSlot::new(
        DetectorConfig::general(),
        move |_: &VideoFrame| -> Result<Vec<RawDetection>, DetectorError> { Ok(boxes.clone()) },
    )
    .unwrap()
}

fn frames(count: u64) -> MemorySource {
    MemorySource::blank(count, 900, 600, 30.0)
}

#[test]
fn test_unopenable_source_yields_single_message() {
    let mut pipeline =
        Pipeline::new(PipelineConfig::default(), vec![constant_general(vec![car_box()])]).unwrap();
    let mut sink = MemorySink::new();

    let report = pipeline.run(
        MemorySource::unavailable("missing.mp4"),
        Some(&mut sink),
        None,
    );

    assert_eq!(report.outcome, SessionOutcome::SourceUnavailable);
    assert_eq!(report.messages, vec![SOURCE_UNAVAILABLE_MESSAGE.to_string()]);
    assert_eq!(report.frames_read, 0);
    assert!(sink.frames.is_empty());
}

#[test]
fn test_persistent_object_reannounced_after_window() {
    let mut pipeline =
        Pipeline::new(PipelineConfig::default(), vec![constant_general(vec![car_box()])]).unwrap();

    let report = pipeline.run(frames(200), None, None);

    assert!(report.is_complete());
    assert_eq!(report.frames_read, 200);
    // frames 0 and 120
    assert_eq!(report.messages, vec![CAR_IN_FRONT.to_string(), CAR_IN_FRONT.to_string()]);
}

#[test]
fn test_stride_limits_detector_calls_and_forwards_every_frame() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let slot = DetectorSlot::new(
        DetectorConfig::general(),
        move |_: &VideoFrame| -> Result<Vec<RawDetection>, DetectorError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        },
    )
    .unwrap();
    let config = PipelineConfig {
        target_fps: Some(10.0),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(config, vec![slot]).unwrap();
    let mut sink = MemorySink::new();

    let report = pipeline.run(frames(90), Some(&mut sink), None);

    assert_eq!(report.frames_read, 90);
    assert_eq!(report.frames_sampled, 30);
    assert_eq!(calls.load(Ordering::SeqCst), 30);
    assert_eq!(sink.frames.len(), 90);
    assert!(sink.frames.iter().enumerate().all(|(i, f)| f.sequence == i as u64));
    assert!(sink.finished);
}

#[test]
fn test_detector_failure_appends_diagnostic_and_keeps_partial_log() {
    let slot = DetectorSlot::new(
        DetectorConfig::general(),
        |frame: &VideoFrame| -> Result<Vec<RawDetection>, DetectorError> {
            if frame.sequence == 5 {
                Err(DetectorError::Inference("boom".to_string()))
            } else {
                Ok(vec![car_box()])
            }
        },
    )
    .unwrap();
    let mut pipeline = Pipeline::new(PipelineConfig::default(), vec![slot]).unwrap();
    let mut sink = MemorySink::new();

    let report = pipeline.run(frames(10), Some(&mut sink), None);

    assert_eq!(report.outcome, SessionOutcome::Aborted);
    assert_eq!(
        report.messages,
        vec![
            CAR_IN_FRONT.to_string(),
            "An error occurred during processing: Detector general failed: Inference failed: boom"
                .to_string(),
        ]
    );
    assert_eq!(sink.frames.len(), 5);
    assert!(sink.finished);
}

#[test]
fn test_frame_read_failure_stops_session() {
    let mut pipeline =
        Pipeline::new(PipelineConfig::default(), vec![constant_general(Vec::new())]).unwrap();

    let report = pipeline.run(frames(10).fail_at(3), None, None);

    assert_eq!(report.outcome, SessionOutcome::Aborted);
    assert_eq!(report.frames_read, 3);
    assert_eq!(report.messages.len(), 1);
    assert!(report.messages[0].starts_with("An error occurred during processing: Frame read failed"));
}

#[test]
fn test_traffic_light_wins_over_vehicle_in_front() {
    let lights = DetectorSlot::new(
        DetectorConfig::traffic_lights(),
        |_: &VideoFrame| -> Result<Vec<RawDetection>, DetectorError> {
            Ok(vec![RawDetection::new(3, 0.9, [420.0, 50.0, 460.0, 120.0])])
        },
    )
    .unwrap();
    let mut pipeline = Pipeline::new(
        PipelineConfig::default(),
        vec![constant_general(vec![car_box()]), lights],
    )
    .unwrap();

    let report = pipeline.run(frames(1), None, None);

    assert_eq!(report.messages, vec![RED_LIGHT.to_string()]);
}

#[test]
fn test_sessions_are_independent() {
    let records = vec![
        RecordedFrame {
            frame: 0,
            detections: vec![car_box()],
        },
        RecordedFrame {
            frame: 3,
            detections: vec![
                RawDetection::new(0, 0.8, [50.0, 100.0, 200.0, 590.0]),
                // below the confidence threshold
                RawDetection::new(2, 0.5, [700.0, 200.0, 880.0, 400.0]),
            ],
        },
        RecordedFrame {
            frame: 4,
            detections: vec![car_box()],
        },
    ];
    let slot = DetectorSlot::new(
        DetectorConfig::general(),
        ReplayDetector::from_records(records),
    )
    .unwrap();
    let mut pipeline = Pipeline::new(PipelineConfig::default(), vec![slot]).unwrap();

    let first = pipeline.run(frames(6), None, None);
    let second = pipeline.run(frames(6), None, None);

    assert_eq!(first.messages, second.messages);
    assert_eq!(
        first.messages,
        vec![CAR_IN_FRONT.to_string(), "Person left.".to_string()]
    );
}

#[test]
fn test_progress_is_monotonic_and_completes() {
    let seen = RefCell::new(Vec::new());
    let on_progress = |percent: f32, _: &str| seen.borrow_mut().push(percent);
    let config = PipelineConfig {
        progress_interval: 10,
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(config, vec![constant_general(Vec::new())]).unwrap();

    let report = pipeline.run(frames(95), None, Some(&on_progress));

    assert!(report.is_complete());
    let seen = seen.into_inner();
    assert_eq!(seen.len(), 10);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().copied(), Some(100.0));
}

#[test]
fn test_panicking_progress_callback_does_not_abort() {
    let on_progress = |_: f32, _: &str| panic!("progress consumer went away");
    let mut pipeline =
        Pipeline::new(PipelineConfig::default(), vec![constant_general(vec![car_box()])]).unwrap();

    let report = pipeline.run(frames(60), None, Some(&on_progress));

    assert!(report.is_complete());
    assert_eq!(report.messages, vec![CAR_IN_FRONT.to_string()]);
}

#[test]
fn test_overlay_marks_sampled_frames_only() {
    let config = PipelineConfig {
        target_fps: Some(15.0),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(config, vec![constant_general(vec![car_box()])])
        .unwrap()
        .with_overlay(BoxOverlay::default());
    let mut sink = MemorySink::new();

    pipeline.run(frames(4), Some(&mut sink), None);

    let border = BoxOverlay::color(scene::Category::Vehicle).0;
    assert_eq!(sink.frames[0].get_pixel(400, 300), Some(border));
    assert_eq!(sink.frames[1].get_pixel(400, 300), Some([0, 0, 0]));
    assert_eq!(sink.frames[2].get_pixel(400, 300), Some(border));
    assert_eq!(sink.frames[3].get_pixel(400, 300), Some([0, 0, 0]));
}

#[test]
fn test_cancel_stops_before_next_frame() {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    let slot = DetectorSlot::new(
        DetectorConfig::general(),
        move |frame: &VideoFrame| -> Result<Vec<RawDetection>, DetectorError> {
            if frame.sequence == 2 {
                flag.store(true, Ordering::SeqCst);
            }
            Ok(vec![car_box()])
        },
    )
    .unwrap();
    let seen = RefCell::new(Vec::new());
    let on_progress = |percent: f32, _: &str| seen.borrow_mut().push(percent);
    let mut pipeline = Pipeline::new(PipelineConfig::default(), vec![slot]).unwrap();
    let mut sink = MemorySink::new();

    let report = pipeline.run_until(frames(10), Some(&mut sink), Some(&on_progress), &cancel);

    assert_eq!(report.outcome, SessionOutcome::Cancelled);
    assert!(!report.is_complete());
    assert_eq!(report.frames_read, 3);
    assert_eq!(report.messages, vec![CAR_IN_FRONT.to_string()]);
    assert_eq!(sink.frames.len(), 3);
    assert!(sink.finished);
    assert!(!seen.into_inner().contains(&100.0));
}
