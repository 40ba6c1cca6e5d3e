//! Wayguide command-line runner
//!
//! Runs one guidance session over a still image or a directory of frames,
//! answering detector calls from recorded JSON Lines output.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use frame_io::{FrameSink, FrameSource, ImageDirectorySink, ImageFileSource, ImageSequenceSource};
use pipeline::{progress_channel, spawn_session, Pipeline, PipelineConfig, SessionReport};
use scene::{DetectorConfig, DetectorKind, DetectorSlot, ReplayDetector};
use tokio::sync::Semaphore;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "wayguide")]
#[command(version, about = "Street guidance for visually impaired pedestrians")]
pub struct Args {
    /// Still image, or directory of frame images played back in name order
    #[arg(short, long)]
    pub input: PathBuf,

    /// Recorded detector output as KIND=PATH (general, traffic-lights, zebra-crossing)
    #[arg(short, long = "detections", value_name = "KIND=PATH", required = true)]
    pub detections: Vec<DetectorArg>,

    /// Frame rate of a frame directory
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,

    /// Rate at which frames are handed to detectors
    #[arg(long)]
    pub target_fps: Option<f64>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write annotated frames to this directory
    #[arg(long)]
    pub annotate_dir: Option<PathBuf>,

    /// Print the session report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// One `KIND=PATH` detector argument
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorArg {
    pub kind: DetectorKind,
    pub path: PathBuf,
}

impl FromStr for DetectorArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected KIND=PATH, got '{}'", s))?;
        let kind = match kind.trim().replace('_', "-").as_str() {
            "general" | "general-objects" => DetectorKind::GeneralObjects,
            "traffic-lights" | "traffic-light" => DetectorKind::TrafficLights,
            "zebra-crossing" | "zebra-crossings" | "zebra" => DetectorKind::ZebraCrossings,
            other => return Err(format!("unknown detector kind '{}'", other)),
        };
        if path.is_empty() {
            return Err("detections path is empty".to_string());
        }
        Ok(Self {
            kind,
            path: PathBuf::from(path),
        })
    }
}

impl DetectorArg {
    /// Replay detector with the default configuration for its kind
    pub fn load(&self) -> anyhow::Result<DetectorSlot> {
        let replay = ReplayDetector::from_path(&self.path)
            .with_context(|| format!("loading detections from {}", self.path.display()))?;
        let slot = DetectorSlot::new(DetectorConfig::for_kind(self.kind), replay)?;
        Ok(slot)
    }
}

/// Initialize logging on stderr, keeping stdout for the message log
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Frame source for a still image or a frame directory
pub fn open_source(input: &Path, fps: f64) -> Box<dyn FrameSource + Send> {
    if input.is_dir() {
        Box::new(ImageSequenceSource::new(input, fps))
    } else {
        Box::new(ImageFileSource::new(input))
    }
}

/// Build the pipeline described by `args` and run one session
pub async fn run(args: &Args) -> anyhow::Result<SessionReport> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if args.target_fps.is_some() {
        config.target_fps = args.target_fps;
    }
    if args.annotate_dir.is_some() {
        config.annotate = true;
    }

    let detectors = args
        .detections
        .iter()
        .map(DetectorArg::load)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let pipeline = Pipeline::new(config, detectors)?;

    let sink = match &args.annotate_dir {
        Some(dir) => Some(Box::new(ImageDirectorySink::create(dir)?) as Box<dyn FrameSink + Send>),
        None => None,
    };
    let source = open_source(&args.input, args.fps);

    // single admission slot; a server would share one gate across requests
    let gate = Arc::new(Semaphore::new(1));
    let permit = gate.acquire_owned().await?;

    let (progress, mut updates) = progress_channel();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let update = updates.borrow_and_update().clone();
            info!("{:>5.1}% {}", update.percent, update.message);
        }
    });

    let (_pipeline, report) = spawn_session(pipeline, source, sink, Some(progress), permit).await?;
    watcher.await?;
    Ok(report)
}

/// Print the report: one message per line, or JSON
pub fn print_report(report: &SessionReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for message in &report.messages {
            println!("{}", message);
        }
    }
    Ok(())
}
