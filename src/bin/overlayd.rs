//! overlayd - live segmentation overlay daemon
//!
//! Headless consumer of the stream core:
//! 1. Opens the configured frame source (a local video file or `stub://`)
//! 2. Runs the overlay pipeline with the selected oracle on a worker thread
//! 3. Logs status text and delivered-frame metadata as they arrive
//! 4. Stops cleanly on Ctrl-C (cooperative cancellation, never mid-frame)
//!
//! Display and persistence are out of scope here; a graphical shell would
//! consume the same event channel.

use anyhow::{anyhow, Result};
use clap::Parser;

use overlay_kernel::{
    CancelToken, FileConfig, FileSource, OverlaydConfig, SegmentationOracle, StreamConfig,
    StreamController, StreamEvent, StubOracle,
};

#[derive(Parser, Debug)]
#[command(name = "overlayd", about = "Live segmentation overlay daemon")]
struct Args {
    /// Video path or stub:// source; overrides OVERLAY_VIDEO_PATH.
    video: Option<String>,

    /// Oracle backend to run.
    #[arg(long)]
    oracle: Option<String>,

    /// Maximum-dimension budget for oracle input frames.
    #[arg(long)]
    max_dim: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = OverlaydConfig::load()?;
    if let Some(video) = args.video {
        cfg.video_path = video;
    }
    if let Some(oracle) = args.oracle {
        cfg.oracle = oracle;
    }
    if let Some(max_dim) = args.max_dim {
        cfg.max_dim = max_dim;
    }

    let source = FileSource::new(FileConfig {
        path: cfg.video_path.clone(),
    })?;
    let oracle = build_oracle(&cfg.oracle)?;

    log::info!(
        "overlayd starting: video={} oracle={} max_dim={}",
        cfg.video_path,
        cfg.oracle,
        cfg.max_dim
    );

    let cancel = CancelToken::new();
    let ctrlc_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        log::info!("stop requested");
        ctrlc_cancel.cancel();
    })?;

    let (controller, events) = StreamController::start(
        Box::new(source),
        oracle,
        StreamConfig {
            max_dim: cfg.max_dim,
        },
        cancel,
    );

    let mut exit = Ok(());
    for event in events {
        match event {
            StreamEvent::Status(text) => log::info!("{}", text),
            StreamEvent::Frame { index, frame } => {
                log::debug!(
                    "frame {} delivered ({}x{}, RGB)",
                    index,
                    frame.width(),
                    frame.height()
                );
            }
            StreamEvent::Ended { frames_delivered } => {
                log::info!("stream ended, {} frames delivered", frames_delivered);
            }
            StreamEvent::Failed(message) => {
                exit = Err(anyhow!("stream failed: {}", message));
            }
        }
    }

    controller.join();
    exit
}

fn build_oracle(name: &str) -> Result<Box<dyn SegmentationOracle>> {
    match name {
        "stub" => Ok(Box::new(StubOracle::new())),
        other => Err(anyhow!(
            "unknown oracle backend '{}' (available: stub)",
            other
        )),
    }
}
