//! End-to-end stream controller behavior against scripted fixtures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use image::{GrayImage, Luma};

use overlay_kernel::{
    CancelToken, Frame, FrameSource, Mask, OracleError, SegmentationOracle, StreamConfig,
    StreamController, StreamEvent, StreamState,
};

const W: u32 = 64;
const H: u32 = 48;

/// Finite source of black frames with hooks for open failure, mid-stream
/// cancellation, and release tracking.
struct ScriptedSource {
    frames: u64,
    produced: u64,
    fail_open: Option<String>,
    cancel_after: Option<(u64, CancelToken)>,
    released: Arc<AtomicBool>,
}

impl ScriptedSource {
    fn new(frames: u64) -> (Self, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        (
            Self {
                frames,
                produced: 0,
                fail_open: None,
                cancel_after: None,
                released: Arc::clone(&released),
            },
            released,
        )
    }
}

impl FrameSource for ScriptedSource {
    fn open(&mut self) -> Result<(u32, u32)> {
        match &self.fail_open {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok((W, H)),
        }
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.produced >= self.frames {
            return Ok(None);
        }
        self.produced += 1;
        if let Some((after, token)) = &self.cancel_after {
            // Cancellation lands between this frame and the next one, before
            // the worker's next loop-top poll.
            if self.produced == *after {
                token.cancel();
            }
        }
        Frame::from_rgb24(vec![0u8; (W * H * 3) as usize], W, H).map(Some)
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Oracle returning one fixed building-shaped mask per frame, with scripted
/// per-call failures.
struct ScriptedOracle {
    calls: u64,
    oom_on: Vec<u64>,
    fail_on: Option<u64>,
}

impl ScriptedOracle {
    fn new() -> Self {
        Self {
            calls: 0,
            oom_on: vec![],
            fail_on: None,
        }
    }

    fn building_mask() -> Mask {
        let mut raster = GrayImage::new(W, H);
        for y in 8..20 {
            for x in 8..24 {
                raster.put_pixel(x, y, Luma([255]));
            }
        }
        Mask::from_raster(raster)
    }
}

impl SegmentationOracle for ScriptedOracle {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn generate(&mut self, _frame: &Frame) -> Result<Vec<Mask>, OracleError> {
        self.calls += 1;
        if self.oom_on.contains(&self.calls) {
            return Err(OracleError::ResourceExhausted("scripted oom".into()));
        }
        if self.fail_on == Some(self.calls) {
            return Err(OracleError::Backend(anyhow!("scripted backend failure")));
        }
        Ok(vec![Self::building_mask()])
    }
}

struct Outcome {
    frames: Vec<(u64, Frame)>,
    statuses: Vec<String>,
    ended: Option<u64>,
    failed: Option<String>,
}

fn drain(rx: crossbeam_channel::Receiver<StreamEvent>) -> Outcome {
    let mut outcome = Outcome {
        frames: vec![],
        statuses: vec![],
        ended: None,
        failed: None,
    };
    for event in rx {
        match event {
            StreamEvent::Frame { index, frame } => outcome.frames.push((index, frame)),
            StreamEvent::Status(text) => outcome.statuses.push(text),
            StreamEvent::Ended { frames_delivered } => outcome.ended = Some(frames_delivered),
            StreamEvent::Failed(message) => outcome.failed = Some(message),
        }
    }
    outcome
}

#[test]
fn delivers_all_frames_in_source_order() {
    let (source, released) = ScriptedSource::new(4);
    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(ScriptedOracle::new()),
        StreamConfig::default(),
        CancelToken::new(),
    );

    let outcome = drain(rx);
    let indices: Vec<u64> = outcome.frames.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(outcome.statuses.len(), 4);
    assert_eq!(outcome.statuses[0], "Segmenting Frame 1...");
    assert_eq!(outcome.ended, Some(4));
    assert!(outcome.failed.is_none());

    // The mask region is tinted, the rest of the black frame is untouched.
    let frame = &outcome.frames[0].1;
    let inside = ((10 * W + 10) * 3) as usize;
    assert_eq!(&frame.as_rgb24()[inside..inside + 3], &[102, 0, 0]);
    let outside = 0usize;
    assert_eq!(&frame.as_rgb24()[outside..outside + 3], &[0, 0, 0]);

    assert_eq!(controller.state(), StreamState::Ended);
    assert!(!controller.is_running());
    assert!(released.load(Ordering::SeqCst));
    controller.join();
}

#[test]
fn oom_frame_produces_a_gap_not_a_reorder() {
    let (source, released) = ScriptedSource::new(3);
    let mut oracle = ScriptedOracle::new();
    oracle.oom_on = vec![2];

    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(oracle),
        StreamConfig::default(),
        CancelToken::new(),
    );

    let outcome = drain(rx);
    let indices: Vec<u64> = outcome.frames.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 3]);
    // Every iteration still reported status, including the skipped one.
    assert_eq!(outcome.statuses.len(), 3);
    assert_eq!(outcome.ended, Some(2));
    assert!(outcome.failed.is_none());
    assert_eq!(controller.state(), StreamState::Ended);
    assert!(released.load(Ordering::SeqCst));
    controller.join();
}

#[test]
fn cancellation_between_frames_ends_cleanly() {
    let cancel = CancelToken::new();
    let (mut source, released) = ScriptedSource::new(5);
    source.cancel_after = Some((2, cancel.clone()));

    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(ScriptedOracle::new()),
        StreamConfig::default(),
        cancel,
    );

    let outcome = drain(rx);
    let indices: Vec<u64> = outcome.frames.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(outcome.ended, Some(2));
    assert!(outcome.failed.is_none(), "cancellation must not fail");
    assert_eq!(controller.state(), StreamState::Ended);
    assert!(released.load(Ordering::SeqCst));
    controller.join();
}

#[test]
fn stop_is_idempotent_and_a_noop_after_end() {
    let (source, _released) = ScriptedSource::new(1);
    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(ScriptedOracle::new()),
        StreamConfig::default(),
        CancelToken::new(),
    );
    let outcome = drain(rx);
    assert_eq!(outcome.ended, Some(1));

    controller.stop();
    controller.stop();
    assert_eq!(controller.state(), StreamState::Ended);
    controller.join();
}

#[test]
fn fatal_open_error_fails_before_the_loop() {
    let (mut source, released) = ScriptedSource::new(3);
    source.fail_open = Some("video not found: missing.mp4".into());

    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(ScriptedOracle::new()),
        StreamConfig::default(),
        CancelToken::new(),
    );

    let outcome = drain(rx);
    assert!(outcome.frames.is_empty());
    assert!(outcome.statuses.is_empty());
    assert!(outcome.ended.is_none());
    assert_eq!(
        outcome.failed.as_deref(),
        Some("video not found: missing.mp4")
    );
    assert_eq!(controller.state(), StreamState::Failed);
    assert!(released.load(Ordering::SeqCst));
    controller.join();
}

#[test]
fn unexpected_oracle_error_aborts_the_stream() {
    let (source, released) = ScriptedSource::new(4);
    let mut oracle = ScriptedOracle::new();
    oracle.fail_on = Some(2);

    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(oracle),
        StreamConfig::default(),
        CancelToken::new(),
    );

    let outcome = drain(rx);
    let indices: Vec<u64> = outcome.frames.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1]);
    assert!(outcome.ended.is_none());
    assert!(outcome
        .failed
        .as_deref()
        .is_some_and(|m| m.contains("scripted backend failure")));
    assert_eq!(controller.state(), StreamState::Failed);
    assert!(released.load(Ordering::SeqCst));
    controller.join();
}

#[test]
fn frames_are_resized_to_the_budget() {
    let (source, _released) = ScriptedSource::new(1);
    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(ScriptedOracle::new()),
        StreamConfig { max_dim: 32 },
        CancelToken::new(),
    );

    let outcome = drain(rx);
    assert_eq!(outcome.frames.len(), 1);
    let frame = &outcome.frames[0].1;
    assert_eq!((frame.width(), frame.height()), (32, 24));
    controller.join();
}

#[test]
fn dropped_consumer_counts_as_cancellation() {
    let (source, released) = ScriptedSource::new(1000);
    let (controller, rx) = StreamController::start(
        Box::new(source),
        Box::new(ScriptedOracle::new()),
        StreamConfig::default(),
        CancelToken::new(),
    );
    drop(rx);

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while controller.is_running() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert_eq!(controller.state(), StreamState::Ended);
    assert!(released.load(Ordering::SeqCst));
    controller.join();
}
