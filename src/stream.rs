//! Stream controller: lifecycle, worker loop, and event delivery.
//!
//! One dedicated worker thread drives the per-frame loop
//! (resize -> oracle -> accumulate -> refine -> composite) and emits events to
//! the consumer over a channel. The consumer never touches pipeline state; it
//! only receives events and issues start/stop requests.
//!
//! Guarantees:
//! - Frames are delivered in strict source order with 1-based, monotonically
//!   increasing indices. A skipped frame consumes its index and produces no
//!   delivery for it (a gap, never a duplicate or reorder).
//! - Cancellation is cooperative and polled once per frame boundary, at the
//!   top of each iteration; latency is bounded by one frame's processing time.
//! - The frame source is released on every exit path.
//! - Oracle resource exhaustion skips the frame; any other mid-loop error
//!   fails the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::frame::Frame;
use crate::oracle::{OracleError, SegmentationOracle};
use crate::pipeline::{
    accumulate_masks, apply_resize, close, closing_kernel_size, composite_overlay, plan_resize,
    MAX_DIM,
};
use crate::source::FrameSource;

/// Stream lifecycle. `Ended` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Opening,
    Running,
    Stopping,
    Ended,
    Failed,
}

/// Events delivered to the consumer.
#[derive(Debug)]
pub enum StreamEvent {
    /// Human-readable progress, one per loop iteration.
    Status(String),
    /// One display frame per successfully processed index, RGB channel order.
    Frame { index: u64, frame: Frame },
    /// Terminal: source exhausted or cancellation acknowledged.
    Ended { frames_delivered: u64 },
    /// Terminal: unrecoverable error.
    Failed(String),
}

/// Cooperative cancellation flag shared between the consumer and the worker.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Stream tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    /// Maximum-dimension budget for oracle input frames.
    pub max_dim: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { max_dim: MAX_DIM }
    }
}

/// Handle to a running (or finished) stream.
pub struct StreamController {
    cancel: CancelToken,
    state: Arc<Mutex<StreamState>>,
    worker: Option<JoinHandle<()>>,
}

impl StreamController {
    /// Spawn the worker and return the controller plus the event receiver.
    ///
    /// The worker takes exclusive ownership of `source` and `oracle` for the
    /// stream's lifetime.
    pub fn start(
        source: Box<dyn FrameSource>,
        oracle: Box<dyn SegmentationOracle>,
        config: StreamConfig,
        cancel: CancelToken,
    ) -> (Self, Receiver<StreamEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let state = Arc::new(Mutex::new(StreamState::Idle));

        let worker_state = Arc::clone(&state);
        let worker_cancel = cancel.clone();
        let worker = std::thread::Builder::new()
            .name("overlay-stream".to_string())
            .spawn(move || {
                run_stream(source, oracle, config, worker_cancel, worker_state, tx);
            })
            .expect("spawn stream worker");

        (
            Self {
                cancel,
                state,
                worker: Some(worker),
            },
            rx,
        )
    }

    /// Request a stop. Idempotent; a no-op when the stream already ended.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state(),
            StreamState::Opening | StreamState::Running | StreamState::Stopping
        )
    }

    pub fn state(&self) -> StreamState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait for the worker to finish.
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        // A dropped controller must not leave a detached worker streaming.
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn set_state(state: &Arc<Mutex<StreamState>>, next: StreamState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}

fn run_stream(
    mut source: Box<dyn FrameSource>,
    mut oracle: Box<dyn SegmentationOracle>,
    config: StreamConfig,
    cancel: CancelToken,
    state: Arc<Mutex<StreamState>>,
    tx: Sender<StreamEvent>,
) {
    set_state(&state, StreamState::Opening);

    let fail = |source: &mut Box<dyn FrameSource>, message: String| {
        log::error!("stream failed: {}", message);
        source.release();
        set_state(&state, StreamState::Failed);
        let _ = tx.send(StreamEvent::Failed(message));
    };

    let (width, height) = match source.open() {
        Ok(dims) => dims,
        Err(e) => return fail(&mut source, e.to_string()),
    };
    let plan = match plan_resize(width, height, config.max_dim) {
        Ok(plan) => plan,
        Err(e) => return fail(&mut source, e.to_string()),
    };
    log::info!(
        "stream running: source {}x{}, oracle '{}', processing at {}x{}",
        width,
        height,
        oracle.name(),
        plan.out_w,
        plan.out_h
    );
    set_state(&state, StreamState::Running);

    let mut index: u64 = 0;
    let mut delivered: u64 = 0;
    let cancelled = loop {
        if cancel.is_cancelled() {
            set_state(&state, StreamState::Stopping);
            break true;
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break false,
            Err(e) => return fail(&mut source, e.to_string()),
        };
        index += 1;

        if tx
            .send(StreamEvent::Status(format!("Segmenting Frame {}...", index)))
            .is_err()
        {
            // Consumer went away; treat as cancellation.
            set_state(&state, StreamState::Stopping);
            break true;
        }

        let mut frame = apply_resize(&plan, frame);

        let masks = match oracle.generate(&frame) {
            Ok(masks) => masks,
            Err(OracleError::ResourceExhausted(reason)) => {
                log::warn!("skipping frame {}: {}", index, reason);
                continue;
            }
            Err(e) => return fail(&mut source, e.to_string()),
        };

        let accum = accumulate_masks(&masks, frame.width(), frame.height());
        let kernel = closing_kernel_size(frame.width(), frame.height());
        let refined = close(&accum, kernel);
        composite_overlay(&mut frame, &refined);

        if tx.send(StreamEvent::Frame { index, frame }).is_err() {
            set_state(&state, StreamState::Stopping);
            break true;
        }
        delivered += 1;

        if delivered % 5 == 0 {
            log::debug!("delivered {} of {} frames so far", delivered, index);
        }
    };

    source.release();
    set_state(&state, StreamState::Ended);
    if cancelled {
        log::info!("stream cancelled after {} delivered frames", delivered);
    } else {
        log::info!("stream ended after {} delivered frames", delivered);
    }
    let _ = tx.send(StreamEvent::Ended {
        frames_delivered: delivered,
    });
}
