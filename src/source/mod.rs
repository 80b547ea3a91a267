//! Frame sources.
//!
//! A frame source is a sequential pull of RGB frames with known dimensions,
//! an end-of-stream indicator, and an explicit release operation. The stream
//! worker owns its source exclusively for the lifetime of a stream and
//! releases it on every exit path (end, cancellation, failure).
//!
//! Provided sources:
//! - `stub://` synthetic frames (testing, model-free demos)
//! - local video files via FFmpeg (feature: ingest-file-ffmpeg)

pub mod file;
#[cfg(feature = "ingest-file-ffmpeg")]
pub(crate) mod file_ffmpeg;

use anyhow::Result;

use crate::frame::Frame;

pub use file::{FileConfig, FileSource};

/// Sequential frame source consumed by the stream controller.
pub trait FrameSource: Send {
    /// Open the source and return its frame dimensions `(width, height)`.
    ///
    /// Errors here are fatal: the stream never starts.
    fn open(&mut self) -> Result<(u32, u32)>;

    /// Pull the next frame. `Ok(None)` signals end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying handle. Idempotent; called on every exit path.
    fn release(&mut self);
}
