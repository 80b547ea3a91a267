//! Segmentation oracle abstraction.
//!
//! The pipeline never loads a model itself. It consumes an oracle through a
//! narrow functional interface (frame in, candidate masks out) so the stream
//! controller can be tested against a deterministic stub, and so model
//! loading, device selection, and weight files stay an external concern.

pub mod stub;

use thiserror::Error;

use crate::frame::{Frame, Mask};

pub use stub::StubOracle;

/// Failure modes of an oracle call.
///
/// `ResourceExhausted` is the only recoverable variant: the stream controller
/// skips the current frame and keeps going. Everything else aborts the stream.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle resource exhaustion: {0}")]
    ResourceExhausted(String),
    #[error("oracle failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Producer of candidate region masks for a frame.
///
/// Implementations must return masks with the frame's dimensions and an
/// accurate `area` for each. The pipeline calls `generate` from a single
/// worker thread, never concurrently; any internal locking or device state is
/// the implementation's own concern.
pub trait SegmentationOracle: Send {
    /// Oracle identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Produce the candidate masks for one frame.
    fn generate(&mut self, frame: &Frame) -> Result<Vec<Mask>, OracleError>;
}
