//! Live segmentation overlay kernel.
//!
//! This crate turns raw, noisy per-frame segmentation output into a stable,
//! semantically filtered annotation stream at interactive rates. For every
//! frame it: bounds the frame size, asks an external segmentation oracle for
//! candidate masks, classifies each mask by geometry, unions the masks of the
//! category of interest into one raster, closes small gaps morphologically,
//! and composites the result as a translucent tint onto the frame.
//!
//! # Module structure
//!
//! - `frame`: `Frame` and `Mask` data model
//! - `pipeline`: the pure per-frame stages (resize, classify, accumulate,
//!   morphology, overlay)
//! - `oracle`: the segmentation oracle interface and a deterministic stub
//! - `source`: sequential frame sources (synthetic, FFmpeg files)
//! - `stream`: the stream controller state machine and worker loop
//! - `config`: `overlayd` runtime configuration
//!
//! The oracle and the display shell are external collaborators: the pipeline
//! sees the oracle only as a function from a frame to a set of masks, and the
//! consumer only sees delivered frames and status text on a channel.

pub mod config;
pub mod frame;
pub mod oracle;
pub mod pipeline;
pub mod source;
pub mod stream;

pub use config::OverlaydConfig;
pub use frame::{Frame, Mask};
pub use oracle::{OracleError, SegmentationOracle, StubOracle};
pub use pipeline::{Category, ResizePlan, MAX_DIM};
pub use source::{FileConfig, FileSource, FrameSource};
pub use stream::{CancelToken, StreamConfig, StreamController, StreamEvent, StreamState};
