//! Frame resize policy.
//!
//! Caps the longest frame dimension at a fixed budget so per-frame oracle cost
//! stays bounded on constrained hardware. Both dimensions scale by the same
//! factor, so the aspect ratio is preserved exactly (up to rounding).

use anyhow::{anyhow, Result};
use image::imageops::{self, FilterType};

use crate::frame::Frame;

/// Default maximum-dimension budget for oracle input frames.
pub const MAX_DIM: u32 = 640;

/// Precomputed resize decision for one stream. Computed once from the source
/// dimensions and applied to every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizePlan {
    pub scale: f64,
    pub out_w: u32,
    pub out_h: u32,
}

impl ResizePlan {
    pub fn is_passthrough(&self) -> bool {
        self.scale == 1.0
    }
}

/// Compute the resize plan for a source of `width` x `height`.
///
/// `scale = min(1.0, max_dim / max(width, height))`, target dimensions are
/// rounded. Zero dimensions violate the frame-source contract and fail fast.
pub fn plan_resize(width: u32, height: u32, max_dim: u32) -> Result<ResizePlan> {
    if width == 0 || height == 0 {
        return Err(anyhow!(
            "invalid source dimensions {}x{}: width and height must be non-zero",
            width,
            height
        ));
    }
    let longest = width.max(height) as f64;
    let scale = (max_dim as f64 / longest).min(1.0);
    let (out_w, out_h) = if scale == 1.0 {
        (width, height)
    } else {
        (
            (width as f64 * scale).round() as u32,
            (height as f64 * scale).round() as u32,
        )
    };
    Ok(ResizePlan {
        scale,
        out_w,
        out_h,
    })
}

/// Apply a resize plan to a frame. Passthrough plans return the frame unchanged.
pub fn apply_resize(plan: &ResizePlan, frame: Frame) -> Frame {
    if plan.is_passthrough() {
        return frame;
    }
    let resized = imageops::resize(
        &frame.into_rgb_image(),
        plan.out_w,
        plan.out_h,
        FilterType::Triangle,
    );
    Frame::from_rgb_image(resized)
}
