//! Per-frame mask accumulation.
//!
//! Builds one boolean raster per frame by unioning every oracle mask that
//! classifies as `Building`. The raster starts all-clear for every frame and
//! is set-only while the frame is processed; nothing carries over between
//! frames. Union is a logical OR, so accumulation is idempotent and the
//! processing order of masks never affects the result.

use image::GrayImage;

use crate::frame::Mask;
use crate::pipeline::classify::{classify_mask, Category};

/// Masks smaller than this fraction of the frame area are dropped as noise
/// before classification. This is a cost gate, but the cutoff also shapes the
/// output raster, so it must stay at this exact value.
pub const MIN_AREA_FRACTION: f64 = 0.0005;

/// Union all `Building` masks for one frame into a fresh 0/255 raster.
pub fn accumulate_masks(masks: &[Mask], width: u32, height: u32) -> GrayImage {
    let mut accum = GrayImage::new(width, height);
    let frame_area = width as f64 * height as f64;

    for mask in masks {
        if (mask.area() as f64) / frame_area < MIN_AREA_FRACTION {
            continue;
        }
        if mask.width() != width || mask.height() != height {
            log::warn!(
                "oracle mask is {}x{} but frame is {}x{}; ignoring mask",
                mask.width(),
                mask.height(),
                width,
                height
            );
            continue;
        }
        if classify_mask(mask) != Some(Category::Building) {
            continue;
        }
        for (accum_px, mask_px) in accum.iter_mut().zip(mask.raster().iter()) {
            if *mask_px > 0 {
                *accum_px = 255;
            }
        }
    }

    accum
}
