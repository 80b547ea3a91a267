//! Overlay compositing.
//!
//! Blends the refined raster onto the frame as a translucent red tint. The
//! blend is per-pixel and per-channel linear: inside the raster every channel
//! becomes `round(0.6 * src + 0.4 * tint)`; outside the raster the frame is
//! left byte-identical. Delivered frames keep the crate-wide RGB channel
//! order, so the tint saturates the first channel.

use image::GrayImage;

use crate::frame::Frame;

pub const BLEND_SRC_WEIGHT: f32 = 0.6;
pub const BLEND_TINT_WEIGHT: f32 = 0.4;

/// Overlay tint in RGB order.
pub const TINT_RGB: [u8; 3] = [255, 0, 0];

/// Composite the refined raster onto `frame` in place.
///
/// The raster must have the frame's dimensions; pixels where it is zero are
/// untouched.
pub fn composite_overlay(frame: &mut Frame, raster: &GrayImage) {
    debug_assert_eq!((frame.width(), frame.height()), raster.dimensions());

    let data = frame.as_rgb24_mut();
    for (i, mask_px) in raster.iter().enumerate() {
        if *mask_px == 0 {
            continue;
        }
        let base = i * 3;
        for c in 0..3 {
            let src = data[base + c] as f32;
            let tint = TINT_RGB[c] as f32;
            data[base + c] = (src * BLEND_SRC_WEIGHT + tint * BLEND_TINT_WEIGHT).round() as u8;
        }
    }
}
