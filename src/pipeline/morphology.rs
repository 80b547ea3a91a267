//! Morphological refinement of the accumulated raster.
//!
//! A single closing (dilate, then erode) with a square k x k window fills the
//! small gaps left between imperfect per-object masks without materially
//! growing the overall footprint. The window side scales with the frame's
//! longest dimension and the window is anchored at `(k / 2, k / 2)`.
//!
//! Border behavior: out-of-image neighbors count as empty for dilation and as
//! full for erosion, so the image border itself never erodes. The result
//! depends only on the input raster and `k`.

use image::GrayImage;

/// Fraction of the longest frame dimension used as the closing window side.
pub const KERNEL_DIM_FRACTION: f64 = 0.005;

/// Closing window side for a frame of the given dimensions, at least 1.
pub fn closing_kernel_size(width: u32, height: u32) -> u32 {
    let k = (width.max(height) as f64 * KERNEL_DIM_FRACTION) as u32;
    k.max(1)
}

/// Morphological closing with a square `k x k` structuring element.
pub fn close(raster: &GrayImage, k: u32) -> GrayImage {
    if k <= 1 {
        return raster.clone();
    }
    erode(&dilate(raster, k), k)
}

fn window_offsets(k: u32) -> (i64, i64) {
    // Anchor at k / 2: offsets span [-(k / 2), k - 1 - k / 2].
    let anchor = (k / 2) as i64;
    (-anchor, k as i64 - 1 - anchor)
}

fn dilate(raster: &GrayImage, k: u32) -> GrayImage {
    let (width, height) = raster.dimensions();
    let (lo, hi) = window_offsets(k);
    let mut out = GrayImage::new(width, height);
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            'window: for dy in lo..=hi {
                for dx in lo..=hi {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    if raster.get_pixel(nx as u32, ny as u32).0[0] > 0 {
                        out.put_pixel(x as u32, y as u32, image::Luma([255]));
                        break 'window;
                    }
                }
            }
        }
    }
    out
}

fn erode(raster: &GrayImage, k: u32) -> GrayImage {
    let (width, height) = raster.dimensions();
    let (lo, hi) = window_offsets(k);
    let mut out = GrayImage::new(width, height);
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut all_set = true;
            'window: for dy in lo..=hi {
                for dx in lo..=hi {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    if raster.get_pixel(nx as u32, ny as u32).0[0] == 0 {
                        all_set = false;
                        break 'window;
                    }
                }
            }
            if all_set {
                out.put_pixel(x as u32, y as u32, image::Luma([255]));
            }
        }
    }
    out
}
