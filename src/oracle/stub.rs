//! Stub oracle for tests and model-free demo runs.

use image::{GrayImage, Luma};
use sha2::{Digest, Sha256};

use crate::frame::{Frame, Mask};
use crate::oracle::{OracleError, SegmentationOracle};

/// Deterministic oracle that fabricates two masks per frame: one compact
/// block (classifies as a building) and one elongated band (classifies as a
/// road). Placement is derived from a hash of the frame pixels, so identical
/// frames always produce identical masks while a moving scene drifts.
pub struct StubOracle;

impl StubOracle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationOracle for StubOracle {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn generate(&mut self, frame: &Frame) -> Result<Vec<Mask>, OracleError> {
        let (width, height) = (frame.width(), frame.height());
        if width < 16 || height < 16 {
            return Ok(vec![]);
        }

        let digest: [u8; 32] = Sha256::digest(frame.as_rgb24()).into();

        // Compact block, one third of the short side, jittered by the hash.
        let side = (width.min(height) / 3).max(4);
        let block_x = 1 + digest[0] as u32 % (width - side - 1);
        let block_y = 1 + digest[1] as u32 % (height - side - 1);
        let block = rect_mask(width, height, block_x, block_y, side, side);

        // Elongated band across most of the frame width.
        let band_h = (height / 40).max(2);
        let band_w = width * 4 / 5;
        let band_x = (width - band_w) / 2;
        let band_y = 1 + digest[2] as u32 % (height - band_h - 1);
        let band = rect_mask(width, height, band_x, band_y, band_w, band_h);

        Ok(vec![block, band])
    }
}

fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> Mask {
    let mut raster = GrayImage::new(width, height);
    for y in y0..(y0 + h).min(height) {
        for x in x0..(x0 + w).min(width) {
            raster.put_pixel(x, y, Luma([255]));
        }
    }
    Mask::from_raster(raster)
}
