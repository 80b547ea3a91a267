//! Frame and mask data model.
//!
//! - `Frame`: Owned RGB24 pixel buffer. Channel order is RGB and is held
//!   constant across the whole pipeline; the compositor documents the same
//!   convention for delivered frames.
//! - `Mask`: Candidate region raster produced by the segmentation oracle,
//!   read-only to the pipeline, plus its precomputed pixel area.
//!
//! Frames are owned exclusively by the stream worker for the duration of one
//! iteration and then moved to the consumer inside a `StreamEvent`.

use anyhow::{anyhow, Result};
use image::{GrayImage, RgbImage};

/// Owned RGB24 frame. Three bytes per pixel, row-major, RGB channel order.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Create a frame from a raw RGB24 buffer. The buffer length must equal
    /// `width * height * 3`.
    pub fn from_rgb24(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame pixel area (`width * height`).
    pub fn pixel_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn as_rgb24(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_rgb24_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Convert into an `image` buffer for resampling.
    pub(crate) fn into_rgb_image(self) -> RgbImage {
        // Length was validated at construction, so from_raw cannot fail.
        RgbImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| RgbImage::new(0, 0))
    }

    pub(crate) fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
        }
    }
}

/// Candidate region mask from the segmentation oracle.
///
/// The raster uses 0 for "outside" and 255 for "inside". `area` is the count
/// of set pixels, carried alongside the raster so downstream stages never
/// re-scan the raster to obtain it.
#[derive(Clone, Debug)]
pub struct Mask {
    raster: GrayImage,
    area: u64,
}

impl Mask {
    /// Wrap a raster with a precomputed area, as delivered by an oracle.
    pub fn new(raster: GrayImage, area: u64) -> Self {
        Self { raster, area }
    }

    /// Wrap a raster, counting the set pixels to derive the area.
    pub fn from_raster(raster: GrayImage) -> Self {
        let area = raster.pixels().filter(|p| p.0[0] > 0).count() as u64;
        Self { raster, area }
    }

    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    pub fn area(&self) -> u64 {
        self.area
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}
