//! FFmpeg-backed local file decoding.
//!
//! Frames are decoded in-memory and scaled to RGB24 before they enter the
//! pipeline. The container handle lives from `open` until `release`.

use anyhow::{anyhow, Context, Result};
use ffmpeg_next as ffmpeg;

use super::file::FileConfig;
use crate::frame::Frame;

pub(crate) struct FfmpegFileSource {
    config: FileConfig,
    state: Option<OpenState>,
    frame_count: u64,
    finished: bool,
}

struct OpenState {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
}

impl FfmpegFileSource {
    pub(crate) fn new(config: FileConfig) -> Self {
        Self {
            config,
            state: None,
            frame_count: 0,
            finished: false,
        }
    }

    pub(crate) fn open(&mut self) -> Result<(u32, u32)> {
        if !std::path::Path::new(&self.config.path).exists() {
            return Err(anyhow!("video not found: {}", self.config.path));
        }
        ffmpeg::init().context("initialize ffmpeg")?;
        let input = ffmpeg::format::input(&self.config.path)
            .with_context(|| format!("could not open video '{}'", self.config.path))?;
        let input_stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow!("file has no video track"))?;
        let stream_index = input_stream.index();
        let context = ffmpeg::codec::context::Context::from_parameters(input_stream.parameters())
            .context("load video decoder parameters")?;
        let decoder = context
            .decoder()
            .video()
            .context("open ffmpeg video decoder")?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .context("create ffmpeg scaler")?;

        let dims = (decoder.width(), decoder.height());
        self.state = Some(OpenState {
            input,
            stream_index,
            decoder,
            scaler,
        });
        log::info!(
            "FileSource: opened {} ({}x{}, ffmpeg)",
            self.config.path,
            dims.0,
            dims.1
        );
        Ok(dims)
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| anyhow!("file source not opened"))?;

        let mut decoded = ffmpeg::frame::Video::empty();
        let mut rgb_frame = ffmpeg::frame::Video::empty();

        for (stream, packet) in state.input.packets() {
            if stream.index() != state.stream_index {
                continue;
            }
            state
                .decoder
                .send_packet(&packet)
                .context("send packet to ffmpeg decoder")?;
            if state.decoder.receive_frame(&mut decoded).is_ok() {
                state
                    .scaler
                    .run(&decoded, &mut rgb_frame)
                    .context("scale frame to RGB")?;
                self.frame_count += 1;
                return frame_to_rgb24(&rgb_frame).map(Some);
            }
        }

        // Container exhausted: drain the decoder, then report end of stream.
        state.decoder.send_eof().ok();
        if state.decoder.receive_frame(&mut decoded).is_ok() {
            state
                .scaler
                .run(&decoded, &mut rgb_frame)
                .context("scale frame to RGB")?;
            self.frame_count += 1;
            return frame_to_rgb24(&rgb_frame).map(Some);
        }
        self.finished = true;
        Ok(None)
    }

    pub(crate) fn release(&mut self) {
        if self.state.take().is_some() {
            log::debug!(
                "FileSource: released {} after {} frames",
                self.config.path,
                self.frame_count
            );
        }
    }
}

/// Copy an RGB24 ffmpeg frame into an owned buffer, honoring row padding.
fn frame_to_rgb24(frame: &ffmpeg::frame::Video) -> Result<Frame> {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let row_len = width as usize * 3;
    let data = frame.data(0);

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    Frame::from_rgb24(pixels, width, height)
}
