use std::path::PathBuf;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder as ImageGifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use rayon::prelude::*;

use crate::encode::blur::MotionBlur;
use crate::encode::sink::{EncoderSettings, FrameEncoder};
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::render::backend::FrameRGBA;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Capturing,
    Stopped,
}

/// Buffers captured frames and writes an animated GIF on `save`.
///
/// Frame conversion is spread over a dedicated rayon pool sized by `worker_count`.
#[derive(Debug)]
pub struct GifEncoder {
    settings: EncoderSettings,
    blur: MotionBlur,
    frames: Vec<FrameRGBA>,
    state: State,
}

impl GifEncoder {
    /// Create an idle encoder.
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            blur: MotionBlur::new(settings.motion_blur_frames),
            settings,
            frames: Vec::new(),
            state: State::Idle,
        }
    }

    /// Frames buffered in the current session.
    pub fn buffered_frames(&self) -> usize {
        self.frames.len()
    }
}

/// Map quality `0..=100` onto the GIF quantizer speed `30..=1` (1 is slowest and best).
pub(crate) fn quantizer_speed(quality: u8) -> i32 {
    30 - (i32::from(quality.min(100)) * 29) / 100
}

/// Per-frame delay for the configured frame rate.
pub(crate) fn frame_delay(frame_rate: f64) -> Delay {
    let micros = (1_000_000.0 / frame_rate).round().clamp(1.0, u32::MAX as f64) as u32;
    Delay::from_numer_denom_ms(micros, 1000)
}

fn to_straight_rgba(frame: &FrameRGBA) -> RecorderResult<RgbaImage> {
    if frame.data.len() != frame.expected_len() {
        return Err(RecorderError::encode(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let mut data = frame.data.clone();
    if frame.premultiplied {
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }

    RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| RecorderError::encode("failed to build rgba image from frame"))
}

impl FrameEncoder for GifEncoder {
    fn start(&mut self) -> RecorderResult<()> {
        self.frames.clear();
        self.blur.reset();
        self.state = State::Capturing;
        tracing::debug!(path = %self.settings.output_path().display(), "gif session started");
        Ok(())
    }

    fn capture(&mut self, frame: &FrameRGBA) -> RecorderResult<()> {
        if self.state != State::Capturing {
            return Err(RecorderError::encode("gif encoder is not capturing"));
        }
        if let Some(first) = self.frames.first()
            && (first.width != frame.width || first.height != frame.height)
        {
            return Err(RecorderError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, first.width, first.height
            )));
        }
        self.frames.push(self.blur.apply(frame));
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        if self.state == State::Capturing {
            self.state = State::Stopped;
        }
        Ok(())
    }

    fn save(&mut self) -> RecorderResult<Option<PathBuf>> {
        if self.state == State::Idle {
            return Err(RecorderError::encode("gif encoder has no session to save"));
        }
        if self.frames.is_empty() {
            self.state = State::Idle;
            return Err(RecorderError::encode("no frames were captured"));
        }

        let frames = std::mem::take(&mut self.frames);
        self.state = State::Idle;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.worker_count.max(1))
            .build()
            .map_err(|e| RecorderError::encode(format!("failed to build encoder pool: {e}")))?;

        let delay = frame_delay(self.settings.frame_rate);
        let images = pool.install(|| {
            frames
                .par_iter()
                .map(|f| to_straight_rgba(f).map(|img| Frame::from_parts(img, 0, 0, delay)))
                .collect::<RecorderResult<Vec<_>>>()
        })?;

        let mut bytes = Vec::new();
        {
            let mut enc = ImageGifEncoder::new_with_speed(
                &mut bytes,
                quantizer_speed(self.settings.quality),
            );
            enc.set_repeat(Repeat::Infinite)
                .map_err(|e| RecorderError::encode(format!("gif repeat: {e}")))?;
            enc.encode_frames(images)
                .map_err(|e| RecorderError::encode(format!("gif encode: {e}")))?;
        }

        let path = self.settings.output_path();
        crate::encode::ffmpeg::ensure_parent_dir(&path)?;
        std::fs::write(&path, &bytes)
            .with_context(|| format!("write gif '{}'", path.display()))?;

        tracing::info!(
            path = %path.display(),
            frames = frames.len(),
            bytes = bytes.len(),
            "gif saved"
        );
        Ok(Some(path))
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.blur.reset();
        self.state = State::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
