use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::encode::blur::MotionBlur;
use crate::encode::sink::{EncoderSettings, FrameEncoder};
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::render::backend::FrameRGBA;

/// `true` when an `ffmpeg` binary answers `-version`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> RecorderResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Map quality `0..=100` onto x264 CRF `51..=0`.
pub(crate) fn crf_for_quality(quality: u8) -> u8 {
    ((100 - u32::from(quality.min(100))) * 51 / 100) as u8
}

struct Pipe {
    child: Child,
    stdin: Option<ChildStdin>,
    width: u32,
    height: u32,
}

/// Streams captured frames into the system `ffmpeg` binary, producing an H.264 MP4.
///
/// The process is spawned on the first capture of a session, once the frame size is known.
pub struct FfmpegEncoder {
    settings: EncoderSettings,
    blur: MotionBlur,
    pipe: Option<Pipe>,
    scratch: Vec<u8>,
    capturing: bool,
    frames: u64,
}

impl FfmpegEncoder {
    /// Create an idle encoder.
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            blur: MotionBlur::new(settings.motion_blur_frames),
            settings,
            pipe: None,
            scratch: Vec::new(),
            capturing: false,
            frames: 0,
        }
    }

    fn spawn(&self, width: u32, height: u32) -> RecorderResult<Pipe> {
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(RecorderError::validation(
                "mp4 frame width/height must be even (yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(RecorderError::encode(
                "ffmpeg is required for MP4 output, but was not found on PATH",
            ));
        }

        let out_path = self.settings.output_path();
        ensure_parent_dir(&out_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{width}x{height}"),
                "-r",
                &format!("{}", self.settings.frame_rate),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-crf",
                &crf_for_quality(self.settings.quality).to_string(),
                "-threads",
                &self.settings.worker_count.to_string(),
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| RecorderError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecorderError::encode("failed to open ffmpeg stdin"))?;

        tracing::debug!(path = %out_path.display(), width, height, "ffmpeg spawned");
        Ok(Pipe {
            child,
            stdin: Some(stdin),
            width,
            height,
        })
    }

    fn kill(&mut self) {
        if let Some(mut pipe) = self.pipe.take() {
            drop(pipe.stdin.take());
            let _ = pipe.child.kill();
            let _ = pipe.child.wait();
        }
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn start(&mut self) -> RecorderResult<()> {
        self.kill();
        self.blur.reset();
        self.frames = 0;
        self.capturing = true;
        Ok(())
    }

    fn capture(&mut self, frame: &FrameRGBA) -> RecorderResult<()> {
        if !self.capturing {
            return Err(RecorderError::encode("ffmpeg encoder is not capturing"));
        }
        if frame.data.len() != frame.expected_len() {
            return Err(RecorderError::encode(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if self.pipe.is_none() {
            self.pipe = Some(self.spawn(frame.width, frame.height)?);
        }
        let blended = self.blur.apply(frame);
        flatten_opaque(&mut self.scratch, &blended);

        let Some(pipe) = self.pipe.as_mut() else {
            return Err(RecorderError::encode("ffmpeg pipe is not open"));
        };
        if frame.width != pipe.width || frame.height != pipe.height {
            return Err(RecorderError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, pipe.width, pipe.height
            )));
        }
        let Some(stdin) = pipe.stdin.as_mut() else {
            return Err(RecorderError::encode("ffmpeg stdin is already closed"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            RecorderError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.frames += 1;
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        self.capturing = false;
        if let Some(pipe) = self.pipe.as_mut() {
            drop(pipe.stdin.take());
        }
        Ok(())
    }

    fn save(&mut self) -> RecorderResult<Option<PathBuf>> {
        self.capturing = false;
        let Some(mut pipe) = self.pipe.take() else {
            return Err(RecorderError::encode("no frames were captured"));
        };
        drop(pipe.stdin.take());

        let output = pipe
            .child
            .wait_with_output()
            .map_err(|e| RecorderError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecorderError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let path = self.settings.output_path();
        tracing::info!(path = %path.display(), frames = self.frames, "mp4 saved");
        Ok(Some(path))
    }

    fn abort(&mut self) {
        self.capturing = false;
        self.blur.reset();
        self.kill();
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Composite `frame` over opaque black into `dst` (resized as needed).
fn flatten_opaque(dst: &mut Vec<u8>, frame: &FrameRGBA) {
    dst.clear();
    dst.reserve(frame.data.len());
    for px in frame.data.chunks_exact(4) {
        let a = u32::from(px[3]);
        for &c in &px[..3] {
            let c = u32::from(c);
            let v = if frame.premultiplied || a == 255 {
                c
            } else {
                (c * a + 127) / 255
            };
            dst.push(v.min(255) as u8);
        }
        dst.push(255);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
