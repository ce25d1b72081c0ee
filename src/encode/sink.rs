use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::foundation::error::{RecorderError, RecorderResult};
use crate::render::backend::FrameRGBA;

/// Base file name used when a recorder has no `output-name`.
pub const DEFAULT_OUTPUT_NAME: &str = "camera-recording";

/// Container/codec of the finalized asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Animated GIF written in-process.
    #[default]
    Gif,
    /// H.264 MP4 through the system `ffmpeg` binary.
    Mp4,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
        }
    }
}

/// Settings handed to a frame encoder when it is created.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderSettings {
    /// Output container.
    pub format: OutputFormat,
    /// Base name of the asset; `None` uses [`DEFAULT_OUTPUT_NAME`].
    pub name: Option<String>,
    /// Output timing: frames per second of the encoded asset.
    pub frame_rate: f64,
    /// Compression hint in `0..=100`; higher is better quality.
    pub quality: u8,
    /// Parallelism hint for finalize work.
    pub worker_count: usize,
    /// Number of previous captures blended into each frame (0 disables motion blur).
    pub motion_blur_frames: u32,
    /// Directory the finalized asset is written to.
    pub out_dir: PathBuf,
}

impl EncoderSettings {
    /// Check ranges the encoders rely on.
    pub fn validate(&self) -> RecorderResult<()> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(RecorderError::validation(
                "encoder frame rate must be a positive number",
            ));
        }
        if self.quality > 100 {
            return Err(RecorderError::validation(
                "encoder quality must be within 0..=100",
            ));
        }
        Ok(())
    }

    /// Base name, falling back to [`DEFAULT_OUTPUT_NAME`] when unset or blank.
    pub fn file_stem(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_OUTPUT_NAME,
        }
    }

    /// Full path of the finalized asset.
    pub fn output_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}.{}", self.file_stem(), self.format.extension()))
    }
}

/// Frame encoder contract used by a recording controller.
///
/// Call order for one session: `start`, any number of `capture`, then `stop` and `save`.
/// `abort` ends a session without producing an asset. All calls are synchronous from the
/// controller's point of view; encoders may parallelize internally.
pub trait FrameEncoder {
    /// Begin a new session, discarding anything left from a previous one.
    fn start(&mut self) -> RecorderResult<()>;
    /// Accept the most recently rendered frame.
    fn capture(&mut self, frame: &FrameRGBA) -> RecorderResult<()>;
    /// Stop accepting frames.
    fn stop(&mut self) -> RecorderResult<()>;
    /// Finalize buffered frames into the output asset and return its location, if any.
    fn save(&mut self) -> RecorderResult<Option<PathBuf>>;
    /// Drop the current session without output.
    fn abort(&mut self);
}

/// One call observed by an [`InMemoryEncoder`].
#[derive(Clone, Debug, PartialEq)]
pub enum EncoderCall {
    /// `start`
    Start,
    /// `capture`, with the dimensions of the captured frame.
    Capture {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },
    /// `stop`
    Stop,
    /// `save`
    Save,
    /// `abort`
    Abort,
}

/// Shared view of the calls an [`InMemoryEncoder`] received.
#[derive(Clone, Debug, Default)]
pub struct EncoderLog(Rc<RefCell<Vec<EncoderCall>>>);

impl EncoderLog {
    /// Snapshot of every call so far, in order.
    pub fn calls(&self) -> Vec<EncoderCall> {
        self.0.borrow().clone()
    }

    /// Number of `capture` calls.
    pub fn captures(&self) -> usize {
        self.count(|c| matches!(c, EncoderCall::Capture { .. }))
    }

    /// Number of `save` calls.
    pub fn saves(&self) -> usize {
        self.count(|c| *c == EncoderCall::Save)
    }

    /// Number of `start` calls.
    pub fn starts(&self) -> usize {
        self.count(|c| *c == EncoderCall::Start)
    }

    fn count(&self, pred: impl Fn(&EncoderCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    fn push(&self, call: EncoderCall) {
        self.0.borrow_mut().push(call);
    }
}

/// In-memory encoder for tests and debugging. Keeps the last captured frame and a call log.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    log: EncoderLog,
    capture_limit: Option<usize>,
    fail_start: bool,
    fail_save: bool,
    session_captures: usize,
    last_frame: Option<FrameRGBA>,
    output: Option<PathBuf>,
}

impl InMemoryEncoder {
    /// New encoder and a handle to its call log.
    pub fn new() -> (Self, EncoderLog) {
        let enc = Self::default();
        let log = enc.log.clone();
        (enc, log)
    }

    /// Fail every capture after `limit` successful ones in a session.
    pub fn with_capture_limit(mut self, limit: usize) -> Self {
        self.capture_limit = Some(limit);
        self
    }

    /// Reject every `start`.
    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Reject every `save`.
    pub fn with_failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    /// Path reported by `save`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Most recent frame accepted by `capture`.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last_frame.as_ref()
    }
}

impl FrameEncoder for InMemoryEncoder {
    fn start(&mut self) -> RecorderResult<()> {
        self.log.push(EncoderCall::Start);
        if self.fail_start {
            return Err(RecorderError::encode("encoder refused to start"));
        }
        self.session_captures = 0;
        self.last_frame = None;
        Ok(())
    }

    fn capture(&mut self, frame: &FrameRGBA) -> RecorderResult<()> {
        if self
            .capture_limit
            .is_some_and(|limit| self.session_captures >= limit)
        {
            return Err(RecorderError::encode("capture limit reached"));
        }
        self.log.push(EncoderCall::Capture {
            width: frame.width,
            height: frame.height,
        });
        self.session_captures += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        self.log.push(EncoderCall::Stop);
        Ok(())
    }

    fn save(&mut self) -> RecorderResult<Option<PathBuf>> {
        self.log.push(EncoderCall::Save);
        if self.fail_save {
            return Err(RecorderError::encode("encoder failed to save"));
        }
        Ok(self.output.clone())
    }

    fn abort(&mut self) {
        self.log.push(EncoderCall::Abort);
        self.last_frame = None;
    }
}

/// Create the file-producing encoder for `settings.format`.
pub fn create_encoder(settings: EncoderSettings) -> RecorderResult<Box<dyn FrameEncoder>> {
    settings.validate()?;
    match settings.format {
        OutputFormat::Gif => Ok(Box::new(crate::encode::gif::GifEncoder::new(settings))),
        OutputFormat::Mp4 => Ok(Box::new(crate::encode::ffmpeg::FfmpegEncoder::new(
            settings,
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
