/// Lifecycle phase of a recorder's session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// Never started, or only previewed.
    #[default]
    Idle,
    /// Capturing one frame per tick.
    Recording,
    /// Inside the encoder's `stop`/`save` sequence.
    Finalizing,
    /// Last session produced its asset.
    Finished,
    /// Last session ended with an encoder error.
    Failed,
    /// Last session was cancelled before the window elapsed.
    Cancelled,
}

/// Mutable per-instance recording state.
///
/// While `is_recording` holds, `0 <= elapsed_ms <= window`; the tick that pushes elapsed time
/// past the window clears the flag before finalizing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RecordingSession {
    pub(crate) elapsed_ms: f64,
    pub(crate) is_recording: bool,
    pub(crate) is_dry_run: bool,
    pub(crate) status: SessionStatus,
    pub(crate) frames_captured: u64,
    pub(crate) completed: u32,
}

impl RecordingSession {
    /// Time accumulated since the last real start.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// `true` while frames are being captured.
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Whether the most recent start was a dry run.
    pub fn is_dry_run(&self) -> bool {
        self.is_dry_run
    }

    /// Current lifecycle phase.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Frames captured in the current (or last) session.
    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    /// Number of sessions that reached a successful finalize.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// `true` while a real session holds the encoder (recording or finalizing).
    pub fn is_busy(&self) -> bool {
        self.is_recording || self.status == SessionStatus::Finalizing
    }

    pub(crate) fn begin(&mut self) {
        self.elapsed_ms = 0.0;
        self.frames_captured = 0;
        self.is_recording = true;
        self.is_dry_run = false;
        self.status = SessionStatus::Recording;
    }

    pub(crate) fn end(&mut self, status: SessionStatus) {
        self.is_recording = false;
        self.status = status;
    }
}
