/// Convenience result type used across the recorder.
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Top-level error taxonomy used by recorder APIs.
///
/// Errors are always local to one recorder instance; a failing instance never poisons its
/// siblings or the scene.
#[derive(thiserror::Error, Debug)]
pub enum RecorderError {
    /// Invalid user-provided values (durations, rates, quality range).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration that could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// `start` was called while a real recording session is active.
    #[error("recording already in progress")]
    RecordingInProgress,

    /// Frame encoder failures (capture, finalize, external process).
    #[error("encode error: {0}")]
    Encode(String),

    /// Scene lookups and host lifecycle errors.
    #[error("scene error: {0}")]
    Scene(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RecorderError {
    /// Build a [`RecorderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RecorderError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`RecorderError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RecorderError::Scene`] value.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
