use std::path::PathBuf;

use crate::animation::ease::Ease;
use crate::encode::sink::{EncoderSettings, OutputFormat};
use crate::foundation::core::Vec3;
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::foundation::math::parse_vec3;

/// A vector as written in configuration: `[x, y, z]`, `"x y z"` or `{ "x": .., "y": .., "z": .. }`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum VecInput {
    /// `[x, y, z]`
    Array(Vec<f64>),
    /// `"x y z"`
    Text(String),
    /// `{ "x": .., "y": .., "z": .. }`
    Object {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },
}

impl VecInput {
    /// The vector, or `None` when malformed or not finite.
    pub fn to_vec3(&self) -> Option<Vec3> {
        let v = match self {
            Self::Array(xs) if xs.len() == 3 => Vec3::new(xs[0] as f32, xs[1] as f32, xs[2] as f32),
            Self::Array(_) => return None,
            Self::Text(s) => return parse_vec3(s),
            Self::Object { x, y, z } => Vec3::new(*x as f32, *y as f32, *z as f32),
        };
        v.is_finite().then_some(v)
    }
}

impl From<Vec3> for VecInput {
    fn from(v: Vec3) -> Self {
        Self::Array(vec![f64::from(v.x), f64::from(v.y), f64::from(v.z)])
    }
}

/// Recorder options as supplied by the caller.
///
/// Every key is optional; absent keys take the documented defaults. Presence of the tween
/// endpoints and `look-at` is preserved so attach-time defaulting can tell explicit values
/// from defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RecorderOptions {
    /// Tween duration and recording window length, in milliseconds.
    pub duration: Option<f64>,
    /// Pause before the tween starts, in milliseconds.
    pub hold_before: Option<f64>,
    /// Pause after the tween ends, in milliseconds.
    pub hold_after: Option<f64>,
    /// Output frames per second.
    pub frame_rate: Option<f64>,
    /// Encoder quality hint, 0 to 100.
    pub quality: Option<u32>,
    /// Encoder parallelism hint.
    pub worker_count: Option<usize>,
    /// Blend each frame with the previous capture.
    pub motion_blur_enabled: Option<bool>,
    /// Base name of the produced asset.
    pub output_name: Option<String>,
    /// Output container.
    pub format: Option<OutputFormat>,
    /// Fixed world point the camera faces every tick.
    pub look_at: Option<VecInput>,
    /// Tween start position.
    pub position_from: Option<VecInput>,
    /// Tween end position.
    pub position_to: Option<VecInput>,
    /// Tween start rotation, Euler degrees.
    pub rotation_from: Option<VecInput>,
    /// Tween end rotation, Euler degrees.
    pub rotation_to: Option<VecInput>,
    /// Inject the record and preview buttons.
    pub show_controls: Option<bool>,
    /// Tween easing.
    pub easing: Option<Ease>,
}

/// Optional tween endpoints of one property, as configured.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EndpointPair {
    /// Explicit start value.
    pub from: Option<Vec3>,
    /// End value; `None` disables the tween.
    pub to: Option<Vec3>,
}

/// Immutable per-instance recorder configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingConfig {
    /// Tween duration (> 0).
    pub total_duration_ms: f64,
    /// Hold before the tween (>= 0).
    pub hold_before_ms: f64,
    /// Hold after the tween (>= 0).
    pub hold_after_ms: f64,
    /// Output frames per second (> 0).
    pub frame_rate: f64,
    /// Blend one previous capture into each frame.
    pub motion_blur_enabled: bool,
    /// Asset base name; empty uses the encoder default.
    pub output_name: String,
    /// Encoder quality hint, 0 to 100.
    pub quality: u8,
    /// Encoder parallelism hint.
    pub worker_count: usize,
    /// Output container.
    pub format: OutputFormat,
    /// Look-at target; `None` disables the constraint.
    pub look_at_target: Option<Vec3>,
    /// Inject the record and preview buttons.
    pub show_controls: bool,
    /// Tween easing.
    pub easing: Ease,
    /// Position tween endpoints.
    pub position: EndpointPair,
    /// Rotation tween endpoints, Euler degrees.
    pub rotation: EndpointPair,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            total_duration_ms: 3000.0,
            hold_before_ms: 500.0,
            hold_after_ms: 1000.0,
            frame_rate: 60.0,
            motion_blur_enabled: true,
            output_name: String::new(),
            quality: 85,
            worker_count: 8,
            format: OutputFormat::Gif,
            look_at_target: None,
            show_controls: true,
            easing: Ease::Linear,
            position: EndpointPair::default(),
            rotation: EndpointPair::default(),
        }
    }
}

impl RecordingConfig {
    /// `hold_before + duration + hold_after`.
    pub fn window_ms(&self) -> f64 {
        self.hold_before_ms + self.total_duration_ms + self.hold_after_ms
    }

    /// Check the ranges the controller relies on.
    pub fn validate(&self) -> RecorderResult<()> {
        if !(self.total_duration_ms.is_finite() && self.total_duration_ms > 0.0) {
            return Err(RecorderError::validation("duration must be > 0"));
        }
        if !(self.hold_before_ms.is_finite() && self.hold_before_ms >= 0.0) {
            return Err(RecorderError::validation("hold-before must be >= 0"));
        }
        if !(self.hold_after_ms.is_finite() && self.hold_after_ms >= 0.0) {
            return Err(RecorderError::validation("hold-after must be >= 0"));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(RecorderError::validation("frame-rate must be > 0"));
        }
        if self.quality > 100 {
            return Err(RecorderError::validation("quality must be within 0..=100"));
        }
        Ok(())
    }

    /// Encoder settings derived from this configuration.
    pub fn encoder_settings(&self, out_dir: impl Into<PathBuf>) -> EncoderSettings {
        EncoderSettings {
            format: self.format,
            name: (!self.output_name.is_empty()).then(|| self.output_name.clone()),
            frame_rate: self.frame_rate,
            quality: self.quality,
            worker_count: self.worker_count.max(1),
            motion_blur_frames: u32::from(self.motion_blur_enabled),
            out_dir: out_dir.into(),
        }
    }
}

impl RecorderOptions {
    /// Parse options from JSON text.
    pub fn from_json(text: &str) -> RecorderResult<Self> {
        serde_json::from_str(text).map_err(|e| RecorderError::config(e.to_string()))
    }

    /// Apply defaults, degrade malformed optional vectors and validate.
    pub fn resolve(&self) -> RecorderResult<RecordingConfig> {
        let d = RecordingConfig::default();
        let quality = match self.quality {
            None => d.quality,
            Some(q) if q <= 100 => q as u8,
            Some(q) => {
                return Err(RecorderError::validation(format!(
                    "quality must be within 0..=100, got {q}"
                )));
            }
        };

        let cfg = RecordingConfig {
            total_duration_ms: self.duration.unwrap_or(d.total_duration_ms),
            hold_before_ms: self.hold_before.unwrap_or(d.hold_before_ms),
            hold_after_ms: self.hold_after.unwrap_or(d.hold_after_ms),
            frame_rate: self.frame_rate.unwrap_or(d.frame_rate),
            motion_blur_enabled: self.motion_blur_enabled.unwrap_or(d.motion_blur_enabled),
            output_name: self.output_name.clone().unwrap_or_default(),
            quality,
            worker_count: self.worker_count.unwrap_or(d.worker_count),
            format: self.format.unwrap_or(d.format),
            look_at_target: optional_vec("look-at", self.look_at.as_ref()),
            show_controls: self.show_controls.unwrap_or(d.show_controls),
            easing: self.easing.unwrap_or(d.easing),
            position: EndpointPair {
                from: optional_vec("position-from", self.position_from.as_ref()),
                to: optional_vec("position-to", self.position_to.as_ref()),
            },
            rotation: EndpointPair {
                from: optional_vec("rotation-from", self.rotation_from.as_ref()),
                to: optional_vec("rotation-to", self.rotation_to.as_ref()),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn optional_vec(key: &str, input: Option<&VecInput>) -> Option<Vec3> {
    let input = input?;
    let v = input.to_vec3();
    if v.is_none() {
        tracing::warn!(key, value = ?input, "ignoring malformed vector option");
    }
    v
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
