//! Camera recorder: scripted camera moves in a real-time 3D scene, captured to an animated file.
//!
//! A [`RecordingController`] is attached to a camera entity of a [`Scene`]. When triggered it
//! starts the camera tweens and an encoder session, captures one rendered frame per scene tick
//! for `hold_before + duration + hold_after` milliseconds, then stops and saves the asset.
//!
//! # Tick overview
//!
//! 1. **Play setup** (once per recorder): manual input controls and the VR-mode UI are disabled
//! 2. **Tweens**: triggered position/rotation tweens advance by the tick delta
//! 3. **Constraints**: look-at recorders turn the camera toward their target
//! 4. **Render**: the active camera renders the scene markers into a [`FrameRGBA`]
//! 5. **Recorders**: each active session captures the frame, or finalizes once past its window
//!
//! Several recorders may share one entity; each owns its session, encoder, subscriptions and
//! tween trigger, so their timelines never interfere.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod config;
mod encode;
mod foundation;
mod recorder;
mod render;
mod scene;

pub use animation::ease::Ease;
pub use animation::tween::{Endpoint, Signal, Tween, TweenProperty, TweenSpec};
pub use config::options::{EndpointPair, RecorderOptions, RecordingConfig, VecInput};
pub use config::scene_file::{CameraEntry, LoadedScene, SceneFile};
pub use encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use encode::gif::GifEncoder;
pub use encode::sink::{
    DEFAULT_OUTPUT_NAME, EncoderCall, EncoderLog, EncoderSettings, FrameEncoder, InMemoryEncoder,
    OutputFormat, create_encoder,
};
pub use foundation::core::{Canvas, EntityId, EulerRot, Quat, RecorderId, Transform3D, Vec3};
pub use foundation::error::{RecorderError, RecorderResult};
pub use foundation::math::parse_vec3;
pub use recorder::constraint::CameraConstraint;
pub use recorder::controller::{FinishReport, RecordingController, StartOutcome, TickOutcome};
pub use recorder::session::{RecordingSession, SessionStatus};
pub use render::backend::{
    BackendKind, CameraView, FrameRGBA, Marker, RenderBackend, RenderInput, RenderSettings,
    create_backend,
};
pub use render::cpu::CpuRasterizer;
pub use scene::controls::{
    Button, ButtonAction, ButtonId, ControlPanel, FAILED_LABEL, PREVIEW_LABEL, PROCESSING_LABEL,
    RECORD_LABEL,
};
pub use scene::entity::{Camera, Entity, InputControls};
pub use scene::events::{EventBus, Subscription, TriggerEvent};
pub use scene::world::{Scene, SceneFlags, TickReport};
