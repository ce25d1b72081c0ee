use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::options::{RecorderOptions, RecordingConfig};
use crate::encode::sink::{DEFAULT_OUTPUT_NAME, create_encoder};
use crate::foundation::core::{Canvas, EntityId, RecorderId, Transform3D, Vec3};
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::render::backend::{BackendKind, Marker, RenderSettings, create_backend};
use crate::scene::entity::Camera;
use crate::scene::world::Scene;

/// Camera entity of a scene file.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CameraEntry {
    /// Initial world position.
    #[serde(default)]
    pub position: Vec3,
    /// Initial Euler rotation in degrees.
    #[serde(default)]
    pub rotation: Vec3,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
}

impl Default for CameraEntry {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov: default_fov(),
        }
    }
}

fn default_fov() -> f32 {
    Camera::default().fov_y_deg
}

fn default_background() -> [u8; 4] {
    [18, 20, 28, 255]
}

/// JSON scene description: canvas, camera rig, markers and the recorders attached to the rig.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SceneFile {
    /// Output raster size.
    pub canvas: Canvas,
    /// Clear color, straight RGBA8.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    /// Camera rig.
    #[serde(default)]
    pub camera: CameraEntry,
    /// Markers to draw.
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Recorder instances attached to the camera rig, in attach order.
    #[serde(default)]
    pub recorders: Vec<RecorderOptions>,
}

/// A scene built from a [`SceneFile`].
pub struct LoadedScene {
    /// The scene.
    pub scene: Scene,
    /// Camera rig entity.
    pub camera: EntityId,
    /// Attached recorders, in file order.
    pub recorders: Vec<RecorderId>,
}

impl SceneFile {
    /// Parse a scene description from JSON text.
    pub fn from_json(text: &str) -> RecorderResult<Self> {
        serde_json::from_str(text).map_err(|e| RecorderError::config(e.to_string()))
    }

    /// Read and parse a scene description file.
    pub fn load(path: &Path) -> RecorderResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene file '{}'", path.display()))?;
        Self::from_json(&text).map_err(|e| match e {
            RecorderError::Config(msg) => {
                RecorderError::config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Build the scene, attaching one recorder per entry with encoders writing into `out_dir`.
    ///
    /// With several recorders, an unnamed one writes `camera-recording-<index>` so that every
    /// completed recording gets its own file. Two recorders resolving to the same output path
    /// are rejected.
    #[tracing::instrument(skip(self, out_dir))]
    pub fn build(&self, out_dir: impl Into<PathBuf>) -> RecorderResult<LoadedScene> {
        let out_dir = out_dir.into();
        if !(self.camera.fov.is_finite() && self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(RecorderError::validation(format!(
                "camera fov must be within (0, 180) degrees, got {}",
                self.camera.fov
            )));
        }
        let configs = self.recorder_configs(&out_dir)?;

        let settings = RenderSettings {
            canvas: Canvas::new(self.canvas.width, self.canvas.height)?,
            clear_rgba: self.background,
        };
        let mut scene = Scene::new(create_backend(BackendKind::Cpu, &settings)?);

        let camera = scene.spawn_camera(
            "camera",
            Transform3D::from_position_rotation(self.camera.position, self.camera.rotation),
            Camera {
                fov_y_deg: self.camera.fov,
                ..Camera::default()
            },
        );
        for marker in &self.markers {
            scene.add_marker(*marker);
        }

        let mut recorders = Vec::with_capacity(self.recorders.len());
        for (idx, config) in configs.into_iter().enumerate() {
            let encoder = create_encoder(config.encoder_settings(&out_dir))?;
            let id = scene.attach_recorder(camera, config, encoder)?;
            tracing::debug!(index = idx, recorder = %id, "scene recorder attached");
            recorders.push(id);
        }

        Ok(LoadedScene {
            scene,
            camera,
            recorders,
        })
    }

    fn recorder_configs(&self, out_dir: &Path) -> RecorderResult<Vec<RecordingConfig>> {
        let shared_dir = self.recorders.len() > 1;
        let mut outputs = HashSet::new();
        let mut configs = Vec::with_capacity(self.recorders.len());
        for (idx, opts) in self.recorders.iter().enumerate() {
            let mut config = opts.resolve()?;
            if shared_dir && config.output_name.trim().is_empty() {
                config.output_name = format!("{DEFAULT_OUTPUT_NAME}-{idx}");
            }
            let path = config.encoder_settings(out_dir).output_path();
            if !outputs.insert(path.clone()) {
                return Err(RecorderError::validation(format!(
                    "recorder {idx} writes '{}', already used by another recorder",
                    path.display()
                )));
            }
            configs.push(config);
        }
        Ok(configs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/scene_file.rs"]
mod tests;
