use crate::foundation::error::{RecorderError, RecorderResult};

pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Identifier of an entity inside a [`crate::Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// Identifier of one attached recorder instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecorderId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl std::fmt::Display for RecorderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "recorder#{}", self.0)
    }
}

/// Output raster size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas, rejecting zero-sized rasters.
    pub fn new(width: u32, height: u32) -> RecorderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RecorderError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Rigid 3D transform of an entity: world position plus orientation.
///
/// Rotations are exchanged with configuration and tweens as Euler angles in degrees
/// (`XYZ` order), but stored as a quaternion so look-at math stays exact.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform3D {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub orientation: Quat,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Transform3D {
    /// Build a transform from a position and Euler rotation in degrees.
    pub fn from_position_rotation(position: Vec3, rotation_deg: Vec3) -> Self {
        let mut t = Self {
            position,
            ..Self::default()
        };
        t.set_rotation_deg(rotation_deg);
        t
    }

    /// Current orientation as `XYZ` Euler angles in degrees.
    pub fn rotation_deg(&self) -> Vec3 {
        let (x, y, z) = self.orientation.to_euler(EulerRot::XYZ);
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    /// Replace the orientation with `XYZ` Euler angles in degrees.
    pub fn set_rotation_deg(&mut self, rotation_deg: Vec3) {
        self.orientation = Quat::from_euler(
            EulerRot::XYZ,
            rotation_deg.x.to_radians(),
            rotation_deg.y.to_radians(),
            rotation_deg.z.to_radians(),
        );
    }
}
