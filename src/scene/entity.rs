use crate::animation::tween::{Signal, Tween, TweenProperty};
use crate::foundation::core::{EntityId, Quat, Transform3D, Vec3};
use crate::foundation::math::look_rotation;
use crate::render::backend::CameraView;

/// Camera attached to an entity.
///
/// The camera looks down its local `-Z`. `base_yaw_rad` rotates the camera relative to its
/// entity; look-at recorders set it to half a turn because the entity's `+Z` is what points at
/// the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Yaw of the camera relative to its entity, in radians.
    pub base_yaw_rad: f32,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            base_yaw_rad: 0.0,
            fov_y_deg: 80.0,
            near: 0.005,
            far: 10_000.0,
        }
    }
}

/// Manual input controllers that would fight a scripted camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputControls {
    /// Mouse/touch look controls.
    pub look: bool,
    /// Keyboard movement controls.
    pub movement: bool,
}

impl Default for InputControls {
    fn default() -> Self {
        Self {
            look: true,
            movement: true,
        }
    }
}

/// A scene object with a transform, an optional camera and the tweens driving it.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    /// Human-readable name.
    pub name: String,
    /// World transform.
    pub transform: Transform3D,
    /// Attached camera, if any.
    pub camera: Option<Camera>,
    /// Manual input controllers.
    pub controls: InputControls,
    tweens: Vec<Tween>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>, transform: Transform3D) -> Self {
        Self {
            id,
            name: name.into(),
            transform,
            camera: None,
            controls: InputControls::default(),
            tweens: Vec::new(),
        }
    }

    /// Entity id.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Tweens registered on this entity.
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Register a tween, replacing one with the same property and trigger.
    pub fn set_tween(&mut self, tween: Tween) {
        let key = (tween.spec().property, tween.spec().trigger);
        match self
            .tweens
            .iter_mut()
            .find(|t| (t.spec().property, t.spec().trigger) == key)
        {
            Some(slot) => *slot = tween,
            None => self.tweens.push(tween),
        }
    }

    /// Drop every tween started by `trigger`.
    pub fn remove_tweens(&mut self, trigger: Signal) {
        self.tweens.retain(|t| t.spec().trigger != trigger);
    }

    /// Emit `signal` on this entity; returns how many tweens it started.
    pub fn emit(&mut self, signal: Signal) -> usize {
        self.tweens
            .iter_mut()
            .map(|t| t.trigger(signal))
            .filter(|started| *started)
            .count()
    }

    /// Advance running tweens and write their values into the transform.
    pub fn advance_tweens(&mut self, delta_ms: f64) {
        for tween in &mut self.tweens {
            let Some(value) = tween.advance(delta_ms) else {
                continue;
            };
            match tween.spec().property {
                TweenProperty::Position => self.transform.position = value,
                TweenProperty::Rotation => self.transform.set_rotation_deg(value),
            }
        }
    }

    /// Turn the entity so its `+Z` faces `target`. Returns `false` when no orientation exists
    /// (target at the entity position or not finite).
    pub fn look_at(&mut self, target: Vec3) -> bool {
        match look_rotation(self.transform.position, target, Vec3::Y) {
            Some(q) => {
                self.transform.orientation = q;
                true
            }
            None => false,
        }
    }

    /// World orientation of the attached camera.
    pub fn camera_orientation(&self) -> Option<Quat> {
        let cam = self.camera?;
        Some(self.transform.orientation * Quat::from_rotation_y(cam.base_yaw_rad))
    }

    /// World-space view direction of the attached camera.
    pub fn camera_forward(&self) -> Option<Vec3> {
        Some(self.camera_orientation()? * Vec3::NEG_Z)
    }

    /// Render view of the attached camera.
    pub fn camera_view(&self) -> Option<CameraView> {
        let cam = self.camera?;
        Some(CameraView {
            position: self.transform.position,
            orientation: self.camera_orientation()?,
            fov_y_deg: cam.fov_y_deg,
            near: cam.near,
            far: cam.far,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/entity.rs"]
mod tests;
