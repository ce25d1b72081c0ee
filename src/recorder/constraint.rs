use crate::foundation::core::Vec3;
use crate::scene::entity::Entity;

/// Per-tick look-at override: turns the camera entity toward a fixed world point.
///
/// Runs whether or not a recording is active, after tweens and before rendering, so it always
/// wins over a rotation tween.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraConstraint {
    target: Option<Vec3>,
}

impl CameraConstraint {
    /// Constraint toward `target`; a non-finite target disables it.
    pub fn new(target: Option<Vec3>) -> Self {
        Self {
            target: target.filter(|t| t.is_finite()),
        }
    }

    /// Configured target.
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// `true` when a target is configured.
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// Orient `entity` toward the target. Returns whether the entity was mutated.
    pub fn on_tick(&self, entity: &mut Entity) -> bool {
        match self.target {
            Some(target) => entity.look_at(target),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/recorder/constraint.rs"]
mod tests;
