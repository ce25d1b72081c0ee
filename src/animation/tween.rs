use crate::animation::ease::Ease;
use crate::foundation::core::{RecorderId, Vec3};

/// Entity property a tween drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    /// World position.
    Position,
    /// Orientation as `XYZ` Euler degrees.
    Rotation,
}

/// Signals emitted on an entity that tweens can be started by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Emitted by a recorder instance when it starts (real or dry run).
    AnimationBegin(RecorderId),
}

/// How one tween endpoint was decided at attach time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endpoint {
    /// Supplied by the caller; always wins.
    Explicit(Vec3),
    /// Not supplied; the entity's transform captured once when the recorder attached.
    SnapshotAtAttach(Vec3),
    /// No tween for this property.
    Unset,
}

impl Endpoint {
    /// Decide the `from` endpoint of a property.
    ///
    /// `to_present` gates the whole tween: without a `to` value there is nothing to animate.
    pub fn decide_from(explicit: Option<Vec3>, to_present: bool, current: Vec3) -> Self {
        match (to_present, explicit) {
            (false, _) => Self::Unset,
            (true, Some(v)) => Self::Explicit(v),
            (true, None) => Self::SnapshotAtAttach(current),
        }
    }

    /// Resolved value, if any.
    pub fn value(self) -> Option<Vec3> {
        match self {
            Self::Explicit(v) | Self::SnapshotAtAttach(v) => Some(v),
            Self::Unset => None,
        }
    }
}

/// Static description of a tween.
#[derive(Clone, Debug, PartialEq)]
pub struct TweenSpec {
    /// Driven property.
    pub property: TweenProperty,
    /// Start value.
    pub from: Vec3,
    /// End value.
    pub to: Vec3,
    /// Time after the trigger before interpolation begins; the property holds `from` meanwhile.
    pub delay_ms: f64,
    /// Interpolation duration.
    pub duration_ms: f64,
    /// Progress curve.
    pub ease: Ease,
    /// Signal that starts (or restarts) the tween.
    pub trigger: Signal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TweenState {
    Idle,
    Running { elapsed_ms: f64 },
    Done,
}

/// A vector tween that only runs after its trigger signal is emitted on its entity.
#[derive(Clone, Debug)]
pub struct Tween {
    spec: TweenSpec,
    state: TweenState,
}

impl Tween {
    /// Create an idle tween.
    pub fn new(spec: TweenSpec) -> Self {
        Self {
            spec,
            state: TweenState::Idle,
        }
    }

    /// The tween description.
    pub fn spec(&self) -> &TweenSpec {
        &self.spec
    }

    /// `true` between the trigger and the end of the duration.
    pub fn is_running(&self) -> bool {
        matches!(self.state, TweenState::Running { .. })
    }

    /// `true` once the tween has reached its end value.
    pub fn is_done(&self) -> bool {
        self.state == TweenState::Done
    }

    /// Start the tween from the beginning if `signal` is its trigger.
    pub fn trigger(&mut self, signal: Signal) -> bool {
        if signal != self.spec.trigger {
            return false;
        }
        self.state = TweenState::Running { elapsed_ms: 0.0 };
        true
    }

    /// Advance a running tween and return the value to apply this tick.
    ///
    /// Idle and finished tweens return `None` and leave the property untouched.
    pub fn advance(&mut self, delta_ms: f64) -> Option<Vec3> {
        let TweenState::Running { elapsed_ms } = self.state else {
            return None;
        };

        let elapsed_ms = elapsed_ms + delta_ms.max(0.0);
        let value = self.sample(elapsed_ms);
        self.state = if elapsed_ms >= self.spec.delay_ms + self.spec.duration_ms {
            TweenState::Done
        } else {
            TweenState::Running { elapsed_ms }
        };
        Some(value)
    }

    /// Value at `elapsed_ms` after the trigger.
    pub fn sample(&self, elapsed_ms: f64) -> Vec3 {
        let active = elapsed_ms - self.spec.delay_ms;
        let t = if active <= 0.0 {
            0.0
        } else if self.spec.duration_ms <= 0.0 {
            1.0
        } else {
            active / self.spec.duration_ms
        };
        let te = self.spec.ease.apply(t) as f32;
        self.spec.from.lerp(self.spec.to, te)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
