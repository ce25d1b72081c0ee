/// Easing curve applied to the normalized tween progress.
///
/// Recorder tweens default to [`Ease::Linear`] so the camera moves at constant speed through
/// the recording window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    /// Constant speed.
    #[default]
    Linear,
    /// Quadratic acceleration from rest.
    InQuad,
    /// Quadratic deceleration to rest.
    OutQuad,
    /// Quadratic ease in and out.
    InOutQuad,
    /// Cubic ease in and out.
    InOutCubic,
    /// Sinusoidal ease in and out.
    InOutSine,
}

impl Ease {
    /// Map progress `t` in `[0, 1]` to eased progress; inputs outside the range are clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u.powi(3) + 1.0
                }
            }
            Self::InOutSine => 0.5 * (1.0 - (std::f64::consts::PI * t).cos()),
        }
    }
}
