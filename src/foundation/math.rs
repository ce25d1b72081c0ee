use crate::foundation::core::{Mat3, Quat, Vec3};

const PARALLEL_NUDGE: f32 = 0.0001;

/// Orientation whose local `+Z` axis points from `eye` toward `target`, with `up` as the
/// reference up vector.
///
/// Returns `None` when `eye` and `target` coincide or either point is not finite.
pub(crate) fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Option<Quat> {
    if !eye.is_finite() || !target.is_finite() {
        return None;
    }

    let mut z = target - eye;
    if z.length_squared() == 0.0 {
        return None;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        // up and forward are parallel; nudge forward off the axis
        if (up.z.abs() - 1.0).abs() < f32::EPSILON {
            z.x += PARALLEL_NUDGE;
        } else {
            z.z += PARALLEL_NUDGE;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

/// Parse `"x y z"` (whitespace and/or comma separated) into a finite vector.
pub fn parse_vec3(text: &str) -> Option<Vec3> {
    let mut parts = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(str::parse::<f32>);

    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }

    let v = Vec3::new(x, y, z);
    v.is_finite().then_some(v)
}

/// `true` when `a` and `b` differ by at most `eps` on every axis.
pub(crate) fn approx_eq_vec3(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
