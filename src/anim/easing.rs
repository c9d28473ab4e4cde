//! Damped-approach easing.
//!
//! Every continuous property in the book (joint rotations, node positions,
//! emissive highlight) moves toward its target through the same
//! exponential-damping step, so nothing ever pops.

use glam::Vec3;
use std::f32::consts::PI;

/// Step `current` toward `target` with time constant `tau` (seconds).
///
/// `next = current + (target - current) * (1 - e^(-dt / tau))`
///
/// A single positive step never overshoots; repeated steps converge.
/// A non-positive `tau` snaps to the target.
pub fn damp(current: f32, target: f32, tau: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    if tau <= 0.0 {
        return target;
    }
    current + (target - current) * (1.0 - (-dt / tau).exp())
}

/// Like [`damp`], but along the shortest angular path.
pub fn damp_angle(current: f32, target: f32, tau: f32, dt: f32) -> f32 {
    current + (wrap_angle(target - current)) * damp_fraction(tau, dt)
}

/// Damp each component of a vector independently.
pub fn damp_vec3(current: Vec3, target: Vec3, tau: f32, dt: f32) -> Vec3 {
    current + (target - current) * damp_fraction(tau, dt)
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

fn damp_fraction(tau: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if tau <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt / tau).exp()
}
