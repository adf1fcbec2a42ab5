//! Vector helpers for world-space positions and directions.
//!
//! The host world is Y-up. Formation rotations happen in the horizontal
//! (XZ) plane, i.e. about the vertical axis.

pub use glam::Vec3;

/// Fallback direction used when a caller supplies a zero vector.
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Rotates `v` about the vertical axis by `radians`, leaving Y untouched.
#[must_use]
pub fn rotate_about_y(v: Vec3, radians: f32) -> Vec3 {
    let (sin, cos) = radians.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Horizontal unit vector perpendicular to `v`.
///
/// A vertical or zero `v` has no horizontal component; the perpendicular of
/// [`FORWARD`] is used instead.
#[must_use]
pub fn horizontal_perpendicular(v: Vec3) -> Vec3 {
    let heading = horizontal_heading(v);
    Vec3::new(-heading.z, 0.0, heading.x)
}

/// Unit direction of `v` projected onto the horizontal plane, or
/// [`FORWARD`] when `v` is vertical or zero.
#[must_use]
pub fn horizontal_heading(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        FORWARD
    } else {
        flat
    }
}

/// Signed angle about the vertical axis from `from` to `to`, in `[0, 2π)`.
#[must_use]
pub fn yaw_between(from: Vec3, to: Vec3) -> f32 {
    let a = from.z.atan2(from.x);
    let b = to.z.atan2(to.x);
    (b - a).rem_euclid(std::f32::consts::TAU)
}
