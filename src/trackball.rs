//! Classic quaternion trackball: 2D drag deltas on the window map to
//! rotations of a virtual ball centered on the screen.

use nalgebra::UnitQuaternion;

use crate::geometry::{FloatType, SubPixelPoint, WorldVector};

/// Radius of the virtual ball in normalized window coordinates.
const TRACKBALL_SIZE: FloatType = 0.8;

/// Height of the trackball surface above the window plane at `(x, y)`.
///
/// Inside `r / sqrt(2)` of the center this is a sphere; outside it blends
/// to a hyperbolic sheet so the mapping stays continuous all the way to
/// the window corners.
fn project_to_sphere(radius: FloatType, x: FloatType, y: FloatType) -> FloatType {
    let d = (x * x + y * y).sqrt();
    if d < radius * std::f32::consts::FRAC_1_SQRT_2 {
        (radius * radius - d * d).sqrt()
    } else {
        let t = radius * std::f32::consts::FRAC_1_SQRT_2;
        t * t / d
    }
}

/// Rotation corresponding to a drag from `p1` to `p2`, both in normalized
/// window coordinates (roughly [-1, 1], y up). A zero-length drag is the
/// identity.
pub(crate) fn drag_rotation(p1: SubPixelPoint, p2: SubPixelPoint) -> UnitQuaternion<FloatType> {
    if p1 == p2 {
        return UnitQuaternion::identity();
    }

    let a = WorldVector::new(p1.x, p1.y, project_to_sphere(TRACKBALL_SIZE, p1.x, p1.y));
    let b = WorldVector::new(p2.x, p2.y, project_to_sphere(TRACKBALL_SIZE, p2.x, p2.y));

    let axis = b.cross(&a);
    let axis_norm = axis.norm();
    if axis_norm == 0.0 {
        return UnitQuaternion::identity();
    }

    let t = ((a - b).norm() / (2.0 * TRACKBALL_SIZE)).clamp(-1.0, 1.0);
    let phi = 2.0 * t.asin();

    UnitQuaternion::from_scaled_axis(axis * (phi / axis_norm))
}
