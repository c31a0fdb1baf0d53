//! Planar vector algebra and frame transforms.
//!
//! Purpose
//! - Give constraints a small, explicit vocabulary for moving points between a
//!   body's local frame and the global plane.
//! - Stay a thin layer over `nalgebra::Vector2`; no state, no allocation.
//!
//! Conventions
//! - Angles are radians, counterclockwise positive.
//! - A frame is an origin (global position) plus a rotation angle. Local
//!   positions are offsets in that rotated frame.

use nalgebra::{Rotation2, Vector2};

pub type Vec2 = Vector2<f64>;

#[inline]
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

#[inline]
pub fn subtract(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

#[inline]
pub fn scale(v: Vec2, k: f64) -> Vec2 {
    v * k
}

#[inline]
pub fn magnitude(v: Vec2) -> f64 {
    v.norm()
}

/// Rotate `v` counterclockwise by `angle`.
#[inline]
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    Rotation2::new(angle) * v
}

/// Unit vector along `v`; the zero vector maps to itself.
#[inline]
pub fn unit(v: Vec2) -> Vec2 {
    let norm = v.norm();
    if norm == 0.0 || !norm.is_finite() {
        Vec2::zeros()
    } else {
        v / norm
    }
}

/// Vector of length `magnitude` pointing along `direction` (radians).
#[inline]
pub fn from_polar(magnitude: f64, direction: f64) -> Vec2 {
    Vec2::new(magnitude * direction.cos(), magnitude * direction.sin())
}

/// `(magnitude, direction)` of `v`; direction of the zero vector is 0.
#[inline]
pub fn to_polar(v: Vec2) -> (f64, f64) {
    (v.norm(), v.y.atan2(v.x))
}

/// Global position of a point given in the frame `(origin, rotation)`.
#[inline]
pub fn local_to_global_position(local: Vec2, origin: Vec2, rotation: f64) -> Vec2 {
    origin + rotate(local, rotation)
}

/// Inverse of [`local_to_global_position`].
#[inline]
pub fn global_to_local_position(global: Vec2, origin: Vec2, rotation: f64) -> Vec2 {
    rotate(global - origin, -rotation)
}

/// Free vectors ignore the origin; only the rotation applies.
#[inline]
pub fn local_to_global_vector(local: Vec2, rotation: f64) -> Vec2 {
    rotate(local, rotation)
}

#[inline]
pub fn global_to_local_vector(global: Vec2, rotation: f64) -> Vec2 {
    rotate(global, -rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn rotate_quarter_turn() {
        let r = rotate(vector![1.0, 0.0], FRAC_PI_2);
        assert!((r - vector![0.0, 1.0]).norm() < 1e-12);
        let back = rotate(r, -FRAC_PI_2);
        assert!((back - vector![1.0, 0.0]).norm() < 1e-12);
    }

    #[test]
    fn unit_of_zero_is_zero() {
        assert_eq!(unit(Vec2::zeros()), Vec2::zeros());
        let u = unit(vector![3.0, 4.0]);
        assert!((magnitude(u) - 1.0).abs() < 1e-12);
        assert!((u - vector![0.6, 0.8]).norm() < 1e-12);
    }

    #[test]
    fn polar_conversion_matches_components() {
        let v = from_polar(2.0, PI / 3.0);
        let (m, d) = to_polar(v);
        assert!((m - 2.0).abs() < 1e-12);
        assert!((d - PI / 3.0).abs() < 1e-12);
        assert_eq!(to_polar(Vec2::zeros()), (0.0, 0.0));
    }

    #[test]
    fn frame_transforms_are_inverse_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let p = Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
            let o = Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
            let th = rng.gen_range(-PI..PI);
            let g = local_to_global_position(p, o, th);
            assert!((global_to_local_position(g, o, th) - p).norm() < 1e-12);
            let gv = local_to_global_vector(p, th);
            assert!((global_to_local_vector(gv, th) - p).norm() < 1e-12);
            assert!((magnitude(gv) - magnitude(p)).abs() < 1e-12);
        }
    }

    #[test]
    fn anchor_on_rotated_body() {
        // Body at (2, 1) turned 90°: local (1, 0) lands one unit above the center.
        let g = local_to_global_position(vector![1.0, 0.0], vector![2.0, 1.0], FRAC_PI_2);
        assert!((g - vector![2.0, 2.0]).norm() < 1e-12);
        assert_eq!(add(vector![1.0, 2.0], vector![3.0, 4.0]), vector![4.0, 6.0]);
        assert_eq!(subtract(vector![1.0, 2.0], vector![3.0, 4.0]), vector![-2.0, -2.0]);
        assert_eq!(scale(vector![1.0, -2.0], 3.0), vector![3.0, -6.0]);
    }
}
