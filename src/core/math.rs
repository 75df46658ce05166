// Math utilities and helper functions

use glam::Vec2;
use rapier2d::na as nalgebra;
use rapier2d::prelude::{vector, Real, Vector};

/// Convert a rapier vector into a glam vector
pub fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Convert a glam vector into a rapier vector
pub fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

/// Check if both components of a vector are finite
pub fn is_finite_vec(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Replace a non-finite scalar with a fallback
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Replace a vector with a non-finite component by a fallback
pub fn finite_vec_or(value: Vec2, fallback: Vec2) -> Vec2 {
    if is_finite_vec(value) {
        value
    } else {
        fallback
    }
}

/// Clamp a vector's magnitude, mapping non-finite input to zero
pub fn clamp_speed(v: Vec2, max_speed: f32) -> Vec2 {
    if !is_finite_vec(v) {
        return Vec2::ZERO;
    }
    v.clamp_length_max(max_speed)
}

/// Normalize an angle into (-PI, PI]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_vector_conversion() {
        let v = Vec2::new(3.0, -4.0);
        assert_eq!(to_vec2(&to_vector(v)), v);
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or(2.0, 0.0), 2.0);
        assert_eq!(finite_or(f32::NAN, 1.0), 1.0);
        assert_eq!(finite_or(f32::INFINITY, -1.0), -1.0);
    }

    #[test]
    fn test_clamp_speed() {
        let clamped = clamp_speed(Vec2::new(300.0, 400.0), 100.0);
        assert_abs_diff_eq!(clamped.length(), 100.0, epsilon = 1e-3);
        assert_eq!(clamp_speed(Vec2::new(f32::NAN, 1.0), 100.0), Vec2::ZERO);
        assert_eq!(clamp_speed(Vec2::new(1.0, 1.0), 100.0), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_wrap_angle() {
        assert_abs_diff_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(wrap_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-6);
    }
}
