//! Unit quaternions for the rotation part of a TRS decomposition.

use serde::{Deserialize, Serialize};

use super::{Mat3, Vec3};

/// Dot product above which SLERP degrades to a normalized lerp.
const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

/// Rotation quaternion stored as `(w, x, y, z)`.
///
/// Quaternions produced by this crate are normalized; quaternions supplied by a
/// caller are used as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle` radians about `axis`. `None` for a degenerate axis.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Option<Self> {
        let axis = axis.normalized()?;
        let (s, c) = (angle * 0.5).sin_cos();
        Some(Self::new(c, axis.x * s, axis.y * s, axis.z * s))
    }

    /// Extract a quaternion from a rotation matrix with the trace-based method.
    ///
    /// When the trace is positive the `w` term dominates and is solved first.
    /// Otherwise the largest diagonal element selects which imaginary component
    /// to solve first, which keeps the divisor away from zero for rotations
    /// close to 180°. The result is not normalized, so callers can measure how
    /// far the input was from a proper rotation.
    #[must_use]
    pub fn from_rotation_unnormalized(r: &Mat3) -> Self {
        let (r00, r11, r22) = (r.get(0, 0), r.get(1, 1), r.get(2, 2));
        let trace = r00 + r11 + r22;

        if trace > 0.0 {
            let s = 2.0 * (trace + 1.0).sqrt();
            Self::new(
                0.25 * s,
                (r.get(2, 1) - r.get(1, 2)) / s,
                (r.get(0, 2) - r.get(2, 0)) / s,
                (r.get(1, 0) - r.get(0, 1)) / s,
            )
        } else if r00 > r11 && r00 > r22 {
            let s = 2.0 * (1.0 + r00 - r11 - r22).sqrt();
            Self::new(
                (r.get(2, 1) - r.get(1, 2)) / s,
                0.25 * s,
                (r.get(0, 1) + r.get(1, 0)) / s,
                (r.get(0, 2) + r.get(2, 0)) / s,
            )
        } else if r11 > r22 {
            let s = 2.0 * (1.0 + r11 - r00 - r22).sqrt();
            Self::new(
                (r.get(0, 2) - r.get(2, 0)) / s,
                (r.get(0, 1) + r.get(1, 0)) / s,
                0.25 * s,
                (r.get(1, 2) + r.get(2, 1)) / s,
            )
        } else {
            let s = 2.0 * (1.0 + r22 - r00 - r11).sqrt();
            Self::new(
                (r.get(1, 0) - r.get(0, 1)) / s,
                (r.get(0, 2) + r.get(2, 0)) / s,
                (r.get(1, 2) + r.get(2, 1)) / s,
                0.25 * s,
            )
        }
    }

    /// Normalized quaternion of a rotation matrix; identity if extraction degenerates.
    #[must_use]
    pub fn from_rotation(r: &Mat3) -> Self {
        Self::from_rotation_unnormalized(r)
            .normalized()
            .unwrap_or(Self::IDENTITY)
    }

    /// Rotation matrix of this quaternion, assuming unit length.
    #[must_use]
    pub fn to_rotation(self) -> Mat3 {
        let Self { w, x, y, z } = self;
        Mat3::from_rows([
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ])
    }

    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.w * rhs.w + self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let n = self.norm();
        if n.is_finite() && n > 0.0 {
            Some(self.scaled(1.0 / n))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    #[must_use]
    pub const fn neg(self) -> Self {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }

    /// Rotation angle in `[0, π]`.
    #[must_use]
    pub fn angle(self) -> f64 {
        let v = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        2.0 * v.atan2(self.w.abs())
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// `true` when both quaternions describe the same rotation (`q` and `-q` are equal).
    #[must_use]
    pub fn same_rotation(self, rhs: Self, eps: f64) -> bool {
        (self.dot(rhs).abs() - 1.0).abs() <= eps
    }

    /// Spherical linear interpolation along the shortest arc. `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn slerp(self, rhs: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let a = self.normalized().unwrap_or(Self::IDENTITY);
        let mut b = rhs.normalized().unwrap_or(Self::IDENTITY);

        let mut cos_theta = a.dot(b);
        if cos_theta < 0.0 {
            b = b.neg();
            cos_theta = -cos_theta;
        }

        if cos_theta > SLERP_LINEAR_THRESHOLD {
            return a.lerp_raw(b, t).normalized().unwrap_or(a);
        }

        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let sin_theta = theta.sin();
        let wa = ((1.0 - t) * theta).sin() / sin_theta;
        let wb = (t * theta).sin() / sin_theta;
        Self::new(
            wa * a.w + wb * b.w,
            wa * a.x + wb * b.x,
            wa * a.y + wb * b.y,
            wa * a.z + wb * b.z,
        )
    }

    fn lerp_raw(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.w + (rhs.w - self.w) * t,
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
            self.z + (rhs.z - self.z) * t,
        )
    }

    fn scaled(self, s: f64) -> Self {
        Self::new(self.w * s, self.x * s, self.y * s, self.z * s)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}
