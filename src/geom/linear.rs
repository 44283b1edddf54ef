//! 3x3 linear block of an affine matrix.
//!
//! The decomposer works almost entirely on this block: column norms, polar
//! refinement and quaternion extraction all operate on `Mat3` values.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

use super::Vec3;

/// Row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    m: [[f64; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const ZERO: Self = Self { m: [[0.0; 3]; 3] };

    #[must_use]
    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    #[must_use]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self {
            m: [[c0.x, c1.x, c2.x], [c0.y, c1.y, c2.y], [c0.z, c1.z, c2.z]],
        }
    }

    #[must_use]
    pub const fn from_diagonal(d: Vec3) -> Self {
        Self {
            m: [[d.x, 0.0, 0.0], [0.0, d.y, 0.0], [0.0, 0.0, d.z]],
        }
    }

    /// Outer product `a * bᵀ`.
    #[must_use]
    pub const fn outer(a: Vec3, b: Vec3) -> Self {
        Self {
            m: [
                [a.x * b.x, a.x * b.y, a.x * b.z],
                [a.y * b.x, a.y * b.y, a.y * b.z],
                [a.z * b.x, a.z * b.y, a.z * b.z],
            ],
        }
    }

    #[must_use]
    pub const fn rows(&self) -> [[f64; 3]; 3] {
        self.m
    }

    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> f64 {
        self.m[row][col]
    }

    #[must_use]
    pub const fn col(&self, i: usize) -> Vec3 {
        Vec3::new(self.m[0][i], self.m[1][i], self.m[2][i])
    }

    #[must_use]
    pub const fn cols(&self) -> [Vec3; 3] {
        [self.col(0), self.col(1), self.col(2)]
    }

    /// Copy of `self` with column `i` replaced.
    #[must_use]
    pub const fn with_col(mut self, i: usize, c: Vec3) -> Self {
        self.m[0][i] = c.x;
        self.m[1][i] = c.y;
        self.m[2][i] = c.z;
        self
    }

    #[must_use]
    pub const fn transpose(&self) -> Self {
        let m = &self.m;
        Self {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    #[must_use]
    pub fn trace(&self) -> f64 {
        self.m[0][0] + self.m[1][1] + self.m[2][2]
    }

    #[must_use]
    pub fn diagonal(&self) -> Vec3 {
        Vec3::new(self.m[0][0], self.m[1][1], self.m[2][2])
    }

    /// Inverse via the adjugate. `None` when `|det| <= min_det` or non-finite.
    #[must_use]
    pub fn inverse(&self, min_det: f64) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= min_det {
            return None;
        }
        Some(self.inverse_transpose_unchecked(det).transpose())
    }

    /// `(M⁻¹)ᵀ`, i.e. the cofactor matrix divided by the determinant.
    #[must_use]
    pub fn inverse_transpose(&self, min_det: f64) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= min_det {
            return None;
        }
        Some(self.inverse_transpose_unchecked(det))
    }

    fn inverse_transpose_unchecked(&self, det: f64) -> Self {
        let m = &self.m;
        let inv = 1.0 / det;
        Self {
            m: [
                [
                    (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
                    -(m[1][0] * m[2][2] - m[1][2] * m[2][0]) * inv,
                    (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
                ],
                [
                    -(m[0][1] * m[2][2] - m[0][2] * m[2][1]) * inv,
                    (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
                    -(m[0][0] * m[2][1] - m[0][1] * m[2][0]) * inv,
                ],
                [
                    (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
                    -(m[0][0] * m[1][2] - m[0][2] * m[1][0]) * inv,
                    (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
                ],
            ],
        }
    }

    #[must_use]
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        let mut m = self.m;
        m.iter_mut().flatten().for_each(|v| *v *= s);
        Self { m }
    }

    /// Right-multiply by `diag(s)`, scaling each column.
    #[must_use]
    pub fn scale_cols(&self, s: Vec3) -> Self {
        let [c0, c1, c2] = self.cols();
        Self::from_cols(c0 * s.x, c1 * s.y, c2 * s.z)
    }

    #[must_use]
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add for Mat3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let mut m = self.m;
        for (row, rhs_row) in m.iter_mut().zip(rhs.m.iter()) {
            for (a, b) in row.iter_mut().zip(rhs_row.iter()) {
                *a += b;
            }
        }
        Self { m }
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.m[i][0] * rhs.m[0][j]
                    + self.m[i][1] * rhs.m[1][j]
                    + self.m[i][2] * rhs.m[2][j];
            }
        }
        Self { m }
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        self.mul_vec(rhs)
    }
}
