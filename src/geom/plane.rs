//! Oriented planes (origin plus right-handed orthonormal frame).

use serde::{Deserialize, Serialize};

use super::{AffineMatrix, Mat3, Point3, Vec3};

/// Reason a plane is not usable as a transform basis.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlaneDefect {
    #[error("plane origin or axes are not finite")]
    NonFinite,
    #[error("{axis} axis has length {length}, expected 1")]
    AxisNotUnit { axis: char, length: f64 },
    #[error("{axes} axes are not perpendicular (dot = {dot})")]
    AxesNotOrthogonal { axes: &'static str, dot: f64 },
    #[error("plane frame is left-handed (z · (x × y) = {handedness})")]
    LeftHanded { handedness: f64 },
}

/// A plane with an origin and an orthonormal frame. `z_axis` is the normal.
///
/// The constructors always produce well-formed planes. The fields are public so a
/// caller can supply arbitrary frames; those are checked with [`Plane::defect`]
/// before any matrix is built from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl Plane {
    /// World XY plane at the origin.
    #[must_use]
    pub const fn world_xy() -> Self {
        Self {
            origin: Point3::ORIGIN,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
        }
    }

    /// World YZ plane at the origin (normal +X).
    #[must_use]
    pub const fn world_yz() -> Self {
        Self {
            origin: Point3::ORIGIN,
            x_axis: Vec3::Y,
            y_axis: Vec3::Z,
            z_axis: Vec3::X,
        }
    }

    /// World ZX plane at the origin (normal +Y).
    #[must_use]
    pub const fn world_zx() -> Self {
        Self {
            origin: Point3::ORIGIN,
            x_axis: Vec3::Z,
            y_axis: Vec3::X,
            z_axis: Vec3::Y,
        }
    }

    /// Plane from an origin, an x direction and an in-plane y hint.
    ///
    /// The y hint is orthogonalized against x. Returns `None` when the
    /// directions are degenerate or parallel.
    #[must_use]
    pub fn new(origin: Point3, x_dir: Vec3, y_hint: Vec3) -> Option<Self> {
        let x_axis = x_dir.normalized()?;
        let y_axis = (y_hint - x_axis * y_hint.dot(x_axis)).normalized()?;
        let z_axis = x_axis.cross(y_axis).normalized()?;
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Plane through `origin` with the given normal; the x axis is arbitrary but deterministic.
    #[must_use]
    pub fn from_normal(origin: Point3, normal: Vec3) -> Option<Self> {
        let z_axis = normal.normalized()?;
        let x_axis = z_axis.any_orthogonal();
        let y_axis = z_axis.cross(x_axis);
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Plane through three points: origin `a`, x towards `b`, y towards `c`.
    #[must_use]
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Option<Self> {
        Self::new(a, b - a, c - a)
    }

    #[must_use]
    pub const fn normal(&self) -> Vec3 {
        self.z_axis
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin.is_finite()
            && self.x_axis.is_finite()
            && self.y_axis.is_finite()
            && self.z_axis.is_finite()
    }

    /// First defect found when checking the frame against `tol`, if any.
    #[must_use]
    pub fn defect(&self, tol: f64) -> Option<PlaneDefect> {
        if !self.is_finite() {
            return Some(PlaneDefect::NonFinite);
        }
        for (axis, v) in [('x', self.x_axis), ('y', self.y_axis), ('z', self.z_axis)] {
            let length = v.length();
            if (length - 1.0).abs() > tol {
                return Some(PlaneDefect::AxisNotUnit { axis, length });
            }
        }
        for (axes, a, b) in [
            ("x/y", self.x_axis, self.y_axis),
            ("y/z", self.y_axis, self.z_axis),
            ("z/x", self.z_axis, self.x_axis),
        ] {
            let dot = a.dot(b);
            if dot.abs() > tol {
                return Some(PlaneDefect::AxesNotOrthogonal { axes, dot });
            }
        }
        let handedness = self.z_axis.dot(self.x_axis.cross(self.y_axis));
        if handedness <= 0.0 {
            return Some(PlaneDefect::LeftHanded { handedness });
        }
        None
    }

    #[must_use]
    pub fn is_well_formed(&self, tol: f64) -> bool {
        self.defect(tol).is_none()
    }

    /// Frame matrix: maps plane-local coordinates to world coordinates.
    #[must_use]
    pub fn to_world(&self) -> AffineMatrix {
        AffineMatrix::from_frame(self.origin, self.x_axis, self.y_axis, self.z_axis)
    }

    /// Maps world coordinates to plane-local coordinates. Exact inverse of
    /// [`Plane::to_world`] for well-formed planes.
    #[must_use]
    pub fn to_local(&self) -> AffineMatrix {
        let rt = Mat3::from_cols(self.x_axis, self.y_axis, self.z_axis).transpose();
        let offset = rt.mul_vec(self.origin.to_vec3());
        AffineMatrix::from_linear(rt, -offset)
    }

    #[must_use]
    pub fn point_to_local(&self, p: Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(self.x_axis), d.dot(self.y_axis), d.dot(self.z_axis))
    }

    #[must_use]
    pub fn point_from_local(&self, local: Point3) -> Point3 {
        self.origin + self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    /// Signed distance of `p` above the plane along its normal.
    #[must_use]
    pub fn signed_distance(&self, p: Point3) -> f64 {
        (p - self.origin).dot(self.z_axis)
    }

    /// Plane mapped through `m`, re-orthonormalized. `None` if `m` collapses it.
    #[must_use]
    pub fn transform_by(&self, m: &AffineMatrix) -> Option<Self> {
        Self::new(
            m.apply_point(self.origin),
            m.apply_vec(self.x_axis),
            m.apply_vec(self.y_axis),
        )
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::world_xy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_well_formed_planes() {
        let tol = 1e-9;
        assert!(Plane::world_xy().is_well_formed(tol));
        assert!(Plane::world_yz().is_well_formed(tol));
        assert!(Plane::world_zx().is_well_formed(tol));
        let p = Plane::from_normal(Point3::new(1.0, 2.0, 3.0), Vec3::new(1.0, -2.0, 0.5)).unwrap();
        assert!(p.is_well_formed(tol));
        let q = Plane::from_points(
            Point3::ORIGIN,
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 5.0, 0.0),
        )
        .unwrap();
        assert_eq!(q.normal(), Vec3::Z);
    }

    #[test]
    fn degenerate_inputs_rejected() {
        assert!(Plane::from_normal(Point3::ORIGIN, Vec3::ZERO).is_none());
        assert!(Plane::new(Point3::ORIGIN, Vec3::X, Vec3::X * 3.0).is_none());
    }

    #[test]
    fn defects_are_reported() {
        let mut p = Plane::world_xy();
        p.x_axis = Vec3::new(2.0, 0.0, 0.0);
        assert!(matches!(p.defect(1e-9), Some(PlaneDefect::AxisNotUnit { axis: 'x', .. })));

        let mut p = Plane::world_xy();
        p.z_axis = -Vec3::Z;
        assert!(matches!(p.defect(1e-9), Some(PlaneDefect::LeftHanded { .. })));

        let mut p = Plane::world_xy();
        p.y_axis = Vec3::new(0.6, 0.8, 0.0);
        assert!(matches!(p.defect(1e-9), Some(PlaneDefect::AxesNotOrthogonal { .. })));

        let mut p = Plane::world_xy();
        p.origin.y = f64::INFINITY;
        assert_eq!(p.defect(1e-9), Some(PlaneDefect::NonFinite));
    }

    #[test]
    fn local_world_matrices_are_inverse() {
        let p = Plane::from_normal(Point3::new(4.0, -1.0, 2.0), Vec3::new(0.3, 0.4, 0.8)).unwrap();
        let product = p.to_world() * p.to_local();
        assert!(product.approx_eq(&AffineMatrix::IDENTITY, 1e-12));

        let world = Point3::new(1.0, 2.0, 3.0);
        let local = p.point_to_local(world);
        assert!(p.to_local().apply_point(world).distance_to(local) < 1e-12);
        assert!(p.point_from_local(local).distance_to(world) < 1e-12);
    }
}
