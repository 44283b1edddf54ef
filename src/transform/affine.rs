//! Non-rigid affine requests: raw matrices, scales, mirror, shear and projection.

use std::f64::consts::FRAC_PI_2;

use super::context::GeometricContext;
use super::error::{TransformError, TransformResult};
use crate::geom::{AffineMatrix, Mat3, Plane, Point3, Vec3};

/// Smallest accepted scale factor.
pub const MIN_SCALE_FACTOR: f64 = 1e-6;
/// Largest accepted scale factor.
pub const MAX_SCALE_FACTOR: f64 = 1e6;

/// Shear directions closer than this multiple of `angle_tol` to the plane
/// normal are rejected.
const SHEAR_PARALLEL_FACTOR: f64 = 10.0;

pub(crate) fn raw_matrix(
    m: &AffineMatrix,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    if !m.is_finite() {
        return Err(TransformError::InvalidTransformMatrix {
            determinant: f64::NAN,
            reason: "matrix has non-finite entries",
        });
    }
    let bottom = m.as_rows()[3];
    let affine_bottom = [0.0, 0.0, 0.0, 1.0];
    if bottom
        .iter()
        .zip(affine_bottom)
        .any(|(a, b)| (a - b).abs() > ctx.abs_tol)
    {
        return Err(TransformError::InvalidTransformMatrix {
            determinant: m.determinant(),
            reason: "bottom row is not [0, 0, 0, 1]",
        });
    }
    let determinant = m.determinant();
    if determinant.abs() <= ctx.abs_tol {
        return Err(TransformError::InvalidTransformMatrix {
            determinant,
            reason: "matrix is singular",
        });
    }
    Ok(*m)
}

pub(crate) fn uniform_scale(anchor: Point3, factor: f64) -> TransformResult<AffineMatrix> {
    if !anchor.is_finite() {
        return Err(TransformError::invalid_request(format!(
            "scale anchor {anchor:?} is not finite"
        )));
    }
    check_factor("uniform", factor)?;
    Ok(AffineMatrix::scale_matrix(factor, factor, factor).about_point(anchor))
}

pub(crate) fn non_uniform_scale(
    plane: &Plane,
    sx: f64,
    sy: f64,
    sz: f64,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    if let Some(defect) = plane.defect(ctx.plane_tolerance()) {
        return Err(TransformError::InvalidScalePlane(defect));
    }
    check_factor("x", sx)?;
    check_factor("y", sy)?;
    check_factor("z", sz)?;
    Ok(plane.to_world() * AffineMatrix::scale_matrix(sx, sy, sz) * plane.to_local())
}

/// Reflection across the plane: `x' = x - 2((x - o)·n)n`.
pub(crate) fn mirror(plane: &Plane, ctx: &GeometricContext) -> TransformResult<AffineMatrix> {
    if let Some(defect) = plane.defect(ctx.plane_tolerance()) {
        return Err(TransformError::InvalidMirrorPlane(defect));
    }
    let n = plane.normal();
    let offset = plane.origin.to_vec3().dot(n);
    let linear = Mat3::IDENTITY + Mat3::outer(n, n).scale(-2.0);
    Ok(AffineMatrix::from_linear(linear, n * (2.0 * offset)))
}

/// Orthogonal projection onto the plane: `x' = x - ((x - o)·n)n`.
pub(crate) fn project(plane: &Plane, ctx: &GeometricContext) -> TransformResult<AffineMatrix> {
    if let Some(defect) = plane.defect(ctx.plane_tolerance()) {
        return Err(TransformError::InvalidProjectionPlane(defect));
    }
    let n = plane.normal();
    let offset = plane.origin.to_vec3().dot(n);
    let linear = Mat3::IDENTITY + Mat3::outer(n, n).scale(-1.0);
    Ok(AffineMatrix::from_linear(linear, n * offset))
}

/// Shear parallel to the plane: `x' = x + tan(angle)((x - o)·n)d` where `d` is
/// `direction` projected into the plane and normalized.
pub(crate) fn shear(
    plane: &Plane,
    direction: Vec3,
    angle: f64,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    let invalid = |reason| TransformError::InvalidShearParameters {
        direction,
        angle,
        reason,
    };

    if plane.defect(ctx.plane_tolerance()).is_some() {
        return Err(invalid("shear plane is malformed"));
    }
    if !direction.is_finite() || !angle.is_finite() {
        return Err(invalid("direction and angle must be finite"));
    }
    if direction.length() <= ctx.abs_tol {
        return Err(invalid("direction is too short"));
    }

    let n = plane.normal();
    let parallel_limit = SHEAR_PARALLEL_FACTOR * ctx.angle_tol;
    let to_normal = direction.angle_to(n).unwrap_or(0.0);
    if to_normal < parallel_limit || to_normal > std::f64::consts::PI - parallel_limit {
        return Err(invalid("direction is parallel to the plane normal"));
    }
    if angle.abs() >= FRAC_PI_2 - ctx.angle_tol {
        return Err(invalid("angle must lie strictly inside (-π/2, π/2)"));
    }

    let d = (direction - n * direction.dot(n))
        .normalized()
        .ok_or_else(|| invalid("direction is parallel to the plane normal"))?;
    let k = angle.tan();
    let offset = plane.origin.to_vec3().dot(n);
    let linear = Mat3::IDENTITY + Mat3::outer(d, n).scale(k);
    Ok(AffineMatrix::from_linear(linear, d * (-k * offset)))
}

fn check_factor(axis: &'static str, factor: f64) -> TransformResult<()> {
    if (MIN_SCALE_FACTOR..=MAX_SCALE_FACTOR).contains(&factor) {
        Ok(())
    } else {
        Err(TransformError::InvalidScaleFactor {
            axis,
            factor,
            min: MIN_SCALE_FACTOR,
            max: MAX_SCALE_FACTOR,
        })
    }
}
