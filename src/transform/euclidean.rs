//! Rigid motions: translation, rotations and frame changes.

use std::f64::consts::PI;

use super::context::GeometricContext;
use super::error::{TransformError, TransformResult};
use crate::geom::{AffineMatrix, Plane, Point3, Vec3};

pub(crate) fn translation(offset: Vec3) -> TransformResult<AffineMatrix> {
    if !offset.is_finite() {
        return Err(TransformError::invalid_request(format!(
            "translation {offset:?} is not finite"
        )));
    }
    Ok(AffineMatrix::translation_matrix(offset))
}

pub(crate) fn axis_rotation(
    angle: f64,
    axis: Vec3,
    center: Point3,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    if !angle.is_finite() || !center.is_finite() {
        return Err(TransformError::invalid_request(format!(
            "rotation angle {angle} and center {center:?} must be finite"
        )));
    }
    let axis = checked_direction("axis", axis, ctx)?;
    rotation_about(axis, angle, center, ctx)
}

/// Shortest-arc rotation from `from` onto `to`. Anti-parallel inputs rotate by
/// π about an arbitrary axis perpendicular to `from`.
pub(crate) fn vector_rotation(
    from: Vec3,
    to: Vec3,
    center: Point3,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    if !center.is_finite() {
        return Err(TransformError::invalid_request(format!(
            "rotation center {center:?} is not finite"
        )));
    }
    let from = checked_direction("source vector", from, ctx)?;
    let to = checked_direction("target vector", to, ctx)?;

    let cross = from.cross(to);
    let sin = cross.length();
    let cos = from.dot(to);
    if sin <= ctx.angle_tol {
        if cos > 0.0 {
            return Ok(AffineMatrix::IDENTITY);
        }
        return rotation_about(from.any_orthogonal(), PI, center, ctx);
    }
    rotation_about(cross, sin.atan2(cos), center, ctx)
}

/// Maps geometry attached to `from` onto `to`.
pub(crate) fn plane_to_plane(
    from: &Plane,
    to: &Plane,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    check_basis("source", from, ctx)?;
    check_basis("target", to, ctx)?;
    Ok(to.to_world() * from.to_local())
}

/// Converts coordinates expressed in `from` into coordinates expressed in `to`.
pub(crate) fn change_basis(
    from: &Plane,
    to: &Plane,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    check_basis("source", from, ctx)?;
    check_basis("target", to, ctx)?;
    Ok(to.to_local() * from.to_world())
}

fn check_basis(which: &'static str, plane: &Plane, ctx: &GeometricContext) -> TransformResult<()> {
    match plane.defect(ctx.plane_tolerance()) {
        Some(defect) => Err(TransformError::InvalidBasisPlanes { which, defect }),
        None => Ok(()),
    }
}

/// Unit copy of `v`, rejecting non-finite or too-short vectors.
fn checked_direction(
    what: &'static str,
    v: Vec3,
    ctx: &GeometricContext,
) -> TransformResult<Vec3> {
    let length = v.length();
    let invalid = || TransformError::InvalidRotationAxis {
        what,
        vector: v,
        length,
        tolerance: ctx.abs_tol,
    };
    if !length.is_finite() || length <= ctx.abs_tol {
        return Err(invalid());
    }
    v.normalized().ok_or_else(invalid)
}

fn rotation_about(
    axis: Vec3,
    angle: f64,
    center: Point3,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    let m = AffineMatrix::rotation_matrix(axis, angle).ok_or_else(|| {
        TransformError::InvalidRotationAxis {
            what: "axis",
            vector: axis,
            length: axis.length(),
            tolerance: ctx.abs_tol,
        }
    })?;
    Ok(m.about_point(center))
}
