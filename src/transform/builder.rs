use super::affine;
use super::compose;
use super::context::GeometricContext;
use super::error::{TransformError, TransformResult};
use super::euclidean;
use super::operation::TransformOperation;
use crate::geom::AffineMatrix;

/// Builds the affine matrix for `op`.
///
/// Primitive operations are validated here; `Compound`, `Blend` and
/// `Interpolate` are resolved through the composer, building their operands
/// recursively.
///
/// # Errors
/// Returns the error kind matching the violated precondition of `op`, or
/// [`TransformError::InvalidTransformSpec`] when `ctx` itself is unusable.
pub fn build(op: &TransformOperation, ctx: &GeometricContext) -> TransformResult<AffineMatrix> {
    ctx.check()?;
    let m = match op {
        TransformOperation::Matrix(m) => affine::raw_matrix(m, ctx)?,
        TransformOperation::Translate(offset) => euclidean::translation(*offset)?,
        TransformOperation::UniformScale { anchor, factor } => {
            affine::uniform_scale(*anchor, *factor)?
        }
        TransformOperation::NonUniformScale { plane, sx, sy, sz } => {
            affine::non_uniform_scale(plane, *sx, *sy, *sz, ctx)?
        }
        TransformOperation::AxisRotation {
            angle,
            axis,
            center,
        } => euclidean::axis_rotation(*angle, *axis, *center, ctx)?,
        TransformOperation::VectorRotation { from, to, center } => {
            euclidean::vector_rotation(*from, *to, *center, ctx)?
        }
        TransformOperation::Mirror(plane) => affine::mirror(plane, ctx)?,
        TransformOperation::Shear {
            plane,
            direction,
            angle,
        } => affine::shear(plane, *direction, *angle, ctx)?,
        TransformOperation::Project(plane) => affine::project(plane, ctx)?,
        TransformOperation::ChangeBasis { from, to } => euclidean::change_basis(from, to, ctx)?,
        TransformOperation::PlaneToPlane { from, to } => {
            euclidean::plane_to_plane(from, to, ctx)?
        }
        TransformOperation::Compound(ops) => compose::compose(ops, ctx)?,
        TransformOperation::Blend { first, second, t } => {
            let a = build(first, ctx)?;
            let b = build(second, ctx)?;
            compose::blend(&a, &b, *t, ctx)?
        }
        TransformOperation::Interpolate { start, end, t } => {
            let a = build(start, ctx)?;
            let b = build(end, ctx)?;
            compose::interpolate(&a, &b, *t, ctx)?
        }
    };

    if !m.is_finite() {
        return Err(TransformError::InvalidTransformMatrix {
            determinant: f64::NAN,
            reason: "result has non-finite entries",
        });
    }
    Ok(m)
}

/// Builds `op` and inverts the result.
///
/// # Errors
/// Any error from [`build`], or [`TransformError::InvalidTransformMatrix`] when
/// the built matrix is singular (projections, for instance).
pub fn invert(op: &TransformOperation, ctx: &GeometricContext) -> TransformResult<AffineMatrix> {
    let m = build(op, ctx)?;
    let determinant = m.determinant();
    if determinant.abs() <= ctx.abs_tol {
        return Err(TransformError::InvalidTransformMatrix {
            determinant,
            reason: "matrix is not invertible",
        });
    }
    m.inverse().ok_or(TransformError::InvalidTransformMatrix {
        determinant,
        reason: "matrix is not invertible",
    })
}
