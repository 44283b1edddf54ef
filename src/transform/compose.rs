use super::builder::build;
use super::context::GeometricContext;
use super::decompose::{decompose, trs_matrix};
use super::error::{TransformError, TransformResult};
use super::operation::TransformOperation;
use crate::geom::AffineMatrix;

/// Builds every operation and chains them so element 0 is applied first:
/// `M_k · … · M_1 · M_0`. An empty list yields the identity.
///
/// # Errors
/// The first build failure, in list order.
pub fn compose(
    ops: &[TransformOperation],
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    let mut result = AffineMatrix::IDENTITY;
    for op in ops {
        result = build(op, ctx)? * result;
    }
    log::debug!("compose: chained {} operations", ops.len());
    Ok(result)
}

/// Chains already-built matrices, element 0 applied first.
///
/// # Errors
/// [`TransformError::InvalidTransformMatrix`] when an input or the product has
/// non-finite entries.
pub fn compose_matrices(matrices: &[AffineMatrix]) -> TransformResult<AffineMatrix> {
    if let Some(index) = matrices.iter().position(|m| !m.is_finite()) {
        log::debug!("compose_matrices: matrix {index} has non-finite entries");
        return Err(TransformError::InvalidTransformMatrix {
            determinant: f64::NAN,
            reason: "input has non-finite entries",
        });
    }
    let result = matrices
        .iter()
        .fold(AffineMatrix::IDENTITY, |acc, m| *m * acc);
    if !result.is_finite() {
        return Err(TransformError::InvalidTransformMatrix {
            determinant: f64::NAN,
            reason: "result has non-finite entries",
        });
    }
    Ok(result)
}

/// Weighted blend of two transforms: translation and scale are interpolated
/// linearly, rotation spherically. `t` is clamped to `[0, 1]`.
///
/// Any residual (shear) of the inputs is dropped; the result is always `T·R·S`.
///
/// # Errors
/// [`TransformError::DecompositionFailed`] for non-finite inputs or when the
/// blended matrix is singular.
pub fn blend(
    first: &AffineMatrix,
    second: &AffineMatrix,
    t: f64,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    trs_lerp("blend", first, second, t, ctx)
}

/// Transform at parameter `t` between `start` (t = 0) and `end` (t = 1).
///
/// # Errors
/// See [`blend`].
pub fn interpolate(
    start: &AffineMatrix,
    end: &AffineMatrix,
    t: f64,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    trs_lerp("interpolate", start, end, t, ctx)
}

fn trs_lerp(
    label: &str,
    a: &AffineMatrix,
    b: &AffineMatrix,
    t: f64,
    ctx: &GeometricContext,
) -> TransformResult<AffineMatrix> {
    if !t.is_finite() {
        return Err(TransformError::decomposition(format!(
            "{label} parameter {t} is not finite"
        )));
    }
    let t = t.clamp(0.0, 1.0);
    let da = decompose(a, ctx)?;
    let db = decompose(b, ctx)?;

    let translation = da.translation.lerp(db.translation, t);
    let scale = da.scale.lerp(db.scale, t);
    let rotation = da.rotation.slerp(db.rotation, t);
    let m = trs_matrix(translation, rotation, scale);

    let det = m.determinant();
    if !m.is_finite() || det.abs() <= ctx.abs_tol {
        return Err(TransformError::decomposition(format!(
            "{label} at t = {t} is singular (determinant {det})"
        )));
    }
    log::debug!("{label}: t = {t}, scale {scale:?}, rotation angle {:.6}", rotation.angle());
    Ok(m)
}
