//! TRS decomposition of affine matrices.
//!
//! The linear block is split into a rotation and a per-axis scale. Matrices
//! whose columns are (nearly) perpendicular take a closed-form path that
//! normalizes the columns. Matrices with noticeable column coupling (shear)
//! are refined towards their orthogonal polar factor with the Newton–Schulz
//! iteration `Q ← ½(Q + Q⁻ᵀ)`, and the scale is read from `diag(QᵀM)`.
//! Whatever the model cannot express ends up in the residual.

use serde::{Deserialize, Serialize};

use super::context::{DecomposeOptions, GeometricContext};
use super::error::{TransformError, TransformResult};
use crate::geom::{AffineMatrix, Mat3, Quaternion, Vec3};

/// Polar refinement stops once no element moves more than this multiple of `abs_tol`.
const CONVERGENCE_FACTOR: f64 = 100.0;

/// Translation, rotation and scale recovered from an affine matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecomposedTransform {
    pub translation: Vec3,
    /// Normalized rotation quaternion.
    pub rotation: Quaternion,
    /// Per-axis scale in the rotated frame; one negative component encodes a reflection.
    pub scale: Vec3,
    /// `input · (T·R·S)⁻¹`; identity when the TRS model is exact.
    pub residual: AffineMatrix,
    pub is_orthogonal: bool,
    pub orthogonality_error: f64,
}

impl DecomposedTransform {
    /// Rebuilds `T·R·S` from the components, ignoring the residual.
    #[must_use]
    pub fn recompose(&self) -> AffineMatrix {
        trs_matrix(self.translation, self.rotation, self.scale)
    }

    /// Largest deviation of the residual from the identity.
    #[must_use]
    pub fn residual_error(&self) -> f64 {
        self.residual.max_abs_diff(&AffineMatrix::IDENTITY)
    }

    /// Whether the residual is the identity within `eps`.
    #[must_use]
    pub fn is_exact(&self, eps: f64) -> bool {
        self.residual_error() <= eps
    }
}

/// Decomposes `m` with the default [`DecomposeOptions`].
///
/// # Errors
/// [`TransformError::DecompositionFailed`] when `m` has non-finite entries,
/// [`TransformError::InvalidTransformSpec`] when `ctx` is unusable.
pub fn decompose(m: &AffineMatrix, ctx: &GeometricContext) -> TransformResult<DecomposedTransform> {
    decompose_with_options(m, ctx, &DecomposeOptions::default())
}

/// Decomposes `m` into translation, rotation, scale and residual.
///
/// # Errors
/// See [`decompose`].
pub fn decompose_with_options(
    m: &AffineMatrix,
    ctx: &GeometricContext,
    options: &DecomposeOptions,
) -> TransformResult<DecomposedTransform> {
    ctx.check()?;
    if !m.is_finite() {
        return Err(TransformError::decomposition("matrix has non-finite entries"));
    }

    let translation = m.translation();
    let linear = m.linear();
    let cols = linear.cols();
    let norms = Vec3::new(cols[0].length(), cols[1].length(), cols[2].length());

    let max_cross = [(0, 1), (0, 2), (1, 2)]
        .into_iter()
        .map(|(i, j)| cols[i].dot(cols[j]).abs())
        .fold(0.0, f64::max);
    let min_scale = norms.x.min(norms.y).min(norms.z);
    let shear_limit = (min_scale * options.shear_threshold).max(ctx.abs_tol);

    let (rotation, scale) = if max_cross > shear_limit {
        log::debug!(
            "decompose: column coupling {max_cross:.3e} exceeds {shear_limit:.3e}, using polar refinement"
        );
        polar_rotation_and_scale(&linear, ctx, options)
    } else {
        log::debug!("decompose: near-orthogonal columns, using column normalization");
        normalized_rotation_and_scale(&linear, norms, ctx)
    };

    let (rotation, scale) = correct_reflection(rotation, scale);

    let raw = Quaternion::from_rotation_unnormalized(&rotation);
    let orthogonality_error = if raw.is_finite() {
        orthogonality_error(&raw.to_rotation())
    } else {
        f64::INFINITY
    };
    let quaternion = raw.normalized().unwrap_or(Quaternion::IDENTITY);
    let is_orthogonal = orthogonality_error < options.orthogonality_threshold;

    let residual = trs_matrix(translation, quaternion, scale)
        .inverse()
        .map_or(AffineMatrix::IDENTITY, |inv| *m * inv);

    log::debug!(
        "decompose: scale {:?}, rotation angle {:.6}, orthogonality error {:.3e}",
        scale,
        quaternion.angle(),
        orthogonality_error
    );

    Ok(DecomposedTransform {
        translation,
        rotation: quaternion,
        scale,
        residual,
        is_orthogonal,
        orthogonality_error,
    })
}

/// Decomposes every matrix, preserving order. Runs on the rayon pool when the
/// `parallel` feature is enabled.
#[must_use]
pub fn decompose_batch(
    matrices: &[AffineMatrix],
    ctx: &GeometricContext,
) -> Vec<TransformResult<DecomposedTransform>> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "parallel")] {
            use rayon::prelude::*;
            matrices.par_iter().map(|m| decompose(m, ctx)).collect()
        } else {
            matrices.iter().map(|m| decompose(m, ctx)).collect()
        }
    }
}

/// `T·R·S` for the given components.
pub(crate) fn trs_matrix(translation: Vec3, rotation: Quaternion, scale: Vec3) -> AffineMatrix {
    AffineMatrix::from_linear(rotation.to_rotation().scale_cols(scale), translation)
}

fn normalized_rotation_and_scale(
    linear: &Mat3,
    norms: Vec3,
    ctx: &GeometricContext,
) -> (Mat3, Vec3) {
    let basis = [Vec3::X, Vec3::Y, Vec3::Z];
    let norm_values = norms.to_array();
    let mut rotation = Mat3::IDENTITY;
    for (i, (&n, &fallback)) in norm_values.iter().zip(basis.iter()).enumerate() {
        let col = if n > ctx.abs_tol { linear.col(i) / n } else { fallback };
        rotation = rotation.with_col(i, col);
    }
    (rotation, norms)
}

fn polar_rotation_and_scale(
    linear: &Mat3,
    ctx: &GeometricContext,
    options: &DecomposeOptions,
) -> (Mat3, Vec3) {
    let rotation = polar_factor(linear, ctx, options);
    let scale = (rotation.transpose() * *linear).diagonal();
    (rotation, scale)
}

/// Newton–Schulz refinement towards the orthogonal polar factor of `linear`.
fn polar_factor(linear: &Mat3, ctx: &GeometricContext, options: &DecomposeOptions) -> Mat3 {
    let tolerance = ctx.abs_tol * CONVERGENCE_FACTOR;
    // The polar factor of c·M equals that of M for c > 0; start at unit determinant.
    let det = linear.determinant();
    let mut q = if det.is_finite() && det.abs() > ctx.abs_tol {
        linear.scale(det.abs().cbrt().recip())
    } else {
        *linear
    };

    for iteration in 0..options.max_iterations {
        let det = q.determinant();
        if det.abs() < ctx.abs_tol {
            log::warn!(
                "polar refinement: singular iterate (det {det:.3e}) at round {iteration}, freezing"
            );
            return q;
        }
        let Some(inv_t) = q.inverse_transpose(0.0) else {
            log::warn!("polar refinement: iterate could not be inverted at round {iteration}");
            return q;
        };

        let next = (q + inv_t).scale(0.5);
        let delta = next.max_abs_diff(&q);
        log::trace!("polar refinement round {iteration}: max change {delta:.3e}");
        q = next;
        if delta < tolerance {
            log::debug!("polar refinement converged after {} rounds", iteration + 1);
            return q;
        }
    }

    log::warn!(
        "polar refinement hit the {} round cap without converging",
        options.max_iterations
    );
    q
}

/// A rotation must have positive determinant; move the reflection into the
/// scale component with the smallest magnitude.
fn correct_reflection(rotation: Mat3, scale: Vec3) -> (Mat3, Vec3) {
    if rotation.determinant() >= 0.0 {
        return (rotation, scale);
    }
    let mut s = scale.to_array();
    let mut idx = 0;
    for i in 1..3 {
        if s[i].abs() < s[idx].abs() {
            idx = i;
        }
    }
    s[idx] = -s[idx];
    let flipped = rotation.with_col(idx, -rotation.col(idx));
    (flipped, Vec3::from_array(s))
}

/// `max(|cᵢ·cᵢ − 1|, |cᵢ·cⱼ|)` over the columns of `r`.
fn orthogonality_error(r: &Mat3) -> f64 {
    let cols = r.cols();
    let mut error: f64 = 0.0;
    for i in 0..3 {
        error = error.max((cols[i].dot(cols[i]) - 1.0).abs());
        for j in (i + 1)..3 {
            error = error.max(cols[i].dot(cols[j]).abs());
        }
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_decomposes_trivially() {
        let d = decompose(&AffineMatrix::IDENTITY, &GeometricContext::default()).unwrap();
        assert_eq!(d.translation, Vec3::ZERO);
        assert_eq!(d.scale, Vec3::new(1.0, 1.0, 1.0));
        assert!(d.rotation.same_rotation(Quaternion::IDENTITY, 1e-15));
        assert!(d.is_orthogonal);
        assert!(d.is_exact(1e-15));
    }

    #[test]
    fn non_finite_input_fails() {
        let mut rows = *AffineMatrix::IDENTITY.as_rows();
        rows[0][3] = f64::INFINITY;
        let err =
            decompose(&AffineMatrix::from_rows(rows), &GeometricContext::default()).unwrap_err();
        assert!(matches!(err, TransformError::DecompositionFailed { .. }));
    }

    #[test]
    fn mirror_moves_reflection_into_scale() {
        let m = AffineMatrix::scale_matrix(-2.0, 3.0, 4.0);
        let d = decompose(&m, &GeometricContext::default()).unwrap();
        assert_eq!(d.scale, Vec3::new(-2.0, 3.0, 4.0));
        assert!(d.rotation.same_rotation(Quaternion::IDENTITY, 1e-12));
        assert!(d.recompose().approx_eq(&m, 1e-12));
    }

    #[test]
    fn reflection_picks_smallest_scale_component() {
        let m = AffineMatrix::scale_matrix(5.0, 1.0, -3.0);
        let d = decompose(&m, &GeometricContext::default()).unwrap();
        let negatives = d.scale.to_array().iter().filter(|s| **s < 0.0).count();
        assert_eq!(negatives, 1);
        assert!(d.scale.y < 0.0);
        assert!(d.rotation.to_rotation().determinant() > 0.0);
        assert!(d.recompose().approx_eq(&m, 1e-12));
    }

    #[test]
    fn zero_scale_column_uses_default_basis() {
        let m = AffineMatrix::scale_matrix(2.0, 0.0, 1.0);
        let d = decompose(&m, &GeometricContext::default()).unwrap();
        assert_eq!(d.scale, Vec3::new(2.0, 0.0, 1.0));
        assert!(d.is_orthogonal);
        assert_eq!(d.residual, AffineMatrix::IDENTITY);
    }

    #[test]
    fn shear_takes_polar_path() {
        let m = AffineMatrix::from_rows([
            [1.0, 0.5, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let d = decompose(&m, &GeometricContext::default()).unwrap();
        assert!(d.orthogonality_error < 1e-4);
        assert!(d.is_orthogonal);
        assert!(d.residual_error() > 1e-3);
        // The residual carries the shear that T·R·S cannot express.
        assert!((d.residual * d.recompose()).approx_eq(&m, 1e-9));
    }

    #[test]
    fn iteration_cap_is_respected() {
        let m = AffineMatrix::from_rows([
            [1.0, 0.9, 0.9, 0.0],
            [0.0, 1.0, 0.9, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let opts = DecomposeOptions::new().max_iterations(1);
        let d = decompose_with_options(&m, &GeometricContext::default(), &opts).unwrap();
        assert!(!d.is_orthogonal);
        assert!(d.orthogonality_error.is_finite());
    }

    #[test]
    fn rotation_about_point_recovers_components() {
        let ctx = GeometricContext::default();
        let m = AffineMatrix::rotation_matrix(Vec3::Z, FRAC_PI_2)
            .unwrap()
            .about_point(Point3::new(1.0, 0.0, 0.0));
        let d = decompose(&m, &ctx).unwrap();
        assert_relative_eq!(d.rotation.angle(), FRAC_PI_2, epsilon = 1e-12);
        assert!((d.translation - Vec3::new(1.0, -1.0, 0.0)).length() < 1e-12);
        assert!(d.recompose().approx_eq(&m, 1e-12));
    }

    #[test]
    fn batch_preserves_order() {
        let ctx = GeometricContext::default();
        let ms: Vec<_> = (1..=5)
            .map(|i| AffineMatrix::translation_matrix(Vec3::new(f64::from(i), 0.0, 0.0)))
            .collect();
        let out = decompose_batch(&ms, &ctx);
        for (i, d) in out.into_iter().enumerate() {
            let d = d.unwrap();
            assert_eq!(d.translation.x, (i + 1) as f64);
        }
    }
}
