use serde::{Deserialize, Serialize};

use super::error::{TransformError, TransformResult};
use crate::geom::Tolerance;

/// Caller-supplied tolerances, read-only for the duration of a call.
///
/// `abs_tol` is a model-space distance; `angle_tol` is in radians and is also
/// used for dimensionless checks such as unit-length plane axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometricContext {
    pub abs_tol: f64,
    pub angle_tol: f64,
}

impl GeometricContext {
    pub const DEFAULT: Self = Self {
        abs_tol: Tolerance::DEFAULT.eps,
        angle_tol: Tolerance::ANGLE.eps,
    };

    #[must_use]
    pub const fn new(abs_tol: f64, angle_tol: f64) -> Self {
        Self { abs_tol, angle_tol }
    }

    /// Both tolerances finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.abs_tol.is_finite()
            && self.abs_tol > 0.0
            && self.angle_tol.is_finite()
            && self.angle_tol > 0.0
    }

    pub(crate) fn check(&self) -> TransformResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TransformError::invalid_request(format!(
                "tolerances must be finite and positive (abs_tol {}, angle_tol {})",
                self.abs_tol, self.angle_tol
            )))
        }
    }

    /// Tolerance for plane-frame checks (unit axes, orthogonality).
    #[must_use]
    pub fn plane_tolerance(&self) -> f64 {
        self.angle_tol.max(Tolerance::ZERO_LENGTH.eps)
    }
}

impl Default for GeometricContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Knobs for [`decompose_with_options`](super::decompose_with_options).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeOptions {
    /// Relative column coupling above which the polar refinement path is taken.
    pub shear_threshold: f64,
    /// Cap on Newton–Schulz polar refinement rounds.
    pub max_iterations: usize,
    /// Orthogonality error below which the rotation counts as orthogonal.
    pub orthogonality_threshold: f64,
}

impl DecomposeOptions {
    pub const SHEAR_THRESHOLD: f64 = 0.01;
    pub const MAX_ITERATIONS: usize = 10;
    pub const ORTHOGONALITY_THRESHOLD: f64 = 1e-6;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            shear_threshold: Self::SHEAR_THRESHOLD,
            max_iterations: Self::MAX_ITERATIONS,
            orthogonality_threshold: Self::ORTHOGONALITY_THRESHOLD,
        }
    }

    #[must_use]
    pub const fn shear_threshold(mut self, threshold: f64) -> Self {
        self.shear_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    #[must_use]
    pub const fn orthogonality_threshold(mut self, threshold: f64) -> Self {
        self.orthogonality_threshold = threshold;
        self
    }
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self::new()
    }
}
