use crate::geom::{PlaneDefect, Vec3};

/// Failures reported by the builder, decomposer, composer and array generator.
///
/// Every variant carries the values that caused the rejection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("invalid transform request: {reason}")]
    InvalidTransformSpec { reason: String },

    #[error("{axis} scale factor {factor} is outside [{min}, {max}]")]
    InvalidScaleFactor {
        axis: &'static str,
        factor: f64,
        min: f64,
        max: f64,
    },

    #[error("non-uniform scale plane is malformed: {0}")]
    InvalidScalePlane(PlaneDefect),

    #[error("rotation {what} {vector:?} has length {length}, expected more than {tolerance}")]
    InvalidRotationAxis {
        what: &'static str,
        vector: Vec3,
        length: f64,
        tolerance: f64,
    },

    #[error("mirror plane is malformed: {0}")]
    InvalidMirrorPlane(PlaneDefect),

    #[error("invalid shear (direction {direction:?}, angle {angle}): {reason}")]
    InvalidShearParameters {
        direction: Vec3,
        angle: f64,
        reason: &'static str,
    },

    #[error("projection plane is malformed: {0}")]
    InvalidProjectionPlane(PlaneDefect),

    #[error("{which} basis plane is malformed: {defect}")]
    InvalidBasisPlanes {
        which: &'static str,
        defect: PlaneDefect,
    },

    #[error("matrix is not a usable affine transform (determinant {determinant}): {reason}")]
    InvalidTransformMatrix {
        determinant: f64,
        reason: &'static str,
    },

    #[error("invalid array parameters: {reason}")]
    InvalidArrayParameters { reason: String },

    #[error("decomposition failed: {reason}")]
    DecompositionFailed { reason: String },

    #[error("invalid {kind} deformation: {reason}")]
    InvalidDeformationParameters {
        kind: &'static str,
        reason: String,
    },
}

impl TransformError {
    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidTransformSpec {
            reason: reason.into(),
        }
    }

    pub(crate) fn array(reason: impl Into<String>) -> Self {
        Self::InvalidArrayParameters {
            reason: reason.into(),
        }
    }

    pub(crate) fn decomposition(reason: impl Into<String>) -> Self {
        Self::DecompositionFailed {
            reason: reason.into(),
        }
    }

    pub(crate) fn deformation(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidDeformationParameters {
            kind,
            reason: reason.into(),
        }
    }
}

pub type TransformResult<T> = Result<T, TransformError>;
