//! Boundary to the geometry layer: applying built matrices to concrete values.

use super::builder::build;
use super::context::GeometricContext;
use super::error::TransformError;
use super::operation::TransformOperation;
use crate::geom::{AffineMatrix, Plane, Point3, Vec3};

/// Failure while building a transform or applying it to geometry.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("geometry rejected the transform: {0}")]
    Geometry(#[source] E),
}

/// Why a built-in geometry value could not be transformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("transformed geometry has non-finite coordinates")]
    NonFinite,
    #[error("transform collapses the {0}")]
    Collapsed(&'static str),
}

/// Geometry that can be mapped through an affine matrix.
pub trait Transformable: Sized {
    type Error: std::error::Error + 'static;

    /// A transformed copy of `self`.
    fn transformed(&self, m: &AffineMatrix) -> Result<Self, Self::Error>;
}

impl Transformable for Point3 {
    type Error = GeometryError;

    fn transformed(&self, m: &AffineMatrix) -> Result<Self, Self::Error> {
        let p = m.apply_point(*self);
        if p.is_finite() { Ok(p) } else { Err(GeometryError::NonFinite) }
    }
}

/// Vectors are directions: translation does not affect them.
impl Transformable for Vec3 {
    type Error = GeometryError;

    fn transformed(&self, m: &AffineMatrix) -> Result<Self, Self::Error> {
        let v = m.apply_vec(*self);
        if v.is_finite() { Ok(v) } else { Err(GeometryError::NonFinite) }
    }
}

/// The origin and axes are mapped, then the frame is re-orthonormalized.
impl Transformable for Plane {
    type Error = GeometryError;

    fn transformed(&self, m: &AffineMatrix) -> Result<Self, Self::Error> {
        let plane = self.transform_by(m).ok_or(GeometryError::Collapsed("plane"))?;
        if plane.is_finite() { Ok(plane) } else { Err(GeometryError::NonFinite) }
    }
}

impl<T: Transformable> Transformable for Vec<T> {
    type Error = T::Error;

    fn transformed(&self, m: &AffineMatrix) -> Result<Self, Self::Error> {
        self.iter().map(|item| item.transformed(m)).collect()
    }
}

/// Builds `op` and applies the matrix to `geometry`.
///
/// # Errors
/// [`ApplyError::Transform`] when the operation is invalid,
/// [`ApplyError::Geometry`] when the geometry cannot take the matrix.
pub fn apply_operation<G: Transformable>(
    geometry: &G,
    op: &TransformOperation,
    ctx: &GeometricContext,
) -> Result<G, ApplyError<G::Error>> {
    let m = build(op, ctx)?;
    geometry.transformed(&m).map_err(ApplyError::Geometry)
}

/// One transformed copy of `geometry` per matrix, in order (e.g. an array).
///
/// # Errors
/// The first geometry failure.
pub fn apply_matrices<G: Transformable>(
    geometry: &G,
    matrices: &[AffineMatrix],
) -> Result<Vec<G>, ApplyError<G::Error>> {
    matrices
        .iter()
        .map(|m| geometry.transformed(m).map_err(ApplyError::Geometry))
        .collect()
}
