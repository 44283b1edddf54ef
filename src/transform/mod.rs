//! Affine transform algebra: requests, matrix construction, TRS decomposition,
//! composition and array generation.

mod affine;
mod apply;
mod array;
mod builder;
mod compose;
mod context;
mod decompose;
mod deform;
mod error;
mod euclidean;
mod operation;

pub use affine::{MAX_SCALE_FACTOR, MIN_SCALE_FACTOR};
pub use apply::{ApplyError, GeometryError, Transformable, apply_matrices, apply_operation};
pub use array::{ArraySpec, MAX_ARRAY_COUNT, generate_array};
pub use builder::{build, invert};
pub use compose::{blend, compose, compose_matrices, interpolate};
pub use context::{DecomposeOptions, GeometricContext};
pub use decompose::{DecomposedTransform, decompose, decompose_batch, decompose_with_options};
pub use deform::{DeformationAxis, DeformationSpec, Deformer, SurfaceHandle, deform};
pub use error::{TransformError, TransformResult};
pub use operation::TransformOperation;

#[cfg(test)]
mod tests;
