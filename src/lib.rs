#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Affine transform algebra for the geometry engine.
//!
//! [`transform`] turns typed transform requests into validated 4×4 matrices,
//! splits matrices back into translation, rotation and scale, blends and
//! chains transforms, and produces matrix sequences for array components.
//! [`geom`] holds the small linear-algebra vocabulary those operations share.
//!
//! All tolerances flow through an explicit [`GeometricContext`]; nothing in
//! this crate keeps global state.

pub mod geom;
pub mod transform;

pub use geom::{AffineMatrix, Plane, Point3, Quaternion, Vec3};
pub use transform::{
    ArraySpec, DecomposeOptions, DecomposedTransform, GeometricContext, TransformError,
    TransformOperation, TransformResult, blend, build, compose, decompose, generate_array,
    interpolate, invert,
};
