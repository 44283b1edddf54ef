use serde::{Deserialize, Serialize};

use crate::geom::{AffineMatrix, Plane, Point3, Vec3};

/// A transform request. Primitive variants map to one matrix through
/// [`build`](super::build); `Compound`, `Blend` and `Interpolate` are resolved by
/// the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformOperation {
    /// Caller-supplied matrix; must be finite and invertible.
    Matrix(AffineMatrix),
    Translate(Vec3),
    UniformScale {
        anchor: Point3,
        factor: f64,
    },
    /// Per-axis scale measured in the plane's frame, fixed at the plane origin.
    NonUniformScale {
        plane: Plane,
        sx: f64,
        sy: f64,
        sz: f64,
    },
    /// Right-handed rotation of `angle` radians about `axis` through `center`.
    AxisRotation {
        angle: f64,
        axis: Vec3,
        center: Point3,
    },
    /// Shortest rotation turning `from` onto `to`, about `center`.
    VectorRotation {
        from: Vec3,
        to: Vec3,
        center: Point3,
    },
    Mirror(Plane),
    /// Displaces points along `direction` (projected into the plane) by
    /// `tan(angle)` times their height above the plane.
    Shear {
        plane: Plane,
        direction: Vec3,
        angle: f64,
    },
    /// Orthogonal projection onto the plane.
    Project(Plane),
    /// Re-expresses coordinates given in `from` as coordinates in `to`.
    ChangeBasis {
        from: Plane,
        to: Plane,
    },
    /// Moves geometry attached to `from` so it sits on `to`.
    PlaneToPlane {
        from: Plane,
        to: Plane,
    },
    /// Sequence applied left to right: element 0 first.
    Compound(Vec<TransformOperation>),
    Blend {
        first: Box<TransformOperation>,
        second: Box<TransformOperation>,
        t: f64,
    },
    Interpolate {
        start: Box<TransformOperation>,
        end: Box<TransformOperation>,
        t: f64,
    },
}

impl TransformOperation {
    #[must_use]
    pub const fn translate(offset: Vec3) -> Self {
        Self::Translate(offset)
    }

    #[must_use]
    pub const fn uniform_scale(anchor: Point3, factor: f64) -> Self {
        Self::UniformScale { anchor, factor }
    }

    #[must_use]
    pub const fn rotation(angle: f64, axis: Vec3, center: Point3) -> Self {
        Self::AxisRotation {
            angle,
            axis,
            center,
        }
    }

    #[must_use]
    pub fn compound(ops: impl IntoIterator<Item = Self>) -> Self {
        Self::Compound(ops.into_iter().collect())
    }

    #[must_use]
    pub fn blend(first: Self, second: Self, t: f64) -> Self {
        Self::Blend {
            first: Box::new(first),
            second: Box::new(second),
            t,
        }
    }

    #[must_use]
    pub fn interpolate(start: Self, end: Self, t: f64) -> Self {
        Self::Interpolate {
            start: Box::new(start),
            end: Box::new(end),
            t,
        }
    }

    /// Short name used in log output and error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "Matrix",
            Self::Translate(_) => "Translate",
            Self::UniformScale { .. } => "UniformScale",
            Self::NonUniformScale { .. } => "NonUniformScale",
            Self::AxisRotation { .. } => "AxisRotation",
            Self::VectorRotation { .. } => "VectorRotation",
            Self::Mirror(_) => "Mirror",
            Self::Shear { .. } => "Shear",
            Self::Project(_) => "Project",
            Self::ChangeBasis { .. } => "ChangeBasis",
            Self::PlaneToPlane { .. } => "PlaneToPlane",
            Self::Compound(_) => "Compound",
            Self::Blend { .. } => "Blend",
            Self::Interpolate { .. } => "Interpolate",
        }
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Compound(_) | Self::Blend { .. } | Self::Interpolate { .. }
        )
    }

    /// Non-compound operations in application order, with nested compounds
    /// flattened. Blend and Interpolate are kept whole.
    #[must_use]
    pub fn fragments(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_fragments(&mut out);
        out
    }

    fn collect_fragments<'a>(&'a self, out: &mut Vec<&'a Self>) {
        match self {
            Self::Compound(ops) => ops.iter().for_each(|op| op.collect_fragments(out)),
            other => out.push(other),
        }
    }
}

impl From<AffineMatrix> for TransformOperation {
    fn from(m: AffineMatrix) -> Self {
        Self::Matrix(m)
    }
}
