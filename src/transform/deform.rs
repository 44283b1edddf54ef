//! Parameters for non-affine deformations.
//!
//! This crate does not deform geometry itself. It builds and validates the
//! parameters, then hands them to an external [`Deformer`].

use std::f64::consts::TAU;
use std::fmt;

use super::affine::{MAX_SCALE_FACTOR, MIN_SCALE_FACTOR};
use super::apply::ApplyError;
use super::context::GeometricContext;
use super::error::{TransformError, TransformResult};
use crate::geom::{CurveEvaluator, Plane, Point3, Vec3};

/// Opaque reference to a surface owned by the deformation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Axis along which an axial deformation (twist, bend, taper) is measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformationAxis {
    pub origin: Point3,
    pub direction: Vec3,
    /// Optional `(start, end)` distances along the axis; `None` means the
    /// whole extent of the geometry.
    pub extent: Option<(f64, f64)>,
}

impl DeformationAxis {
    #[must_use]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            extent: None,
        }
    }

    /// Limit the deformation to `[start, end]` along the axis.
    #[must_use]
    pub const fn extent(mut self, start: f64, end: f64) -> Self {
        self.extent = Some((start, end));
        self
    }
}

/// A deformation request.
#[derive(Clone, Copy)]
pub enum DeformationSpec<'a> {
    /// Rotate about the axis by an angle growing linearly along it.
    Twist { axis: DeformationAxis, angle: f64 },
    /// Bend the axis into an arc of `angle` radians, towards `bend_direction`
    /// when given.
    Bend {
        axis: DeformationAxis,
        bend_direction: Option<Vec3>,
        angle: f64,
    },
    /// Scale perpendicular to the axis from `start_factor` to `end_factor`.
    Taper {
        axis: DeformationAxis,
        start_factor: f64,
        end_factor: f64,
    },
    /// Map geometry along `base` onto `target`.
    Flow {
        base: &'a dyn CurveEvaluator,
        target: &'a dyn CurveEvaluator,
        stretch: bool,
    },
    /// Place geometry from `plane` onto `surface` at `uv`.
    Splop {
        plane: Plane,
        surface: SurfaceHandle,
        uv: [f64; 2],
        angle: f64,
        factor: f64,
    },
    /// Morph geometry from the parameter space of `source` into `target`.
    Sporph {
        source: SurfaceHandle,
        target: SurfaceHandle,
        offset: f64,
    },
    /// Swirl around the plane normal: full `angle` inside `inner_radius`,
    /// fading to none at `outer_radius`.
    Maelstrom {
        plane: Plane,
        inner_radius: f64,
        outer_radius: f64,
        angle: f64,
    },
}

impl fmt::Debug for DeformationSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.kind());
        match *self {
            Self::Twist { axis, angle } => out.field("axis", &axis).field("angle", &angle),
            Self::Bend {
                axis,
                bend_direction,
                angle,
            } => out
                .field("axis", &axis)
                .field("bend_direction", &bend_direction)
                .field("angle", &angle),
            Self::Taper {
                axis,
                start_factor,
                end_factor,
            } => out
                .field("axis", &axis)
                .field("start_factor", &start_factor)
                .field("end_factor", &end_factor),
            Self::Flow {
                base,
                target,
                stretch,
            } => out
                .field("base_length", &base.length())
                .field("target_length", &target.length())
                .field("stretch", &stretch),
            Self::Splop {
                plane,
                surface,
                uv,
                angle,
                factor,
            } => out
                .field("plane", &plane)
                .field("surface", &surface)
                .field("uv", &uv)
                .field("angle", &angle)
                .field("factor", &factor),
            Self::Sporph {
                source,
                target,
                offset,
            } => out
                .field("source", &source)
                .field("target", &target)
                .field("offset", &offset),
            Self::Maelstrom {
                plane,
                inner_radius,
                outer_radius,
                angle,
            } => out
                .field("plane", &plane)
                .field("inner_radius", &inner_radius)
                .field("outer_radius", &outer_radius)
                .field("angle", &angle),
        };
        out.finish()
    }
}

impl DeformationSpec<'_> {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Twist { .. } => "twist",
            Self::Bend { .. } => "bend",
            Self::Taper { .. } => "taper",
            Self::Flow { .. } => "flow",
            Self::Splop { .. } => "splop",
            Self::Sporph { .. } => "sporph",
            Self::Maelstrom { .. } => "maelstrom",
        }
    }

    /// Checks the parameters against `ctx`.
    ///
    /// # Errors
    /// [`TransformError::InvalidDeformationParameters`] naming the first bad value.
    pub fn validate(&self, ctx: &GeometricContext) -> TransformResult<()> {
        ctx.check()?;
        let kind = self.kind();
        match *self {
            Self::Twist { axis, angle } => {
                check_axis(kind, &axis, ctx)?;
                check_finite(kind, "angle", angle)
            }
            Self::Bend {
                axis,
                bend_direction,
                angle,
            } => {
                check_axis(kind, &axis, ctx)?;
                if !angle.is_finite() || angle.abs() > TAU {
                    return Err(TransformError::deformation(
                        kind,
                        format!("angle {angle} must lie in [-2π, 2π]"),
                    ));
                }
                if let Some(dir) = bend_direction {
                    let unit_axis = axis.direction.normalized().unwrap_or(Vec3::Z);
                    let perpendicular = dir - unit_axis * dir.dot(unit_axis);
                    if !dir.is_finite() || perpendicular.length() <= ctx.abs_tol {
                        return Err(TransformError::deformation(
                            kind,
                            format!("bend direction {dir:?} must not be parallel to the axis"),
                        ));
                    }
                }
                Ok(())
            }
            Self::Taper {
                axis,
                start_factor,
                end_factor,
            } => {
                check_axis(kind, &axis, ctx)?;
                check_factor(kind, "start factor", start_factor)?;
                check_factor(kind, "end factor", end_factor)
            }
            Self::Flow { base, target, .. } => {
                check_curve(kind, "base", base, ctx)?;
                check_curve(kind, "target", target, ctx)
            }
            Self::Splop {
                plane,
                uv,
                angle,
                factor,
                ..
            } => {
                check_plane(kind, &plane, ctx)?;
                if uv.iter().any(|c| !(0.0..=1.0).contains(c)) {
                    return Err(TransformError::deformation(
                        kind,
                        format!("surface parameter {uv:?} must lie in the unit square"),
                    ));
                }
                check_finite(kind, "angle", angle)?;
                check_factor(kind, "scale factor", factor)
            }
            Self::Sporph { offset, .. } => check_finite(kind, "offset", offset),
            Self::Maelstrom {
                plane,
                inner_radius,
                outer_radius,
                angle,
            } => {
                check_plane(kind, &plane, ctx)?;
                check_finite(kind, "angle", angle)?;
                let valid = inner_radius.is_finite()
                    && outer_radius.is_finite()
                    && inner_radius >= 0.0
                    && outer_radius - inner_radius > ctx.abs_tol;
                if valid {
                    Ok(())
                } else {
                    Err(TransformError::deformation(
                        kind,
                        format!(
                            "radii ({inner_radius}, {outer_radius}) must satisfy 0 <= inner < outer"
                        ),
                    ))
                }
            }
        }
    }
}

/// External engine that applies deformations to geometry of type `G`.
pub trait Deformer<G> {
    type Error: std::error::Error + 'static;

    fn deform(&self, geometry: &G, spec: &DeformationSpec<'_>) -> Result<G, Self::Error>;
}

/// Validates `spec` and hands it to `deformer`.
///
/// # Errors
/// [`ApplyError::Transform`] when validation fails, [`ApplyError::Geometry`]
/// when the deformer rejects the request.
pub fn deform<G, D>(
    deformer: &D,
    geometry: &G,
    spec: &DeformationSpec<'_>,
    ctx: &GeometricContext,
) -> Result<G, ApplyError<D::Error>>
where
    D: Deformer<G>,
{
    spec.validate(ctx)?;
    log::debug!("deform: delegating {} deformation", spec.kind());
    deformer.deform(geometry, spec).map_err(ApplyError::Geometry)
}

fn check_finite(kind: &'static str, what: &str, value: f64) -> TransformResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TransformError::deformation(kind, format!("{what} {value} is not finite")))
    }
}

fn check_factor(kind: &'static str, what: &str, factor: f64) -> TransformResult<()> {
    if (MIN_SCALE_FACTOR..=MAX_SCALE_FACTOR).contains(&factor) {
        Ok(())
    } else {
        Err(TransformError::deformation(
            kind,
            format!("{what} {factor} is outside [{MIN_SCALE_FACTOR}, {MAX_SCALE_FACTOR}]"),
        ))
    }
}

fn check_axis(
    kind: &'static str,
    axis: &DeformationAxis,
    ctx: &GeometricContext,
) -> TransformResult<()> {
    if !axis.origin.is_finite() {
        return Err(TransformError::deformation(
            kind,
            format!("axis origin {:?} is not finite", axis.origin),
        ));
    }
    let length = axis.direction.length();
    if !length.is_finite() || length <= ctx.abs_tol {
        return Err(TransformError::deformation(
            kind,
            format!("axis direction {:?} is degenerate", axis.direction),
        ));
    }
    if let Some((start, end)) = axis.extent {
        if !start.is_finite() || !end.is_finite() || end - start <= ctx.abs_tol {
            return Err(TransformError::deformation(
                kind,
                format!("extent ({start}, {end}) must be finite with start < end"),
            ));
        }
    }
    Ok(())
}

fn check_plane(kind: &'static str, plane: &Plane, ctx: &GeometricContext) -> TransformResult<()> {
    match plane.defect(ctx.plane_tolerance()) {
        Some(defect) => Err(TransformError::deformation(
            kind,
            format!("plane is malformed: {defect}"),
        )),
        None => Ok(()),
    }
}

fn check_curve(
    kind: &'static str,
    which: &str,
    curve: &dyn CurveEvaluator,
    ctx: &GeometricContext,
) -> TransformResult<()> {
    let length = curve.length();
    if length.is_finite() && length > ctx.abs_tol {
        Ok(())
    } else {
        Err(TransformError::deformation(
            kind,
            format!("{which} curve length {length} is degenerate"),
        ))
    }
}
