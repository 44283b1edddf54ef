//! Ordered matrix sequences for array distributions.

use std::f64::consts::TAU;
use std::fmt;

use super::affine;
use super::context::GeometricContext;
use super::error::{TransformError, TransformResult};
use crate::geom::{AffineMatrix, CurveEvaluator, Plane, Point3, Vec3};

/// Upper bound on the number of matrices a single array may produce.
pub const MAX_ARRAY_COUNT: usize = 10_000;

/// Array distribution request.
#[derive(Clone, Copy)]
pub enum ArraySpec<'a> {
    /// `count` copies translated by `i * spacing` along `direction`.
    Linear {
        direction: Vec3,
        count: usize,
        spacing: f64,
    },
    /// `count` copies rotated by `i * total_angle / count` about `axis` through `center`.
    Polar {
        center: Point3,
        axis: Vec3,
        count: usize,
        total_angle: f64,
    },
    /// Grid of translations; x varies slowest, z fastest.
    Rectangular {
        x_count: usize,
        y_count: usize,
        z_count: usize,
        x_spacing: f64,
        y_spacing: f64,
        z_spacing: f64,
    },
    /// `count` samples spread evenly over the curve, from its start to its end.
    Path {
        curve: &'a dyn CurveEvaluator,
        count: usize,
        orient_to_path: bool,
    },
    /// `segments` copies rotated about the plane normal; odd segments are
    /// mirrored across the plane's XZ plane first.
    Kaleidoscope { plane: Plane, segments: usize },
}

impl ArraySpec<'_> {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::Polar { .. } => "polar",
            Self::Rectangular { .. } => "rectangular",
            Self::Path { .. } => "path",
            Self::Kaleidoscope { .. } => "kaleidoscope",
        }
    }
}

impl fmt::Debug for ArraySpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.kind());
        match *self {
            Self::Linear {
                direction,
                count,
                spacing,
            } => out
                .field("direction", &direction)
                .field("count", &count)
                .field("spacing", &spacing),
            Self::Polar {
                center,
                axis,
                count,
                total_angle,
            } => out
                .field("center", &center)
                .field("axis", &axis)
                .field("count", &count)
                .field("total_angle", &total_angle),
            Self::Rectangular {
                x_count,
                y_count,
                z_count,
                x_spacing,
                y_spacing,
                z_spacing,
            } => out
                .field("counts", &[x_count, y_count, z_count])
                .field("spacings", &[x_spacing, y_spacing, z_spacing]),
            Self::Path {
                curve,
                count,
                orient_to_path,
            } => out
                .field("curve_length", &curve.length())
                .field("count", &count)
                .field("orient_to_path", &orient_to_path),
            Self::Kaleidoscope { plane, segments } => {
                out.field("plane", &plane).field("segments", &segments)
            }
        };
        out.finish()
    }
}

/// Generates the matrices of an array distribution.
///
/// # Errors
/// [`TransformError::InvalidArrayParameters`] for zero or oversized counts,
/// degenerate directions, spacings, angles, planes or curves.
pub fn generate_array(
    spec: &ArraySpec<'_>,
    ctx: &GeometricContext,
) -> TransformResult<Vec<AffineMatrix>> {
    ctx.check()?;
    let matrices = match *spec {
        ArraySpec::Linear {
            direction,
            count,
            spacing,
        } => linear(direction, count, spacing, ctx)?,
        ArraySpec::Polar {
            center,
            axis,
            count,
            total_angle,
        } => polar(center, axis, count, total_angle, ctx)?,
        ArraySpec::Rectangular {
            x_count,
            y_count,
            z_count,
            x_spacing,
            y_spacing,
            z_spacing,
        } => rectangular(
            [x_count, y_count, z_count],
            [x_spacing, y_spacing, z_spacing],
            ctx,
        )?,
        ArraySpec::Path {
            curve,
            count,
            orient_to_path,
        } => path(curve, count, orient_to_path, ctx)?,
        ArraySpec::Kaleidoscope { plane, segments } => kaleidoscope(&plane, segments, ctx)?,
    };
    log::debug!("array: generated {} {} matrices", matrices.len(), spec.kind());
    Ok(matrices)
}

fn check_count(what: &str, count: usize) -> TransformResult<()> {
    if count == 0 {
        return Err(TransformError::array(format!("{what} must be at least 1")));
    }
    if count > MAX_ARRAY_COUNT {
        return Err(TransformError::array(format!(
            "{what} {count} exceeds the limit of {MAX_ARRAY_COUNT}"
        )));
    }
    Ok(())
}

// Counts are bounded by MAX_ARRAY_COUNT, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn index_f64(i: usize) -> f64 {
    i as f64
}

fn linear(
    direction: Vec3,
    count: usize,
    spacing: f64,
    ctx: &GeometricContext,
) -> TransformResult<Vec<AffineMatrix>> {
    check_count("linear count", count)?;
    if !spacing.is_finite() || (count > 1 && spacing.abs() <= ctx.abs_tol) {
        return Err(TransformError::array(format!(
            "linear spacing {spacing} must be finite and larger than {}",
            ctx.abs_tol
        )));
    }
    let length = direction.length();
    let unit = direction
        .normalized()
        .filter(|_| length.is_finite() && length > ctx.abs_tol)
        .ok_or_else(|| {
            TransformError::array(format!("linear direction {direction:?} is degenerate"))
        })?;

    let step = unit * spacing;
    Ok((0..count)
        .map(|i| AffineMatrix::translation_matrix(step * index_f64(i)))
        .collect())
}

fn polar(
    center: Point3,
    axis: Vec3,
    count: usize,
    total_angle: f64,
    ctx: &GeometricContext,
) -> TransformResult<Vec<AffineMatrix>> {
    check_count("polar count", count)?;
    if !center.is_finite() {
        return Err(TransformError::array(format!(
            "polar center {center:?} is not finite"
        )));
    }
    if !total_angle.is_finite() || total_angle <= 0.0 || total_angle > TAU + ctx.angle_tol {
        return Err(TransformError::array(format!(
            "polar total angle {total_angle} must lie in (0, 2π]"
        )));
    }
    let axis_length = axis.length();
    if !axis_length.is_finite() || axis_length <= ctx.abs_tol {
        return Err(TransformError::array(format!(
            "polar axis {axis:?} is degenerate"
        )));
    }

    let step = total_angle / index_f64(count);
    (0..count)
        .map(|i| {
            AffineMatrix::rotation_matrix(axis, step * index_f64(i))
                .map(|r| r.about_point(center))
                .ok_or_else(|| TransformError::array(format!("polar axis {axis:?} is degenerate")))
        })
        .collect()
}

fn rectangular(
    counts: [usize; 3],
    spacings: [f64; 3],
    ctx: &GeometricContext,
) -> TransformResult<Vec<AffineMatrix>> {
    for (axis, &count) in ["x", "y", "z"].iter().zip(counts.iter()) {
        if count == 0 {
            return Err(TransformError::array(format!("{axis} count must be at least 1")));
        }
    }
    let total = counts
        .iter()
        .try_fold(1usize, |acc, &c| acc.checked_mul(c))
        .filter(|&n| n <= MAX_ARRAY_COUNT)
        .ok_or_else(|| {
            TransformError::array(format!(
                "rectangular array {counts:?} exceeds the limit of {MAX_ARRAY_COUNT} elements"
            ))
        })?;
    for ((axis, &count), &spacing) in ["x", "y", "z"]
        .iter()
        .zip(counts.iter())
        .zip(spacings.iter())
    {
        if !spacing.is_finite() || (count > 1 && spacing <= ctx.abs_tol) {
            return Err(TransformError::array(format!(
                "{axis} spacing {spacing} must exceed {} when the {axis} count is {count}",
                ctx.abs_tol
            )));
        }
    }

    let [nx, ny, nz] = counts;
    let [sx, sy, sz] = spacings;
    let mut out = Vec::with_capacity(total);
    for ix in 0..nx {
        for iy in 0..ny {
            for iz in 0..nz {
                out.push(AffineMatrix::translation_matrix(Vec3::new(
                    index_f64(ix) * sx,
                    index_f64(iy) * sy,
                    index_f64(iz) * sz,
                )));
            }
        }
    }
    Ok(out)
}

fn path(
    curve: &dyn CurveEvaluator,
    count: usize,
    orient: bool,
    ctx: &GeometricContext,
) -> TransformResult<Vec<AffineMatrix>> {
    check_count("path count", count)?;
    let length = curve.length();
    if !length.is_finite() || length <= ctx.abs_tol {
        return Err(TransformError::array(format!(
            "path curve length {length} is degenerate"
        )));
    }
    let (t0, t1) = curve.domain();
    if !t0.is_finite() || !t1.is_finite() {
        return Err(TransformError::array(format!(
            "path curve domain ({t0}, {t1}) is not finite"
        )));
    }

    let fractions: Vec<f64> = if count > 1 {
        let last = index_f64(count - 1);
        (0..count).map(|i| index_f64(i) / last).collect()
    } else {
        vec![0.0]
    };

    let by_length: Option<Vec<f64>> = fractions
        .iter()
        .map(|&f| curve.parameter_at_length(f * length))
        .collect();
    let params = by_length.unwrap_or_else(|| {
        log::warn!("path array: curve cannot map length to parameter, sampling by domain fraction");
        fractions.iter().map(|&f| t0 + (t1 - t0) * f).collect()
    });

    let start = curve.point_at(params[0]);
    let tol = ctx.plane_tolerance();
    let start_frame = if orient {
        let frame = curve.frame_at(params[0]).filter(|f| f.is_well_formed(tol));
        if frame.is_none() {
            log::warn!("path array: no usable frame at the curve start, placing by translation");
        }
        frame
    } else {
        None
    };

    let mut out = Vec::with_capacity(count);
    for &t in &params {
        let point = curve.point_at(t);
        if !point.is_finite() {
            return Err(TransformError::array(format!(
                "path curve returned a non-finite point at t = {t}"
            )));
        }
        let oriented = start_frame.and_then(|from| {
            let to = curve.frame_at(t).filter(|f| f.is_well_formed(tol));
            if to.is_none() {
                log::warn!("path array: no usable frame at t = {t}, placing by translation");
            }
            to.map(|to| to.to_world() * from.to_local())
        });
        out.push(oriented.unwrap_or_else(|| AffineMatrix::translation_matrix(point - start)));
    }
    Ok(out)
}

fn kaleidoscope(
    plane: &Plane,
    segments: usize,
    ctx: &GeometricContext,
) -> TransformResult<Vec<AffineMatrix>> {
    check_count("kaleidoscope segments", segments)?;
    if let Some(defect) = plane.defect(ctx.plane_tolerance()) {
        return Err(TransformError::array(format!(
            "kaleidoscope plane is malformed: {defect}"
        )));
    }

    // Mirror across the plane spanned by the x and z axes.
    let xz = Plane {
        origin: plane.origin,
        x_axis: plane.z_axis,
        y_axis: plane.x_axis,
        z_axis: plane.y_axis,
    };
    let mirror = affine::mirror(&xz, ctx)?;
    let step = TAU / index_f64(segments);

    (0..segments)
        .map(|i| -> TransformResult<AffineMatrix> {
            let rotation = AffineMatrix::rotation_matrix(plane.normal(), step * index_f64(i))
                .map(|r| r.about_point(plane.origin))
                .ok_or_else(|| TransformError::array("kaleidoscope plane normal is degenerate"))?;
            Ok(if i % 2 == 1 { rotation * mirror } else { rotation })
        })
        .collect()
}
