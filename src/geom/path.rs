//! Curve evaluation boundary used by path arrays.
//!
//! Real curve kernels live outside this crate; they only need to implement
//! [`CurveEvaluator`]. [`LineCurve`] and [`PolylineCurve`] are provided for
//! callers without a kernel and for tests.

use super::{Plane, Point3, Vec3};

/// Minimal curve interface consumed by the array generator.
pub trait CurveEvaluator {
    /// Total arc length.
    fn length(&self) -> f64;

    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    /// Parameter at which the arc length from the start equals `length`.
    ///
    /// Curves that cannot map length to parameter return `None`; callers then
    /// sample by domain fraction instead.
    fn parameter_at_length(&self, _length: f64) -> Option<f64> {
        None
    }

    /// Oriented frame at `t` with the x axis along the tangent.
    fn frame_at(&self, _t: f64) -> Option<Plane> {
        None
    }
}

/// Frame with x along `tangent` and y leaning towards world up, which leaves
/// z horizontal. Vertical tangents take an arbitrary perpendicular instead.
fn horizontal_frame(origin: Point3, tangent: Vec3) -> Option<Plane> {
    let tangent = tangent.normalized()?;
    let binormal = Vec3::Z
        .cross(tangent)
        .normalized()
        .unwrap_or_else(|| tangent.any_orthogonal());
    let normal = tangent.cross(binormal).normalized()?;
    let binormal = tangent.cross(normal);
    Some(Plane {
        origin,
        x_axis: tangent,
        y_axis: normal,
        z_axis: binormal,
    })
}

/// Straight segment parameterized on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCurve {
    pub start: Point3,
    pub end: Point3,
}

impl LineCurve {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }
}

impl CurveEvaluator for LineCurve {
    fn length(&self) -> f64 {
        self.direction().length()
    }

    fn point_at(&self, t: f64) -> Point3 {
        self.start.lerp(self.end, t)
    }

    fn parameter_at_length(&self, length: f64) -> Option<f64> {
        let total = self.length();
        if total > 0.0 && total.is_finite() {
            Some((length / total).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    fn frame_at(&self, t: f64) -> Option<Plane> {
        horizontal_frame(self.point_at(t), self.direction())
    }
}

/// Open polyline parameterized by normalized arc length on `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineCurve {
    points: Vec<Point3>,
    cumulative_lengths: Vec<f64>,
    total_length: f64,
}

impl PolylineCurve {
    /// Returns `None` for fewer than two points or non-finite coordinates.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Option<Self> {
        if points.len() < 2 || points.iter().any(|p| !p.is_finite()) {
            return None;
        }

        let mut cumulative_lengths = Vec::with_capacity(points.len());
        cumulative_lengths.push(0.0);
        let mut total = 0.0;
        for window in points.windows(2) {
            total += window[1].distance_to(window[0]);
            cumulative_lengths.push(total);
        }

        Some(Self {
            points,
            cumulative_lengths,
            total_length: total,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Segment index containing arc length `s`, and the distance into it.
    fn locate(&self, s: f64) -> (usize, f64) {
        let last_segment = self.points.len() - 2;
        let idx = match self
            .cumulative_lengths
            .binary_search_by(|value| value.total_cmp(&s))
        {
            Ok(i) => i,
            Err(i) => i.max(1) - 1,
        };
        let idx = idx.min(last_segment);
        (idx, s - self.cumulative_lengths[idx])
    }
}

impl CurveEvaluator for PolylineCurve {
    fn length(&self) -> f64 {
        self.total_length
    }

    fn point_at(&self, t: f64) -> Point3 {
        if self.total_length <= 0.0 {
            return self.points[0];
        }
        let (idx, into) = self.locate(t.clamp(0.0, 1.0) * self.total_length);
        let (a, b) = (self.points[idx], self.points[idx + 1]);
        let seg_len = a.distance_to(b);
        if seg_len == 0.0 {
            return a;
        }
        a.lerp(b, (into / seg_len).clamp(0.0, 1.0))
    }

    fn parameter_at_length(&self, length: f64) -> Option<f64> {
        if self.total_length > 0.0 && self.total_length.is_finite() {
            Some((length / self.total_length).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    fn frame_at(&self, t: f64) -> Option<Plane> {
        if self.total_length <= 0.0 {
            return None;
        }
        let (located, _) = self.locate(t.clamp(0.0, 1.0) * self.total_length);
        // Zero-length segments have no tangent: look ahead first, then back.
        let segments = self.points.len() - 1;
        let idx = (located..segments)
            .chain((0..located).rev())
            .find(|&i| self.points[i].distance_to(self.points[i + 1]) > 0.0)?;
        horizontal_frame(self.point_at(t), self.points[idx + 1] - self.points[idx])
    }
}
