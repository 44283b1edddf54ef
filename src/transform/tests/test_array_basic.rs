//! Tests for array distributions.

use crate::geom::{AffineMatrix, CurveEvaluator, LineCurve, Plane, Point3, PolylineCurve, Vec3};
use crate::transform::{ArraySpec, GeometricContext, TransformError, decompose, generate_array};
use approx::assert_relative_eq;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

// ============================================================================
// Helpers
// ============================================================================

fn ctx() -> GeometricContext {
    GeometricContext::default()
}

/// Straight curve that only reports points, no arc-length mapping or frames.
struct BareLine {
    start: Point3,
    end: Point3,
}

impl CurveEvaluator for BareLine {
    fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    fn point_at(&self, t: f64) -> Point3 {
        self.start.lerp(self.end, t / 2.0)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 2.0)
    }
}

// ============================================================================
// Rectangular and polar
// ============================================================================

#[test]
fn test_rectangular_order_is_x_then_y_then_z() {
    let spec = ArraySpec::Rectangular {
        x_count: 2,
        y_count: 3,
        z_count: 1,
        x_spacing: 10.0,
        y_spacing: 5.0,
        z_spacing: 1.0,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    let offsets: Vec<_> = ms.iter().map(|m| m.translation()).collect();
    let expected = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(10.0, 5.0, 0.0),
        Vec3::new(10.0, 10.0, 0.0),
    ];
    assert_eq!(offsets, expected);
}

#[test]
fn test_polar_full_turn_quarters() {
    let spec = ArraySpec::Polar {
        center: Point3::ORIGIN,
        axis: Vec3::Z,
        count: 4,
        total_angle: TAU,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    assert_eq!(ms.len(), 4);
    for (i, m) in ms.iter().enumerate() {
        let d = decompose(m, &ctx()).unwrap();
        assert_relative_eq!(d.rotation.angle(), [0.0, FRAC_PI_2, PI, FRAC_PI_2][i], epsilon = 1e-9);
    }
    let p = ms[3].apply_point(Point3::new(1.0, 0.0, 0.0));
    assert!(p.distance_to(Point3::new(0.0, -1.0, 0.0)) < 1e-12);
}

#[test]
fn test_polar_keeps_center_fixed() {
    let center = Point3::new(3.0, -1.0, 2.0);
    let spec = ArraySpec::Polar {
        center,
        axis: Vec3::new(1.0, 1.0, 0.0),
        count: 5,
        total_angle: PI,
    };
    for m in generate_array(&spec, &ctx()).unwrap() {
        assert!(m.apply_point(center).distance_to(center) < 1e-12);
    }
}

#[test]
fn test_polar_rejects_degenerate_axis() {
    let spec = ArraySpec::Polar {
        center: Point3::ORIGIN,
        axis: Vec3::ZERO,
        count: 3,
        total_angle: PI,
    };
    assert!(matches!(
        generate_array(&spec, &ctx()),
        Err(TransformError::InvalidArrayParameters { .. })
    ));
}

// ============================================================================
// Path
// ============================================================================

#[test]
fn test_path_along_line_translates_from_start() {
    let curve = LineCurve::new(Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 9.0, 0.0));
    let spec = ArraySpec::Path {
        curve: &curve,
        count: 5,
        orient_to_path: false,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    assert_eq!(ms.len(), 5);
    assert!(ms[0].approx_eq(&AffineMatrix::IDENTITY, 1e-12));
    for (i, m) in ms.iter().enumerate() {
        let expected = Vec3::new(0.0, 2.0 * i as f64, 0.0);
        assert!((m.translation() - expected).length() < 1e-12);
    }
}

#[test]
fn test_oriented_path_follows_polyline_corner() {
    let curve = PolylineCurve::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 4.0, 0.0),
    ])
    .unwrap();
    let spec = ArraySpec::Path {
        curve: &curve,
        count: 3,
        orient_to_path: true,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    assert!(ms[0].approx_eq(&AffineMatrix::IDENTITY, 1e-12));

    // The last sample sits on the second leg, heading +Y.
    let last = ms[2];
    assert!(last.apply_point(Point3::ORIGIN).distance_to(Point3::new(4.0, 4.0, 0.0)) < 1e-12);
    assert!((last.apply_vec(Vec3::X) - Vec3::Y).length() < 1e-12);
    assert!((last.determinant() - 1.0).abs() < 1e-12);
}

#[test]
fn test_oriented_path_ignores_trailing_duplicate_vertex() {
    let curve = PolylineCurve::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 4.0, 0.0),
        Point3::new(4.0, 4.0, 0.0),
    ])
    .unwrap();
    let spec = ArraySpec::Path {
        curve: &curve,
        count: 3,
        orient_to_path: true,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    let last = ms[2];
    assert!(last.apply_point(Point3::ORIGIN).distance_to(Point3::new(4.0, 4.0, 0.0)) < 1e-12);
    assert!((last.apply_vec(Vec3::X) - Vec3::Y).length() < 1e-12);
}

#[test]
fn test_path_without_length_mapping_uses_domain_fractions() {
    let curve = BareLine {
        start: Point3::ORIGIN,
        end: Point3::new(0.0, 0.0, 6.0),
    };
    let spec = ArraySpec::Path {
        curve: &curve,
        count: 4,
        orient_to_path: true,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    for (i, m) in ms.iter().enumerate() {
        let t = 2.0 * i as f64 / 3.0;
        let expected = curve.point_at(t);
        assert!(m.apply_point(Point3::ORIGIN).distance_to(expected) < 1e-12);
        // No frames: placement is a pure translation.
        assert!((m.apply_vec(Vec3::X) - Vec3::X).length() < 1e-12);
    }
}

#[test]
fn test_single_sample_path_is_identity() {
    let curve = LineCurve::new(Point3::ORIGIN, Point3::new(2.0, 0.0, 0.0));
    let spec = ArraySpec::Path {
        curve: &curve,
        count: 1,
        orient_to_path: true,
    };
    let ms = generate_array(&spec, &ctx()).unwrap();
    assert_eq!(ms.len(), 1);
    assert!(ms[0].approx_eq(&AffineMatrix::IDENTITY, 1e-12));
}

#[test]
fn test_zero_length_path_rejected() {
    let curve = LineCurve::new(Point3::ORIGIN, Point3::ORIGIN);
    let spec = ArraySpec::Path {
        curve: &curve,
        count: 3,
        orient_to_path: false,
    };
    assert!(matches!(
        generate_array(&spec, &ctx()),
        Err(TransformError::InvalidArrayParameters { .. })
    ));
}

// ============================================================================
// Kaleidoscope
// ============================================================================

#[test]
fn test_kaleidoscope_alternates_reflections() {
    let plane = Plane::world_xy();
    let spec = ArraySpec::Kaleidoscope { plane, segments: 6 };
    let ms = generate_array(&spec, &ctx()).unwrap();
    assert_eq!(ms.len(), 6);
    for (i, m) in ms.iter().enumerate() {
        let det = m.determinant();
        let expected = if i % 2 == 1 { -1.0 } else { 1.0 };
        assert!((det - expected).abs() < 1e-12, "segment {i}");
        assert!(m.apply_point(Point3::ORIGIN).distance_to(Point3::ORIGIN) < 1e-12);
    }
    // Segment 1 mirrors y then rotates 60 degrees.
    let p = ms[1].apply_point(Point3::new(1.0, 0.0, 0.0));
    let angle = TAU / 6.0;
    assert!(p.distance_to(Point3::new(angle.cos(), angle.sin(), 0.0)) < 1e-12);
    let q = ms[1].apply_point(Point3::new(0.0, 1.0, 0.0));
    assert!(q.distance_to(Point3::new(angle.sin(), -angle.cos(), 0.0)) < 1e-12);
}

#[test]
fn test_kaleidoscope_rejects_malformed_plane() {
    let mut plane = Plane::world_xy();
    plane.x_axis = Vec3::new(2.0, 0.0, 0.0);
    let spec = ArraySpec::Kaleidoscope { plane, segments: 4 };
    assert!(matches!(
        generate_array(&spec, &ctx()),
        Err(TransformError::InvalidArrayParameters { .. })
    ));
}
