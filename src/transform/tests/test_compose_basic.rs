//! Tests for composition, blending and interpolation.

use crate::geom::{AffineMatrix, Plane, Point3, Quaternion, Vec3};
use crate::transform::{
    GeometricContext, TransformError, TransformOperation, blend, build, compose,
    compose_matrices, decompose, interpolate,
};
use approx::assert_relative_eq;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// ============================================================================
// Helpers
// ============================================================================

fn ctx() -> GeometricContext {
    GeometricContext::default()
}

fn sample_transform() -> AffineMatrix {
    let op = TransformOperation::compound([
        TransformOperation::NonUniformScale {
            plane: Plane::world_xy(),
            sx: 2.0,
            sy: 0.5,
            sz: 3.0,
        },
        TransformOperation::rotation(1.1, Vec3::new(0.3, -1.0, 0.4), Point3::ORIGIN),
        TransformOperation::translate(Vec3::new(7.0, -2.0, 0.5)),
    ]);
    build(&op, &ctx()).unwrap()
}

// ============================================================================
// Compose
// ============================================================================

#[test]
fn test_compose_matches_manual_product() {
    let ops = [
        TransformOperation::rotation(FRAC_PI_2, Vec3::Z, Point3::ORIGIN),
        TransformOperation::translate(Vec3::new(5.0, 0.0, 0.0)),
        TransformOperation::uniform_scale(Point3::ORIGIN, 2.0),
    ];
    let built: Vec<_> = ops.iter().map(|op| build(op, &ctx()).unwrap()).collect();
    let composed = compose(&ops, &ctx()).unwrap();
    let manual = built[2] * built[1] * built[0];
    assert!(composed.approx_eq(&manual, 1e-12));
    assert!(composed.approx_eq(&compose_matrices(&built).unwrap(), 1e-12));

    // (1,0,0) -> (0,1,0) -> (5,1,0) -> (10,2,0)
    let p = composed.apply_point(Point3::new(1.0, 0.0, 0.0));
    assert!(p.distance_to(Point3::new(10.0, 2.0, 0.0)) < 1e-12);
}

#[test]
fn test_compound_request_equals_compose() {
    let ops = vec![
        TransformOperation::Mirror(Plane::world_yz()),
        TransformOperation::translate(Vec3::new(0.0, 3.0, 0.0)),
    ];
    let compound = TransformOperation::compound(ops.clone());
    assert_eq!(
        build(&compound, &ctx()).unwrap(),
        compose(&ops, &ctx()).unwrap()
    );
}

#[test]
fn test_nested_compound_flattens_to_fragments() {
    let inner = TransformOperation::compound([
        TransformOperation::translate(Vec3::X),
        TransformOperation::translate(Vec3::Y),
    ]);
    let blended = TransformOperation::blend(
        TransformOperation::translate(Vec3::Z),
        TransformOperation::translate(Vec3::ZERO),
        0.5,
    );
    let outer = TransformOperation::compound([inner, blended.clone()]);
    let fragments = outer.fragments();
    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[2], &blended);

    let m = build(&outer, &ctx()).unwrap();
    assert!((m.translation() - Vec3::new(1.0, 1.0, 0.5)).length() < 1e-12);
}

// ============================================================================
// Blend and interpolate
// ============================================================================

#[test]
fn test_blend_of_identical_transforms_is_unchanged() {
    let m = sample_transform();
    for t in [0.0, 0.3, 0.5, 1.0] {
        let b = blend(&m, &m, t, &ctx()).unwrap();
        assert!(b.approx_eq(&m, 1e-9), "t = {t}");
    }
}

#[test]
fn test_blend_uniform_scales_midway() {
    let op = TransformOperation::blend(
        TransformOperation::uniform_scale(Point3::ORIGIN, 1.0),
        TransformOperation::uniform_scale(Point3::ORIGIN, 3.0),
        0.5,
    );
    let m = build(&op, &ctx()).unwrap();
    assert!(m.approx_eq(&AffineMatrix::scale_matrix(2.0, 2.0, 2.0), 1e-12));
}

#[test]
fn test_interpolate_hits_endpoints() {
    let start = AffineMatrix::IDENTITY;
    let end = sample_transform();
    assert!(interpolate(&start, &end, 0.0, &ctx()).unwrap().approx_eq(&start, 1e-12));
    assert!(interpolate(&start, &end, 1.0, &ctx()).unwrap().approx_eq(&end, 1e-9));
}

#[test]
fn test_interpolated_rotation_follows_shortest_arc() {
    let start = AffineMatrix::IDENTITY;
    let end = AffineMatrix::rotation_matrix(Vec3::Z, FRAC_PI_2).unwrap();
    let mid = interpolate(&start, &end, 0.5, &ctx()).unwrap();
    let d = decompose(&mid, &ctx()).unwrap();
    let expected = Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_4).unwrap();
    assert!(d.rotation.same_rotation(expected, 1e-12));
    assert_relative_eq!(d.scale.x, 1.0, epsilon = 1e-12);
}

#[test]
fn test_blend_drops_shear() {
    let sheared = build(
        &TransformOperation::Shear {
            plane: Plane::world_xy(),
            direction: Vec3::X,
            angle: 0.4,
        },
        &ctx(),
    )
    .unwrap();
    let b = blend(&sheared, &sheared, 0.5, &ctx()).unwrap();
    let d = decompose(&b, &ctx()).unwrap();
    assert!(d.is_exact(1e-9));
    assert!(!b.approx_eq(&sheared, 1e-3));
}

#[test]
fn test_blend_rejects_non_finite_parameter() {
    let m = sample_transform();
    for t in [f64::NAN, f64::INFINITY] {
        assert!(matches!(
            blend(&m, &m, t, &ctx()),
            Err(TransformError::DecompositionFailed { .. })
        ));
    }
}
