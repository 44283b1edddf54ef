//! Property checks over seeded random transforms.
//!
//! Every test draws its inputs from a fixed-seed `StdRng`, so failures are
//! reproducible. Run with:
//!
//! ```bash
//! cargo test --test transform_properties
//! ```

use ghx_transform::geom::{Plane, Point3, Vec3};
use ghx_transform::transform::{
    GeometricContext, TransformOperation, blend, build, decompose, invert,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const SAMPLES: usize = 64;

// ============================================================================
// Test Helpers
// ============================================================================

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn random_vec(rng: &mut StdRng, range: f64) -> Vec3 {
    Vec3::new(
        rng.random_range(-range..range),
        rng.random_range(-range..range),
        rng.random_range(-range..range),
    )
}

fn random_point(rng: &mut StdRng, range: f64) -> Point3 {
    Point3::from_array(random_vec(rng, range).to_array())
}

fn random_direction(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = random_vec(rng, 1.0);
        if v.length() > 0.1 {
            if let Some(unit) = v.normalized() {
                return unit;
            }
        }
    }
}

fn random_plane(rng: &mut StdRng) -> Plane {
    loop {
        let normal = random_vec(rng, 1.0);
        if normal.length() < 0.1 {
            continue;
        }
        if let Some(plane) = Plane::from_normal(random_point(rng, 10.0), normal) {
            return plane;
        }
    }
}

/// A random operation whose matrix is exactly translation · rotation · scale.
fn random_shear_free(rng: &mut StdRng) -> TransformOperation {
    let ops = vec![
        TransformOperation::NonUniformScale {
            plane: Plane::world_xy(),
            sx: rng.random_range(0.5..3.0),
            sy: rng.random_range(0.5..3.0),
            sz: rng.random_range(0.5..3.0),
        },
        TransformOperation::rotation(
            rng.random_range(-PI..PI),
            random_direction(rng),
            random_point(rng, 5.0),
        ),
        TransformOperation::translate(random_vec(rng, 20.0)),
    ];
    TransformOperation::compound(ops)
}

fn negative_count(v: Vec3) -> usize {
    v.to_array().iter().filter(|c| **c < 0.0).count()
}

// ============================================================================
// Decomposition
// ============================================================================

#[test]
fn shear_free_transforms_round_trip_through_decomposition() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0001);
    for _ in 0..SAMPLES {
        let m = build(&random_shear_free(&mut rng), &ctx).expect("build");
        let d = decompose(&m, &ctx).expect("decompose");
        assert!(d.orthogonality_error < 1e-6);
        assert!(d.is_orthogonal);
        assert!(
            d.recompose().approx_eq(&m, 1e-9),
            "recomposed {:?} differs from {:?}",
            d.recompose(),
            m
        );
        assert!((d.rotation.norm() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn reflections_keep_a_proper_rotation() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0002);
    for _ in 0..SAMPLES {
        let op = TransformOperation::compound([
            random_shear_free(&mut rng),
            TransformOperation::Mirror(random_plane(&mut rng)),
        ]);
        let m = build(&op, &ctx).expect("build");
        assert!(m.linear().determinant() < 0.0);
        let d = decompose(&m, &ctx).expect("decompose");
        assert!(d.rotation.to_rotation().determinant() > 0.0);
        assert_eq!(negative_count(d.scale), 1);
        assert!(d.recompose().approx_eq(&m, 1e-9));
    }
}

#[test]
fn sheared_transforms_keep_residual_consistent() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0003);
    for _ in 0..SAMPLES {
        let shear = TransformOperation::Shear {
            plane: Plane::world_xy(),
            direction: Vec3::new(rng.random_range(0.5..1.0), rng.random_range(-1.0..1.0), 0.0),
            angle: rng.random_range(-0.6..0.6),
        };
        let op = TransformOperation::compound([shear, random_shear_free(&mut rng)]);
        let m = build(&op, &ctx).expect("build");
        let d = decompose(&m, &ctx).expect("decompose");
        assert!(d.orthogonality_error < 1e-4);
        assert!((d.residual * d.recompose()).approx_eq(&m, 1e-8));
    }
}

// ============================================================================
// Building and blending
// ============================================================================

#[test]
fn mirrors_are_involutions() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0004);
    for _ in 0..SAMPLES {
        let m = build(&TransformOperation::Mirror(random_plane(&mut rng)), &ctx).expect("build");
        assert!((m * m).approx_eq(&ghx_transform::AffineMatrix::IDENTITY, 1e-9));
    }
}

#[test]
fn projections_are_idempotent() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0005);
    for _ in 0..SAMPLES {
        let plane = random_plane(&mut rng);
        let m = build(&TransformOperation::Project(plane), &ctx).expect("build");
        assert!((m * m).approx_eq(&m, 1e-9));
        let p = m.apply_point(random_point(&mut rng, 50.0));
        assert!(plane.signed_distance(p).abs() < 1e-9);
    }
}

#[test]
fn inversion_undoes_random_transforms() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0006);
    for _ in 0..SAMPLES {
        let op = random_shear_free(&mut rng);
        let m = build(&op, &ctx).expect("build");
        let inv = invert(&op, &ctx).expect("invert");
        let p = random_point(&mut rng, 10.0);
        assert!(inv.apply_point(m.apply_point(p)).distance_to(p) < 1e-9);
    }
}

#[test]
fn blending_a_transform_with_itself_is_stable() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0007);
    for _ in 0..SAMPLES {
        let m = build(&random_shear_free(&mut rng), &ctx).expect("build");
        let t = rng.random_range(0.0..1.0);
        let b = blend(&m, &m, t, &ctx).expect("blend");
        assert!(b.approx_eq(&m, 1e-9));
    }
}

#[test]
fn blend_endpoints_match_inputs() {
    let ctx = GeometricContext::default();
    let mut rng = rng(0x5eed_0008);
    for _ in 0..SAMPLES {
        let a = build(&random_shear_free(&mut rng), &ctx).expect("build");
        let b = build(&random_shear_free(&mut rng), &ctx).expect("build");
        assert!(blend(&a, &b, 0.0, &ctx).expect("blend").approx_eq(&a, 1e-9));
        assert!(blend(&a, &b, 1.0, &ctx).expect("blend").approx_eq(&b, 1e-9));
    }
}
