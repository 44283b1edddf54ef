mod core;
mod linear;
mod path;
mod plane;
mod quaternion;

pub use self::core::{AffineMatrix, Point3, Tolerance, Vec3};
pub use linear::Mat3;
pub use path::{CurveEvaluator, LineCurve, PolylineCurve};
pub use plane::{Plane, PlaneDefect};
pub use quaternion::Quaternion;
