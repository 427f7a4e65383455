//! Geometric primitives shared by the part pipeline.
//!
//! Plain `f64` value types: 2D and 3D points and vectors, a 4x4 affine
//! [`Transform`], an axis-aligned [`BoundingBox`] and the principal [`Axis`]
//! enum used by edge predicates and radial patterns.

pub mod axis;
pub mod bbox;
pub mod point;
pub mod transform;
pub mod vector;

pub use axis::Axis;
pub use bbox::BoundingBox;
pub use point::{Point2d, Point3d};
pub use transform::Transform;
pub use vector::{Vec2, Vec3};

/// Lengths below this are treated as zero when normalizing.
pub const LENGTH_EPSILON: f64 = 1e-12;
