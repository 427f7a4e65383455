use part_geom::{Point3d, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a solid in the geometry kernel.
///
/// Move-only: every consuming kernel call takes the handle by value, so a
/// solid that was fed into a boolean or a blend cannot be reused afterwards.
/// Valid only for the kernel instance that produced it.
#[derive(Debug, PartialEq, Eq)]
pub struct SolidHandle(pub(crate) u64);

/// A free edge, not yet assembled into a wire.
#[derive(Debug, PartialEq, Eq)]
pub struct EdgeHandle(pub(crate) u64);

/// An ordered, connected chain of edges.
#[derive(Debug, PartialEq, Eq)]
pub struct WireHandle(pub(crate) u64);

/// A bounded planar region, input to revolve and extrude.
#[derive(Debug, PartialEq, Eq)]
pub struct FaceHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn key(&self) -> u64 {
        self.0
    }
}

/// Identifier of an edge inside a solid. Stable for the lifetime of the solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

/// Identifier of a face inside a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u64);

/// Coarse classification of an edge's underlying curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    Line,
    Circle,
    Other,
}

/// Geometry of an edge as reported by introspection, in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeCurve {
    Line {
        start: Point3d,
        end: Point3d,
    },
    /// Full circle or circular arc. `sweep` is signed about `axis`.
    Circle {
        center: Point3d,
        axis: Vec3,
        radius: f64,
        start: Point3d,
        sweep: f64,
    },
    Other,
}

impl EdgeCurve {
    pub fn kind(&self) -> CurveKind {
        match self {
            EdgeCurve::Line { .. } => CurveKind::Line,
            EdgeCurve::Circle { .. } => CurveKind::Circle,
            EdgeCurve::Other => CurveKind::Other,
        }
    }
}

/// Per-face triangulation in the face's local frame.
///
/// `location` maps local node coordinates into model space; faces of solids
/// produced by rigid copies carry the accumulated copy transform here.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTriangulation {
    pub nodes: Vec<Point3d>,
    pub triangles: Vec<[usize; 3]>,
    pub location: Transform,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    #[error("wire is disconnected at edge {index}")]
    DisconnectedWire { index: usize },

    #[error("wire is not closed")]
    OpenWire,

    #[error("profile is not planar")]
    NonPlanarProfile,

    #[error("profile intersects itself")]
    SelfIntersectingProfile,

    #[error("profile crosses the revolution axis")]
    ProfileCrossesAxis,

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("chamfer failed: {reason}")]
    ChamferFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("triangulation failed: {reason}")]
    TriangulationFailed { reason: String },

    #[error("edge not found: {id:?}")]
    EdgeNotFound { id: EdgeId },

    #[error("{kind} handle {key} not found")]
    HandleNotFound { kind: &'static str, key: u64 },
}
