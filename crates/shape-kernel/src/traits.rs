use part_geom::{Point3d, Transform, Vec3};

use crate::types::*;

/// Core geometry kernel trait: shape construction and modification.
///
/// Implemented by [`crate::TruckKernel`], by [`crate::ReferenceKernel`] (an
/// in-tree test double) and by [`crate::RecordingKernel`], which forwards
/// to another kernel.
pub trait Kernel {
    fn make_line_edge(&mut self, start: Point3d, end: Point3d) -> Result<EdgeHandle, KernelError>;

    /// Circular arc starting at `start`, swept by the signed angle `sweep`
    /// about `axis` through `center`. A sweep of a full turn makes a circle.
    fn make_arc_edge(
        &mut self,
        center: Point3d,
        axis: Vec3,
        start: Point3d,
        sweep: f64,
    ) -> Result<EdgeHandle, KernelError>;

    /// Chain edges into a wire. Edges may be given in either direction.
    fn make_wire(&mut self, edges: Vec<EdgeHandle>) -> Result<WireHandle, KernelError>;

    /// Planar face bounded by a closed outer wire, with optional holes.
    fn make_face(
        &mut self,
        outer: WireHandle,
        holes: Vec<WireHandle>,
    ) -> Result<FaceHandle, KernelError>;

    /// Full revolution of a profile face about an axis lying in its plane.
    fn revolve(
        &mut self,
        profile: FaceHandle,
        axis_origin: Point3d,
        axis_direction: Vec3,
    ) -> Result<SolidHandle, KernelError>;

    /// Linear sweep of a profile face along `vector`.
    fn extrude(&mut self, profile: FaceHandle, vector: Vec3) -> Result<SolidHandle, KernelError>;

    fn boolean_union(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// `target` minus `tool`.
    fn boolean_difference(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    fn boolean_intersection(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Equal-distance chamfer on the given edges of `solid`.
    fn chamfer_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        distance: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Constant-radius fillet on the given edges of `solid`.
    fn fillet_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        radius: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Independent copy of a solid, with fresh entity ids.
    fn duplicate(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError>;

    /// Apply a rigid transform to a solid.
    fn transformed(
        &mut self,
        solid: SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError>;

    /// Gather solids into one compound without boolean interaction.
    fn make_compound(&mut self, parts: Vec<SolidHandle>) -> Result<SolidHandle, KernelError>;

    /// Attach a triangulation to every face of `solid`, within `tolerance`.
    fn triangulate(&mut self, solid: &SolidHandle, tolerance: f64) -> Result<(), KernelError>;
}

/// Read-only topology queries.
pub trait KernelIntrospect {
    fn list_edges(&self, solid: &SolidHandle) -> Vec<EdgeId>;

    fn list_faces(&self, solid: &SolidHandle) -> Vec<FaceId>;

    fn edge_curve(&self, edge: EdgeId) -> Option<EdgeCurve>;

    /// Triangulation attached by the last [`Kernel::triangulate`] call, if any.
    fn face_triangulation(&self, face: FaceId) -> Option<FaceTriangulation>;

    fn edge_curve_type(&self, edge: EdgeId) -> Option<CurveKind> {
        self.edge_curve(edge).map(|c| c.kind())
    }

    fn circle_center_and_radius(&self, edge: EdgeId) -> Option<(Point3d, f64)> {
        match self.edge_curve(edge)? {
            EdgeCurve::Circle { center, radius, .. } => Some((center, radius)),
            _ => None,
        }
    }

    fn line_endpoints(&self, edge: EdgeId) -> Option<(Point3d, Point3d)> {
        match self.edge_curve(edge)? {
            EdgeCurve::Line { start, end } => Some((start, end)),
            _ => None,
        }
    }
}
