//! Call-recording kernel wrapper.
//!
//! Forwards every call to an inner kernel and keeps an ordered log of the
//! construction calls made, so callers can check how a part was built
//! (for example how many booleans a radial pattern issued).

use part_geom::{Point3d, Transform, Vec3};

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

/// One forwarded construction call.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelCall {
    LineEdge,
    ArcEdge { sweep: f64 },
    Wire { edges: usize },
    Face { holes: usize },
    Revolve { axis_direction: Vec3 },
    Extrude { vector: Vec3 },
    Union,
    Difference,
    Intersection,
    Chamfer { edges: usize, distance: f64 },
    Fillet { edges: usize, radius: f64 },
    Duplicate,
    Transformed,
    Compound { parts: usize },
    Triangulate { tolerance: f64 },
}

#[derive(Debug, Default)]
pub struct RecordingKernel<K> {
    inner: K,
    calls: Vec<KernelCall>,
}

impl<K> RecordingKernel<K> {
    pub fn new(inner: K) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[KernelCall] {
        &self.calls
    }

    pub fn inner(&self) -> &K {
        &self.inner
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&KernelCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn union_count(&self) -> usize {
        self.count(|c| matches!(c, KernelCall::Union))
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl<K: Kernel> Kernel for RecordingKernel<K> {
    fn make_line_edge(&mut self, start: Point3d, end: Point3d) -> Result<EdgeHandle, KernelError> {
        self.calls.push(KernelCall::LineEdge);
        self.inner.make_line_edge(start, end)
    }

    fn make_arc_edge(
        &mut self,
        center: Point3d,
        axis: Vec3,
        start: Point3d,
        sweep: f64,
    ) -> Result<EdgeHandle, KernelError> {
        self.calls.push(KernelCall::ArcEdge { sweep });
        self.inner.make_arc_edge(center, axis, start, sweep)
    }

    fn make_wire(&mut self, edges: Vec<EdgeHandle>) -> Result<WireHandle, KernelError> {
        self.calls.push(KernelCall::Wire { edges: edges.len() });
        self.inner.make_wire(edges)
    }

    fn make_face(
        &mut self,
        outer: WireHandle,
        holes: Vec<WireHandle>,
    ) -> Result<FaceHandle, KernelError> {
        self.calls.push(KernelCall::Face { holes: holes.len() });
        self.inner.make_face(outer, holes)
    }

    fn revolve(
        &mut self,
        profile: FaceHandle,
        axis_origin: Point3d,
        axis_direction: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Revolve { axis_direction });
        self.inner.revolve(profile, axis_origin, axis_direction)
    }

    fn extrude(&mut self, profile: FaceHandle, vector: Vec3) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Extrude { vector });
        self.inner.extrude(profile, vector)
    }

    fn boolean_union(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Union);
        self.inner.boolean_union(target, tool)
    }

    fn boolean_difference(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Difference);
        self.inner.boolean_difference(target, tool)
    }

    fn boolean_intersection(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Intersection);
        self.inner.boolean_intersection(target, tool)
    }

    fn chamfer_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        distance: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Chamfer {
            edges: edges.len(),
            distance,
        });
        self.inner.chamfer_edges(solid, edges, distance)
    }

    fn fillet_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Fillet {
            edges: edges.len(),
            radius,
        });
        self.inner.fillet_edges(solid, edges, radius)
    }

    fn duplicate(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Duplicate);
        self.inner.duplicate(solid)
    }

    fn transformed(
        &mut self,
        solid: SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Transformed);
        self.inner.transformed(solid, transform)
    }

    fn make_compound(&mut self, parts: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        self.calls.push(KernelCall::Compound { parts: parts.len() });
        self.inner.make_compound(parts)
    }

    fn triangulate(&mut self, solid: &SolidHandle, tolerance: f64) -> Result<(), KernelError> {
        self.calls.push(KernelCall::Triangulate { tolerance });
        self.inner.triangulate(solid, tolerance)
    }
}

impl<K: KernelIntrospect> KernelIntrospect for RecordingKernel<K> {
    fn list_edges(&self, solid: &SolidHandle) -> Vec<EdgeId> {
        self.inner.list_edges(solid)
    }

    fn list_faces(&self, solid: &SolidHandle) -> Vec<FaceId> {
        self.inner.list_faces(solid)
    }

    fn edge_curve(&self, edge: EdgeId) -> Option<EdgeCurve> {
        self.inner.edge_curve(edge)
    }

    fn face_triangulation(&self, face: FaceId) -> Option<FaceTriangulation> {
        self.inner.face_triangulation(face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceKernel;

    #[test]
    fn test_records_calls_in_order() {
        let mut k = RecordingKernel::new(ReferenceKernel::new());
        let a = k
            .make_line_edge(Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 0.0, 0.0))
            .unwrap();
        let _ = k.make_wire(vec![a]);
        assert_eq!(
            k.calls(),
            &[KernelCall::LineEdge, KernelCall::Wire { edges: 1 }]
        );
        k.clear();
        assert!(k.calls().is_empty());
    }

    #[test]
    fn test_failed_call_is_still_recorded() {
        let mut k = RecordingKernel::new(ReferenceKernel::new());
        let p = Point3d::new(1.0, 1.0, 1.0);
        assert!(k.make_line_edge(p, p).is_err());
        assert_eq!(k.count(|c| matches!(c, KernelCall::LineEdge)), 1);
    }
}
