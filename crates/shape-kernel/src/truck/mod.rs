//! TruckKernel: B-rep geometry backend wrapping the truck modeling crates.
//!
//! Profiles are validated by the same region code as the reference
//! kernel, then handed to truck's sweep builders. Booleans go through
//! truck-shapeops, blends are built as swept cross-section tools and
//! applied with the same booleans.

mod blend;
mod build;
mod introspect;
mod tessellation;

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt;

use part_geom::{BoundingBox, Point3d, Transform, Vec3};
use tracing::{debug, info, instrument, warn};
use truck_modeling::topology::{Edge, Face, Solid};
use truck_modeling::{builder, Rad};

use crate::curve::Curve;
use crate::region::{self, PlanarRegion};
use crate::traits::Kernel;
use crate::types::*;

/// Geometric tolerance handed to truck-shapeops.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Entity ids are `solid key * ENTITY_STRIDE + local index`.
const ENTITY_STRIDE: u64 = 1 << 20;

/// Local indices at or above this are edges, below are faces.
const EDGE_BASE: u64 = 1 << 19;

/// A stored solid: one truck solid per compound member, plus the
/// triangulation attached to each face in iteration order.
#[derive(Clone)]
pub(crate) struct Body {
    parts: Vec<Solid>,
    meshes: Vec<Option<FaceTriangulation>>,
}

impl Body {
    fn new(solid: Solid) -> Self {
        Self {
            parts: vec![solid],
            meshes: Vec::new(),
        }
    }

    pub(crate) fn faces(&self) -> impl Iterator<Item = &Face> {
        self.parts
            .iter()
            .flat_map(|s| s.boundaries().iter())
            .flat_map(|shell| shell.face_iter())
    }

    /// Every edge once, in first-seen order.
    pub(crate) fn edges(&self) -> Vec<Edge> {
        let mut seen = std::collections::HashSet::new();
        self.parts
            .iter()
            .flat_map(|s| s.boundaries().iter())
            .flat_map(|shell| shell.edge_iter())
            .filter(|e| seen.insert(e.id()))
            .map(|e| e.clone())
            .collect()
    }

    fn single(self, what: &str) -> Result<Solid, KernelError> {
        let mut parts = self.parts;
        match parts.len() {
            1 => Ok(parts.remove(0)),
            n => Err(KernelError::BooleanFailed {
                reason: format!("{what} operand has {n} parts"),
            }),
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        let points: Vec<Point3d> = self
            .edges()
            .iter()
            .flat_map(|e| tessellation::sample_edge(e, 8))
            .collect();
        BoundingBox::from_points(&points)
    }
}

/// Geometry kernel backed by the truck B-rep library.
pub struct TruckKernel {
    next_handle: u64,
    free_edges: HashMap<u64, Curve>,
    wires: HashMap<u64, Vec<Curve>>,
    profiles: HashMap<u64, PlanarRegion>,
    solids: HashMap<u64, Body>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            free_edges: HashMap::new(),
            wires: HashMap::new(),
            profiles: HashMap::new(),
            solids: HashMap::new(),
        }
    }

    /// Number of solids currently alive in this kernel.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn alloc_handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    fn store(&mut self, body: Body) -> SolidHandle {
        let key = self.alloc_handle();
        self.solids.insert(key, body);
        SolidHandle(key)
    }

    fn store_solid(&mut self, solid: Solid) -> SolidHandle {
        self.store(Body::new(solid))
    }

    fn take(&mut self, handle: SolidHandle) -> Result<Body, KernelError> {
        self.solids
            .remove(&handle.key())
            .ok_or(KernelError::HandleNotFound {
                kind: "solid",
                key: handle.key(),
            })
    }

    pub(crate) fn body(&self, key: u64) -> Option<&Body> {
        self.solids.get(&key)
    }

    fn take_profile(&mut self, profile: FaceHandle) -> Result<PlanarRegion, KernelError> {
        self.profiles
            .remove(&profile.0)
            .ok_or(KernelError::HandleNotFound { kind: "face", key: profile.0 })
    }

    fn store_curve(&mut self, curve: Curve) -> EdgeHandle {
        let key = self.alloc_handle();
        self.free_edges.insert(key, curve);
        EdgeHandle(key)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TruckKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TruckKernel")
            .field("next_handle", &self.next_handle)
            .field("solids", &self.solids.len())
            .field("profiles", &self.profiles.len())
            .finish_non_exhaustive()
    }
}

fn positive(value: f64, what: &str) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            reason: format!("{what} must be positive, got {value}"),
        })
    }
}

impl Kernel for TruckKernel {
    fn make_line_edge(&mut self, start: Point3d, end: Point3d) -> Result<EdgeHandle, KernelError> {
        Ok(self.store_curve(Curve::line(start, end)?))
    }

    fn make_arc_edge(
        &mut self,
        center: Point3d,
        axis: Vec3,
        start: Point3d,
        sweep: f64,
    ) -> Result<EdgeHandle, KernelError> {
        Ok(self.store_curve(Curve::arc(center, axis, start, sweep)?))
    }

    fn make_wire(&mut self, edges: Vec<EdgeHandle>) -> Result<WireHandle, KernelError> {
        let curves = edges
            .into_iter()
            .map(|h| {
                self.free_edges
                    .remove(&h.0)
                    .ok_or(KernelError::HandleNotFound { kind: "edge", key: h.0 })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let chain = region::chain_curves(curves)?;
        let key = self.alloc_handle();
        self.wires.insert(key, chain);
        Ok(WireHandle(key))
    }

    fn make_face(
        &mut self,
        outer: WireHandle,
        holes: Vec<WireHandle>,
    ) -> Result<FaceHandle, KernelError> {
        let mut take_wire = |h: WireHandle| {
            self.wires
                .remove(&h.0)
                .ok_or(KernelError::HandleNotFound { kind: "wire", key: h.0 })
        };
        let outer = take_wire(outer)?;
        let holes = holes
            .into_iter()
            .map(&mut take_wire)
            .collect::<Result<Vec<_>, _>>()?;
        let region = region::planar_region(outer, holes)?;
        let key = self.alloc_handle();
        self.profiles.insert(key, region);
        Ok(FaceHandle(key))
    }

    #[instrument(skip(self, profile))]
    fn revolve(
        &mut self,
        profile: FaceHandle,
        axis_origin: Point3d,
        axis_direction: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        let region = self.take_profile(profile)?;
        let axis = region.revolution_axis(axis_origin, axis_direction)?;
        let origin = build::point(&axis_origin);
        let axis = build::vector(&axis);

        let outer = PlanarRegion {
            holes: Vec::new(),
            ..region.clone()
        };
        let face = build::region_face(&outer)?;
        let mut solid = build::outward(builder::rsweep(&face, origin, axis, Rad(TAU)));

        // Revolved holes leave separate cavities; carve them out one by one.
        for hole in &region.holes {
            let cavity = region::planar_region(hole.clone(), Vec::new())?;
            let face = build::region_face(&cavity)?;
            let mut tool = build::outward(builder::rsweep(&face, origin, axis, Rad(TAU)));
            tool.not();
            solid = truck_shapeops::and(&solid, &tool, BOOLEAN_TOLERANCE).ok_or_else(|| {
                KernelError::BooleanFailed {
                    reason: "carving a revolved hole failed".to_string(),
                }
            })?;
        }
        info!(faces = build::face_count(&solid), "revolved profile");
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self, profile))]
    fn extrude(&mut self, profile: FaceHandle, vector: Vec3) -> Result<SolidHandle, KernelError> {
        let region = self.take_profile(profile)?;
        region.extrusion_direction(vector)?;
        let face = build::region_face(&region)?;
        let solid = build::outward(builder::tsweep(&face, build::vector(&vector)));
        info!(faces = build::face_count(&solid), "extruded profile");
        Ok(self.store_solid(solid))
    }

    fn boolean_union(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let a = self.take(target)?.single("union")?;
        let b = self.take(tool)?.single("union")?;
        let result = truck_shapeops::or(&a, &b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        debug!("union");
        Ok(self.store_solid(result))
    }

    fn boolean_difference(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let target = self.take(target)?;
        let tool = self.take(tool)?;
        if !target.bounding_box().intersects(&tool.bounding_box()) {
            warn!("difference tool does not reach the target");
            return Ok(self.store(target));
        }
        let a = target.single("difference")?;
        // Subtraction is A and not B; not() flips in place.
        let mut b = tool.single("difference")?;
        b.not();
        let result = truck_shapeops::and(&a, &b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        debug!("difference");
        Ok(self.store_solid(result))
    }

    fn boolean_intersection(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let target = self.take(target)?;
        let tool = self.take(tool)?;
        if target
            .bounding_box()
            .intersection(&tool.bounding_box())
            .is_empty()
        {
            return Err(KernelError::BooleanFailed {
                reason: "intersection operands do not overlap".to_string(),
            });
        }
        let a = target.single("intersection")?;
        let b = tool.single("intersection")?;
        let result = truck_shapeops::and(&a, &b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    #[instrument(skip(self, solid, edges), fields(edges = edges.len()))]
    fn chamfer_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        distance: f64,
    ) -> Result<SolidHandle, KernelError> {
        positive(distance, "chamfer distance")?;
        let key = solid.key();
        let body = self.take(solid)?;
        let result = blend::apply(&body, key, edges, blend::Blend::Chamfer(distance))?;
        Ok(self.store_solid(result))
    }

    #[instrument(skip(self, solid, edges), fields(edges = edges.len()))]
    fn fillet_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        positive(radius, "fillet radius")?;
        let key = solid.key();
        let body = self.take(solid)?;
        let result = blend::apply(&body, key, edges, blend::Blend::Fillet(radius))?;
        Ok(self.store_solid(result))
    }

    fn duplicate(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let copy = self
            .solids
            .get(&solid.key())
            .cloned()
            .ok_or(KernelError::HandleNotFound {
                kind: "solid",
                key: solid.key(),
            })?;
        Ok(self.store(copy))
    }

    fn transformed(
        &mut self,
        solid: SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        let body = self.take(solid)?;
        let matrix = build::matrix(transform);
        let mirrored = build::determinant(transform) < 0.0;
        let parts = body
            .parts
            .iter()
            .map(|part| {
                let moved = builder::transformed(part, matrix);
                if mirrored {
                    build::outward(moved)
                } else {
                    moved
                }
            })
            .collect();
        Ok(self.store(Body {
            parts,
            meshes: Vec::new(),
        }))
    }

    fn make_compound(&mut self, parts: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        if parts.is_empty() {
            return Err(KernelError::InvalidParameter {
                reason: "compound needs at least one part".to_string(),
            });
        }
        let mut out = Body {
            parts: Vec::new(),
            meshes: Vec::new(),
        };
        for part in parts {
            out.parts.extend(self.take(part)?.parts);
        }
        Ok(self.store(out))
    }

    #[instrument(skip(self, solid))]
    fn triangulate(&mut self, solid: &SolidHandle, tolerance: f64) -> Result<(), KernelError> {
        positive(tolerance, "triangulation tolerance")?;
        let key = solid.key();
        let body = self
            .solids
            .get_mut(&key)
            .ok_or(KernelError::HandleNotFound { kind: "solid", key })?;
        let meshes: Vec<Option<FaceTriangulation>> = body
            .parts
            .iter()
            .flat_map(|part| tessellation::face_meshes(part, tolerance))
            .map(|mesh| mesh.map(|m| tessellation::to_face_triangulation(&m)))
            .collect();
        let skipped = meshes.iter().filter(|m| m.is_none()).count();
        if skipped > 0 {
            warn!(skipped, "faces without a triangulation");
        }
        let triangles: usize = meshes.iter().flatten().map(|m| m.triangles.len()).sum();
        info!(faces = meshes.len(), triangles, "triangulated solid");
        body.meshes = meshes;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KernelIntrospect;
    use approx::assert_relative_eq;

    fn rectangle(k: &mut TruckKernel, x0: f64, y0: f64, x1: f64, y1: f64) -> FaceHandle {
        let corners = [
            Point3d::new(x0, y0, 0.0),
            Point3d::new(x1, y0, 0.0),
            Point3d::new(x1, y1, 0.0),
            Point3d::new(x0, y1, 0.0),
        ];
        let edges = (0..4)
            .map(|i| k.make_line_edge(corners[i], corners[(i + 1) % 4]).unwrap())
            .collect();
        let wire = k.make_wire(edges).unwrap();
        k.make_face(wire, vec![]).unwrap()
    }

    fn disc(k: &mut TruckKernel, cx: f64, cy: f64, r: f64) -> FaceHandle {
        let edge = k
            .make_arc_edge(Point3d::new(cx, cy, 0.0), Vec3::Z, Point3d::new(cx + r, cy, 0.0), TAU)
            .unwrap();
        let wire = k.make_wire(vec![edge]).unwrap();
        k.make_face(wire, vec![]).unwrap()
    }

    fn total_area(k: &TruckKernel, solid: &SolidHandle) -> f64 {
        k.list_faces(solid)
            .into_iter()
            .filter_map(|f| k.face_triangulation(f))
            .map(|m| tessellation::mesh_area(&m))
            .sum()
    }

    /// Area of the triangulated faces lying in the plane `z = height`.
    fn area_at_height(k: &TruckKernel, solid: &SolidHandle, height: f64) -> f64 {
        k.list_faces(solid)
            .into_iter()
            .filter_map(|f| k.face_triangulation(f))
            .filter(|m| m.nodes.iter().all(|p| (p.z - height).abs() < 1e-4))
            .map(|m| tessellation::mesh_area(&m))
            .sum()
    }

    #[test]
    fn test_extruded_rectangle_has_box_topology() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 1.0, 2.0);
        let solid = k.extrude(face, Vec3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(k.list_faces(&solid).len(), 6, "Extruded rectangle should have 6 faces");
        assert_eq!(k.list_edges(&solid).len(), 12, "Box should have 12 edges");
    }

    #[test]
    fn test_box_triangulation_covers_surface() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 2.0, 3.0);
        let solid = k.extrude(face, Vec3::new(0.0, 0.0, 4.0)).unwrap();
        k.triangulate(&solid, 0.1).unwrap();
        assert_relative_eq!(total_area(&k, &solid), 2.0 * (6.0 + 12.0 + 8.0), epsilon = 1e-6);
    }

    #[test]
    fn test_downward_extrusion_is_outward_oriented() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 1.0, 1.0);
        let solid = k.extrude(face, Vec3::new(0.0, 0.0, -2.0)).unwrap();
        let body = k.body(solid.key()).unwrap();
        assert!(tessellation::signed_volume(&body.parts[0], 0.1) > 1.9);
    }

    #[test]
    fn test_through_hole_removes_disc_from_top_face() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 10.0, 10.0);
        let block = k.extrude(face, Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let hole = disc(&mut k, 5.0, 5.0, 2.0);
        let hole = k.extrude(hole, Vec3::new(0.0, 0.0, 7.0)).unwrap();
        let hole = k
            .transformed(hole, &Transform::translation(Vec3::new(0.0, 0.0, -1.0)))
            .unwrap();
        let drilled = k.boolean_difference(block, hole).unwrap();
        k.triangulate(&drilled, 0.002).unwrap();

        let expected = 100.0 - std::f64::consts::PI * 4.0;
        assert_relative_eq!(area_at_height(&k, &drilled, 5.0), expected, epsilon = 0.1);
    }

    #[test]
    fn test_box_edges_are_lines_and_rims_are_circles() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 1.0, 1.0);
        let block = k.extrude(face, Vec3::Z).unwrap();
        for edge in k.list_edges(&block) {
            assert_eq!(k.edge_curve_type(edge), Some(CurveKind::Line));
        }

        let face = disc(&mut k, 0.0, 0.0, 3.0);
        let cylinder = k.extrude(face, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        let rims: Vec<(Point3d, f64)> = k
            .list_edges(&cylinder)
            .into_iter()
            .filter_map(|e| k.circle_center_and_radius(e))
            .collect();
        assert!(rims.len() >= 2);
        for (center, radius) in rims {
            assert_relative_eq!(radius, 3.0, epsilon = 1e-3);
            assert!(center.z.abs() < 1e-3 || (center.z - 2.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_revolved_ring_has_annular_end_faces() {
        let mut k = TruckKernel::new();
        // Section in the xz plane, revolved about z: inner radius 1, outer 2, height 1.
        let corners = [
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 1.0),
            Point3d::new(1.0, 0.0, 1.0),
        ];
        let edges = (0..4)
            .map(|i| k.make_line_edge(corners[i], corners[(i + 1) % 4]).unwrap())
            .collect();
        let wire = k.make_wire(edges).unwrap();
        let face = k.make_face(wire, vec![]).unwrap();
        let ring = k.revolve(face, Point3d::ORIGIN, Vec3::Z).unwrap();
        k.triangulate(&ring, 0.002).unwrap();

        let annulus = std::f64::consts::PI * (4.0 - 1.0);
        assert_relative_eq!(area_at_height(&k, &ring, 1.0), annulus, epsilon = 0.05);
        assert_relative_eq!(area_at_height(&k, &ring, 0.0), annulus, epsilon = 0.05);
    }

    #[test]
    fn test_revolve_profile_crossing_axis_fails() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, -1.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            k.revolve(face, Point3d::ORIGIN, Vec3::Y),
            Err(KernelError::ProfileCrossesAxis)
        ));
    }

    #[test]
    fn test_chamfer_removes_material_from_box_edge() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 4.0, 4.0);
        let block = k.extrude(face, Vec3::new(0.0, 0.0, 4.0)).unwrap();
        let top_edge = k
            .list_edges(&block)
            .into_iter()
            .find(|&e| {
                matches!(k.line_endpoints(e), Some((a, b))
                    if (a.z - 4.0).abs() < 1e-9 && (b.z - 4.0).abs() < 1e-9
                        && (a.x - 4.0).abs() < 1e-9 && (b.x - 4.0).abs() < 1e-9)
            })
            .unwrap();
        let chamfered = k.chamfer_edges(block, &[top_edge], 1.0).unwrap();
        k.triangulate(&chamfered, 0.05).unwrap();

        // The top face loses a 1 x 4 strip.
        assert_relative_eq!(area_at_height(&k, &chamfered, 4.0), 12.0, epsilon = 0.05);
    }

    #[test]
    fn test_blend_rejects_non_positive_size() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 1.0, 1.0);
        let block = k.extrude(face, Vec3::Z).unwrap();
        let edge = k.list_edges(&block)[0];
        assert!(matches!(
            k.fillet_edges(block, &[edge], 0.0),
            Err(KernelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_duplicate_assigns_fresh_ids() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 1.0, 1.0);
        let a = k.extrude(face, Vec3::Z).unwrap();
        let b = k.duplicate(&a).unwrap();
        let ea = k.list_edges(&a);
        let eb = k.list_edges(&b);
        assert_eq!(ea.len(), eb.len());
        assert!(ea.iter().all(|e| !eb.contains(e)));
    }

    #[test]
    fn test_mirror_keeps_outward_orientation() {
        let mut k = TruckKernel::new();
        let face = rectangle(&mut k, 0.0, 0.0, 1.0, 1.0);
        let block = k.extrude(face, Vec3::Z).unwrap();
        let mirrored = k
            .transformed(block, &Transform::scaling(-1.0, 1.0, 1.0))
            .unwrap();
        let body = k.body(mirrored.key()).unwrap();
        assert!(tessellation::signed_volume(&body.parts[0], 0.1) > 0.9);
    }

    #[test]
    fn test_compound_of_nothing_fails() {
        let mut k = TruckKernel::new();
        assert!(k.make_compound(vec![]).is_err());
    }
}
