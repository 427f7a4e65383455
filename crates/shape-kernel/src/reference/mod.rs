//! ReferenceKernel: deterministic in-tree test double.
//!
//! Builds real sweep topology (edges with their curves, faces with their
//! surfaces) so that edge predicates and mesh extraction see genuine
//! geometry. Booleans are topological merges without trimming, and blends
//! add setback edges plus a band face without cutting the neighbours.

mod blend;
mod construct;
mod mesh;
mod topology;

use std::collections::HashMap;

use part_geom::{Point3d, Transform, Vec3};
use tracing::{debug, info, instrument, warn};

use crate::curve::Curve;
use crate::region::{self, PlanarRegion};
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use topology::{FaceRole, RefSolid};

/// Deterministic reference implementation of [`Kernel`] and [`KernelIntrospect`].
///
/// Entity ids are allocated from a single counter, so the same call
/// sequence always yields the same ids.
#[derive(Debug)]
pub struct ReferenceKernel {
    next_id: u64,
    next_handle: u64,
    free_edges: HashMap<u64, Curve>,
    wires: HashMap<u64, Vec<Curve>>,
    profiles: HashMap<u64, PlanarRegion>,
    solids: HashMap<u64, RefSolid>,
}

impl ReferenceKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
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

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: RefSolid) -> SolidHandle {
        let key = self.alloc_handle();
        self.solids.insert(key, solid);
        SolidHandle(key)
    }

    fn take(&mut self, handle: SolidHandle) -> Result<RefSolid, KernelError> {
        self.solids
            .remove(&handle.key())
            .ok_or(KernelError::HandleNotFound {
                kind: "solid",
                key: handle.key(),
            })
    }

    fn get(&self, handle: &SolidHandle) -> Result<&RefSolid, KernelError> {
        self.solids
            .get(&handle.key())
            .ok_or(KernelError::HandleNotFound {
                kind: "solid",
                key: handle.key(),
            })
    }

    fn find_edge(&self, id: EdgeId) -> Option<&topology::RefEdge> {
        self.solids
            .values()
            .flat_map(|s| s.edges.iter())
            .find(|e| e.id == id)
    }

    fn find_face(&self, id: FaceId) -> Option<&topology::RefFace> {
        self.solids
            .values()
            .flat_map(|s| s.faces.iter())
            .find(|f| f.id == id)
    }

    /// Copy of `solid` with fresh ids for every edge and face.
    fn renumbered(&mut self, solid: &RefSolid) -> RefSolid {
        let mut face_ids = HashMap::new();
        let mut out = RefSolid::default();
        for face in &solid.faces {
            let mut copy = face.clone();
            copy.id = FaceId(self.alloc_id());
            face_ids.insert(face.id, copy.id);
            out.faces.push(copy);
        }
        for edge in &solid.edges {
            let mut copy = edge.clone();
            copy.id = EdgeId(self.alloc_id());
            for u in &mut copy.uses {
                u.face = face_ids.get(&u.face).copied().unwrap_or(u.face);
            }
            out.edges.push(copy);
        }
        out
    }
}

impl Default for ReferenceKernel {
    fn default() -> Self {
        Self::new()
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

impl Kernel for ReferenceKernel {
    fn make_line_edge(&mut self, start: Point3d, end: Point3d) -> Result<EdgeHandle, KernelError> {
        let curve = Curve::line(start, end)?;
        let key = self.alloc_handle();
        self.free_edges.insert(key, curve);
        Ok(EdgeHandle(key))
    }

    fn make_arc_edge(
        &mut self,
        center: Point3d,
        axis: Vec3,
        start: Point3d,
        sweep: f64,
    ) -> Result<EdgeHandle, KernelError> {
        let curve = Curve::arc(center, axis, start, sweep)?;
        let key = self.alloc_handle();
        self.free_edges.insert(key, curve);
        Ok(EdgeHandle(key))
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
        let region = self
            .profiles
            .remove(&profile.0)
            .ok_or(KernelError::HandleNotFound { kind: "face", key: profile.0 })?;
        let solid = self.build_revolution(region, axis_origin, axis_direction)?;
        info!(faces = solid.faces.len(), edges = solid.edges.len(), "revolved profile");
        Ok(self.store(solid))
    }

    #[instrument(skip(self, profile))]
    fn extrude(&mut self, profile: FaceHandle, vector: Vec3) -> Result<SolidHandle, KernelError> {
        let region = self
            .profiles
            .remove(&profile.0)
            .ok_or(KernelError::HandleNotFound { kind: "face", key: profile.0 })?;
        let solid = self.build_extrusion(region, vector)?;
        info!(faces = solid.faces.len(), edges = solid.edges.len(), "extruded profile");
        Ok(self.store(solid))
    }

    fn boolean_union(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let mut a = self.take(target)?;
        let b = self.take(tool)?;
        if a.is_empty() || b.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "union operand has no faces".to_string(),
            });
        }
        a.absorb(b);
        debug!(faces = a.faces.len(), "union");
        Ok(self.store(a))
    }

    fn boolean_difference(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let mut a = self.take(target)?;
        let b = self.take(tool)?;
        if a.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "difference target has no faces".to_string(),
            });
        }
        if !a.bounding_box().intersects(&b.bounding_box()) {
            warn!("difference tool does not reach the target");
            return Ok(self.store(a));
        }

        // The tool's caps vanish; its lateral faces bound the cavity, seen from outside.
        let caps: Vec<FaceId> = b
            .faces
            .iter()
            .filter(|f| f.role == FaceRole::Cap)
            .map(|f| f.id)
            .collect();
        a.faces.extend(
            b.faces
                .into_iter()
                .filter(|f| f.role != FaceRole::Cap)
                .map(|mut f| {
                    f.reversed = !f.reversed;
                    f
                }),
        );
        a.edges.extend(b.edges.into_iter().map(|mut e| {
            for u in &mut e.uses {
                if caps.contains(&u.face) {
                    u.inward = u.inward.negated();
                }
            }
            e
        }));
        debug!(faces = a.faces.len(), "difference");
        Ok(self.store(a))
    }

    fn boolean_intersection(
        &mut self,
        target: SolidHandle,
        tool: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let a = self.take(target)?;
        let b = self.take(tool)?;
        let (box_a, box_b) = (a.bounding_box(), b.bounding_box());
        let overlap = box_a.intersection(&box_b);
        if overlap.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "intersection operands do not overlap".to_string(),
            });
        }
        let region = overlap.expanded(region::CONNECT_TOLERANCE);
        let mut out = RefSolid::default();
        for solid in [a, b] {
            out.faces.extend(
                solid
                    .faces
                    .into_iter()
                    .filter(|f| f.bounding_box().intersects(&region)),
            );
            out.edges.extend(
                solid
                    .edges
                    .into_iter()
                    .filter(|e| e.curve.bounding_box().intersects(&region)),
            );
        }
        if out.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "intersection is empty".to_string(),
            });
        }
        Ok(self.store(out))
    }

    #[instrument(skip(self, solid, edges), fields(edges = edges.len()))]
    fn chamfer_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        distance: f64,
    ) -> Result<SolidHandle, KernelError> {
        positive(distance, "chamfer distance")?;
        let body = self.take(solid)?;
        let body = self.chamfer_solid(body, edges, distance)?;
        Ok(self.store(body))
    }

    #[instrument(skip(self, solid, edges), fields(edges = edges.len()))]
    fn fillet_edges(
        &mut self,
        solid: SolidHandle,
        edges: &[EdgeId],
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        positive(radius, "fillet radius")?;
        let body = self.take(solid)?;
        let body = self.fillet_solid(body, edges, radius)?;
        Ok(self.store(body))
    }

    fn duplicate(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let source = self.get(solid)?.clone();
        let copy = self.renumbered(&source);
        Ok(self.store(copy))
    }

    fn transformed(
        &mut self,
        solid: SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        let mut body = self.take(solid)?;
        for edge in &mut body.edges {
            edge.curve = edge.curve.transformed(transform);
            for u in &mut edge.uses {
                u.inward = u.inward.transformed(transform);
            }
        }
        for face in &mut body.faces {
            face.location = transform.then(&face.location);
        }
        Ok(self.store(body))
    }

    fn make_compound(&mut self, parts: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        if parts.is_empty() {
            return Err(KernelError::InvalidParameter {
                reason: "compound needs at least one part".to_string(),
            });
        }
        let mut out = RefSolid::default();
        for part in parts {
            out.absorb(self.take(part)?);
        }
        Ok(self.store(out))
    }

    #[instrument(skip(self, solid))]
    fn triangulate(&mut self, solid: &SolidHandle, tolerance: f64) -> Result<(), KernelError> {
        positive(tolerance, "triangulation tolerance")?;
        let key = solid.key();
        let body = self.solids.get_mut(&key).ok_or(KernelError::HandleNotFound { kind: "solid", key })?;
        let mut triangles = 0usize;
        for face in &mut body.faces {
            let stale = face
                .mesh
                .as_ref()
                .map_or(true, |m| m.tolerance != tolerance);
            if stale {
                face.mesh = Some(mesh::mesh_face(face, tolerance)?);
            }
            triangles += face.mesh.as_ref().map_or(0, |m| m.triangles.len());
        }
        info!(faces = body.faces.len(), triangles, "triangulated solid");
        Ok(())
    }
}

impl KernelIntrospect for ReferenceKernel {
    fn list_edges(&self, solid: &SolidHandle) -> Vec<EdgeId> {
        self.get(solid)
            .map(|s| s.edges.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn list_faces(&self, solid: &SolidHandle) -> Vec<FaceId> {
        self.get(solid)
            .map(|s| s.faces.iter().map(|f| f.id).collect())
            .unwrap_or_default()
    }

    fn edge_curve(&self, edge: EdgeId) -> Option<EdgeCurve> {
        self.find_edge(edge).map(|e| e.curve.to_edge_curve())
    }

    fn face_triangulation(&self, face: FaceId) -> Option<FaceTriangulation> {
        let face = self.find_face(face)?;
        let mesh = face.mesh.as_ref()?;
        Some(FaceTriangulation {
            nodes: mesh.nodes.clone(),
            triangles: mesh.triangles.clone(),
            location: face.location,
        })
    }
}
