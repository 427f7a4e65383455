use part_geom::{BoundingBox, Point3d};
use serde::{Deserialize, Serialize};

/// A renderable triangle soup.
///
/// Every triangle carries three normals, one per corner, so
/// `normals().len() == 3 * triangles().len()` always holds. The push
/// methods are the only way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBuffer")]
pub struct TriangleBuffer {
    triangles: Vec<[[f32; 3]; 3]>,
    normals: Vec<[f32; 3]>,
}

#[derive(Deserialize)]
struct RawBuffer {
    triangles: Vec<[[f32; 3]; 3]>,
    normals: Vec<[f32; 3]>,
}

impl TryFrom<RawBuffer> for TriangleBuffer {
    type Error = String;

    fn try_from(raw: RawBuffer) -> Result<Self, Self::Error> {
        if raw.normals.len() != 3 * raw.triangles.len() {
            return Err(format!(
                "{} triangles need {} normals, found {}",
                raw.triangles.len(),
                3 * raw.triangles.len(),
                raw.normals.len()
            ));
        }
        Ok(Self {
            triangles: raw.triangles,
            normals: raw.normals,
        })
    }
}

impl TriangleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangles(&self) -> &[[[f32; 3]; 3]] {
        &self.triangles
    }

    /// Per-corner normals, three per triangle.
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Triangles paired with their three corner normals.
    pub fn facets(&self) -> impl Iterator<Item = (&[[f32; 3]; 3], &[[f32; 3]])> + '_ {
        self.triangles.iter().zip(self.normals.chunks_exact(3))
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Append one triangle with its flat normal repeated at each corner.
    pub fn push_flat(&mut self, corners: [[f32; 3]; 3], normal: [f32; 3]) {
        self.triangles.push(corners);
        self.normals.extend([normal; 3]);
    }

    /// Append one triangle with explicit per-corner normals.
    pub fn push(&mut self, corners: [[f32; 3]; 3], normals: [[f32; 3]; 3]) {
        self.triangles.push(corners);
        self.normals.extend(normals);
    }

    pub fn clear(&mut self) {
        self.triangles.clear();
        self.normals.clear();
    }

    pub fn merge(&mut self, other: &TriangleBuffer) {
        self.triangles.extend_from_slice(&other.triangles);
        self.normals.extend_from_slice(&other.normals);
    }

    /// Vertex positions `[x, y, z, x, y, z, ...]`.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.triangles.iter().flatten().flatten().copied().collect()
    }

    /// Vertex normals `[nx, ny, nz, ...]`, aligned with [`Self::positions_flat`].
    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flatten().copied().collect()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let points: Vec<Point3d> = self
            .triangles
            .iter()
            .flatten()
            .map(|v| Point3d::new(v[0] as f64, v[1] as f64, v[2] as f64))
            .collect();
        BoundingBox::from_points(&points)
    }

    /// Sum of triangle areas.
    pub fn surface_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|[a, b, c]| {
                let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]].map(f64::from);
                let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]].map(f64::from);
                let n = [
                    u[1] * v[2] - u[2] * v[1],
                    u[2] * v[0] - u[0] * v[2],
                    u[0] * v[1] - u[1] * v[0],
                ];
                (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() / 2.0
            })
            .sum()
    }
}
