//! ASCII STL.
//!
//! Numbers are written with the shortest representation that parses back to
//! the same `f32`, so export followed by import reproduces the buffer.

use mesh_extract::TriangleBuffer;
use tracing::{debug, instrument};

use crate::errors::StlError;

/// A parsed STL solid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StlDocument {
    pub name: String,
    pub mesh: TriangleBuffer,
}

/// One facet per triangle, each carrying the normal of its first corner.
pub fn export_ascii_stl(mesh: &TriangleBuffer, name: &str) -> String {
    let mut out = String::with_capacity(64 + mesh.triangle_count() * 256);
    out.push_str(&format!("solid {name}\n"));
    for (tri, normals) in mesh.facets() {
        let [nx, ny, nz] = normals[0];
        out.push_str(&format!("  facet normal {nx} {ny} {nz}\n"));
        out.push_str("    outer loop\n");
        for [x, y, z] in tri {
            out.push_str(&format!("      vertex {x} {y} {z}\n"));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    debug!(triangles = mesh.triangle_count(), bytes = out.len(), "exported ascii stl");
    out
}

fn number(line: usize, token: Option<&str>) -> Result<f32, StlError> {
    let token = token.ok_or_else(|| StlError::UnexpectedToken {
        line,
        token: "end of line".to_string(),
    })?;
    token.parse().map_err(|_| StlError::Parse {
        line,
        token: token.to_string(),
    })
}

fn triple<'a>(line: usize, tokens: &mut impl Iterator<Item = &'a str>) -> Result<[f32; 3], StlError> {
    Ok([
        number(line, tokens.next())?,
        number(line, tokens.next())?,
        number(line, tokens.next())?,
    ])
}

fn expect(line: usize, token: Option<&str>, word: &str) -> Result<(), StlError> {
    match token {
        Some(t) if t == word => Ok(()),
        other => Err(StlError::UnexpectedToken {
            line,
            token: other.unwrap_or("end of line").to_string(),
        }),
    }
}

struct OpenFacet {
    normal: [f32; 3],
    vertices: Vec<[f32; 3]>,
}

/// Parse an ASCII STL solid. Every facet gets its declared normal at all
/// three corners.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn import_ascii_stl(text: &str) -> Result<StlDocument, StlError> {
    let mut doc = StlDocument::default();
    let mut facet: Option<OpenFacet> = None;
    let mut facets = 0usize;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        match (keyword, facet.as_mut()) {
            ("solid", None) => {
                doc.name = tokens.collect::<Vec<_>>().join(" ");
            }
            ("facet", None) => {
                expect(line, tokens.next(), "normal")?;
                facet = Some(OpenFacet {
                    normal: triple(line, &mut tokens)?,
                    vertices: Vec::with_capacity(3),
                });
            }
            ("outer", Some(_)) => expect(line, tokens.next(), "loop")?,
            ("vertex", Some(open)) => open.vertices.push(triple(line, &mut tokens)?),
            ("endloop", Some(_)) => {}
            ("endfacet", Some(open)) => {
                let corners: [[f32; 3]; 3] =
                    open.vertices
                        .as_slice()
                        .try_into()
                        .map_err(|_| StlError::MalformedFacet {
                            facet: facets,
                            vertices: open.vertices.len(),
                        })?;
                doc.mesh.push_flat(corners, open.normal);
                facets += 1;
                facet = None;
            }
            ("endsolid", None) => break,
            (other, _) => {
                return Err(StlError::UnexpectedToken {
                    line,
                    token: other.to_string(),
                })
            }
        }
    }
    if facet.is_some() {
        return Err(StlError::UnexpectedEnd);
    }
    debug!(name = %doc.name, facets, "imported ascii stl");
    Ok(doc)
}
