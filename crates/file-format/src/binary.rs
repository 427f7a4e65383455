//! Binary STL: an 80-byte header, a little-endian `u32` facet count, then
//! 50 bytes per facet (normal, three corners, `u16` attribute).

use mesh_extract::TriangleBuffer;
use tracing::debug;

use crate::ascii::StlDocument;
use crate::errors::StlError;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

fn push_vec(buf: &mut Vec<u8>, v: &[f32; 3]) {
    for c in v {
        buf.extend_from_slice(&c.to_le_bytes());
    }
}

pub fn export_binary_stl(mesh: &TriangleBuffer, name: &str) -> Result<Vec<u8>, StlError> {
    let count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(body_len(count));

    let header = format!("binary STL: {name}");
    let header = header.as_bytes();
    buf.extend_from_slice(&header[..header.len().min(HEADER_LEN)]);
    buf.resize(HEADER_LEN, 0);
    let declared = u32::try_from(count).map_err(|_| StlError::TooManyFacets { triangles: count })?;
    buf.extend_from_slice(&declared.to_le_bytes());

    for (tri, normals) in mesh.facets() {
        push_vec(&mut buf, &normals[0]);
        for corner in tri {
            push_vec(&mut buf, corner);
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    debug!(triangles = count, bytes = buf.len(), "exported binary stl");
    Ok(buf)
}

/// Facet count from the header, if the input is long enough to hold one.
pub(crate) fn declared_count(bytes: &[u8]) -> Option<usize> {
    let raw: [u8; 4] = bytes.get(HEADER_LEN..HEADER_LEN + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw) as usize)
}

fn body_len(count: usize) -> usize {
    count.saturating_mul(FACET_LEN).saturating_add(HEADER_LEN + 4)
}

/// Whether the length of `bytes` matches the facet count it declares.
pub(crate) fn is_binary(bytes: &[u8]) -> bool {
    declared_count(bytes).is_some_and(|n| bytes.len() == body_len(n))
}

fn read_vec(facet: &[u8], offset: usize) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for (i, c) in out.iter_mut().enumerate() {
        let at = offset + 4 * i;
        *c = f32::from_le_bytes([facet[at], facet[at + 1], facet[at + 2], facet[at + 3]]);
    }
    out
}

pub fn import_binary_stl(bytes: &[u8]) -> Result<StlDocument, StlError> {
    let count = declared_count(bytes).ok_or(StlError::Truncated {
        expected: HEADER_LEN + 4,
        found: bytes.len(),
    })?;
    let expected = body_len(count);
    if bytes.len() < expected {
        return Err(StlError::Truncated {
            expected,
            found: bytes.len(),
        });
    }
    let name = String::from_utf8_lossy(&bytes[..HEADER_LEN])
        .trim_end_matches('\0')
        .trim_start_matches("binary STL: ")
        .to_string();

    let mut mesh = TriangleBuffer::new();
    for facet in bytes[HEADER_LEN + 4..expected].chunks_exact(FACET_LEN) {
        let normal = read_vec(facet, 0);
        let corners = [read_vec(facet, 12), read_vec(facet, 24), read_vec(facet, 36)];
        mesh.push_flat(corners, normal);
    }
    debug!(triangles = count, "imported binary stl");
    Ok(StlDocument { name, mesh })
}
