//! file-format: STL import and export for [`mesh_extract::TriangleBuffer`].

pub mod ascii;
pub mod binary;
pub mod errors;

pub use ascii::{export_ascii_stl, import_ascii_stl, StlDocument};
pub use binary::{export_binary_stl, import_binary_stl};
pub use errors::StlError;

use std::path::Path;

use mesh_extract::TriangleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

/// Write `mesh` to `path` in the given format.
pub fn save_stl(path: &Path, mesh: &TriangleBuffer, name: &str, format: StlFormat) -> Result<(), StlError> {
    let bytes = match format {
        StlFormat::Ascii => export_ascii_stl(mesh, name).into_bytes(),
        StlFormat::Binary => export_binary_stl(mesh, name)?,
    };
    std::fs::write(path, bytes).map_err(|e| StlError::Io {
        reason: format!("{}: {e}", path.display()),
    })
}

/// Read an STL file, telling ASCII from binary by its contents.
pub fn load_stl(path: &Path) -> Result<StlDocument, StlError> {
    let bytes = std::fs::read(path).map_err(|e| StlError::Io {
        reason: format!("{}: {e}", path.display()),
    })?;
    if binary::is_binary(&bytes) {
        return import_binary_stl(&bytes);
    }
    let text = std::str::from_utf8(&bytes).map_err(|e| StlError::Parse {
        line: 0,
        token: format!("not UTF-8 text: {e}"),
    })?;
    import_ascii_stl(text)
}
