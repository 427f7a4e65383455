/// Errors reading or writing STL data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StlError {
    #[error("line {line}: cannot parse {token:?}")]
    Parse { line: usize, token: String },

    #[error("line {line}: unexpected {token:?}")]
    UnexpectedToken { line: usize, token: String },

    #[error("facet {facet} has {vertices} vertices, expected 3")]
    MalformedFacet { facet: usize, vertices: usize },

    #[error("input ends inside a facet")]
    UnexpectedEnd,

    #[error("binary STL is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("{triangles} triangles do not fit a binary STL facet count")]
    TooManyFacets { triangles: usize },

    #[error("io: {reason}")]
    Io { reason: String },
}
