use serde::{Deserialize, Serialize};

/// Errors raised while loading a catalog table.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("row {row} has {found} fields, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("catalog table has no columns")]
    NoColumns,

    #[error("invalid catalog JSON: {reason}")]
    Json { reason: String },
}

#[derive(Deserialize)]
struct RawTable {
    headings: Vec<String>,
    rows: Vec<Vec<f64>>,
}

/// Fixed-width table of numeric catalog rows with display headings.
///
/// Immutable once built: there are no mutating accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogTable {
    headings: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl CatalogTable {
    pub fn new(headings: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, CatalogError> {
        if headings.is_empty() {
            return Err(CatalogError::NoColumns);
        }
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headings.len())
        {
            return Err(CatalogError::RowWidth {
                row,
                expected: headings.len(),
                found: r.len(),
            });
        }
        Ok(Self { headings, rows })
    }

    /// Table from fixed-width rows. The width is checked by the type.
    pub fn from_fixed<const N: usize>(headings: [&str; N], rows: &[[f64; N]]) -> Self {
        Self {
            headings: headings.iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(|r| r.to_vec()).collect(),
        }
    }

    /// Load from `{"headings": [...], "rows": [[...], ...]}`.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let raw: RawTable = serde_json::from_str(text).map_err(|e| CatalogError::Json {
            reason: e.to_string(),
        })?;
        Self::new(raw.headings, raw.rows)
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    /// Heading of `column`, or a placeholder naming the index.
    pub fn heading(&self, column: usize) -> String {
        self.headings
            .get(column)
            .cloned()
            .unwrap_or_else(|| format!("column {column}"))
    }

    pub fn width(&self) -> usize {
        self.headings.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
