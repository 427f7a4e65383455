//! Parameter resolver: catalog row + variant -> working dimensions.
//!
//! Each part family describes its dimensions declaratively with a
//! [`ResolverSpec`]. Resolution is pure: the same table, selection and spec
//! always give the same result, and a failure never yields a partial set.

use tracing::{debug, instrument, warn};

use crate::dims::{Dim, ResolvedDimensions};
use crate::notice::Notice;
use crate::selection::{SelectionState, Variant};
use crate::table::CatalogTable;

/// Errors that prevent a build from being attempted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no catalog row selected")]
    Unconfigured,

    #[error("row {row} out of range, table has {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("{dim} is missing for row {row} (columns: {columns})")]
    MissingDimension {
        dim: Dim,
        row: usize,
        columns: String,
    },

    #[error("column {column} out of range, table has {width} columns")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("{dim} was not resolved")]
    NotResolved { dim: Dim },

    #[error("invalid derived dimension: {reason}")]
    InvalidDerived { reason: String },
}

/// Where a dimension's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DimSource {
    Column(usize),
    /// `primary`, unless it reads 0, in which case `alternate`.
    Fallback { primary: usize, alternate: usize },
    /// One column per execution variant.
    ByVariant { first: usize, second: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimRule {
    pub dim: Dim,
    pub source: DimSource,
    /// A zero or non-finite value fails resolution.
    pub required: bool,
}

impl DimRule {
    pub fn required(dim: Dim, source: DimSource) -> Self {
        Self {
            dim,
            source,
            required: true,
        }
    }

    pub fn optional(dim: Dim, source: DimSource) -> Self {
        Self {
            dim,
            source,
            required: false,
        }
    }
}

/// Construction constants chosen by a size-class field of the row.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeClassRule {
    pub column: usize,
    pub cutoff: f64,
    pub at_or_below: Vec<(Dim, f64)>,
    pub above: Vec<(Dim, f64)>,
}

/// Computes derived dimensions from those already resolved.
pub type DeriveFn = fn(&mut ResolvedDimensions) -> Result<(), ConfigurationError>;

/// Per-family resolver configuration.
#[derive(Debug, Clone, Default)]
pub struct ResolverSpec {
    pub rules: Vec<DimRule>,
    pub size_class: Option<SizeClassRule>,
    pub derive: Option<DeriveFn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub dimensions: ResolvedDimensions,
    pub notices: Vec<Notice>,
}

fn field(table: &CatalogTable, values: &[f64], column: usize) -> Result<f64, ConfigurationError> {
    values
        .get(column)
        .copied()
        .ok_or(ConfigurationError::ColumnOutOfRange {
            column,
            width: table.width(),
        })
}

/// Resolve the working dimensions for `selection`.
#[instrument(skip(table, spec), fields(rows = table.row_count()))]
pub fn resolve(
    table: &CatalogTable,
    selection: &SelectionState,
    spec: &ResolverSpec,
) -> Result<Resolution, ConfigurationError> {
    let row = selection.row.ok_or(ConfigurationError::Unconfigured)?;
    let values = table.row(row).ok_or(ConfigurationError::RowOutOfRange {
        row,
        rows: table.row_count(),
    })?;

    let mut dims = ResolvedDimensions::new();
    let mut notices = Vec::new();

    for rule in &spec.rules {
        let (value, columns) = match rule.source {
            DimSource::Column(c) => (field(table, values, c)?, table.heading(c)),
            DimSource::ByVariant { first, second } => {
                let c = match selection.variant {
                    Variant::First => first,
                    Variant::Second => second,
                };
                (field(table, values, c)?, table.heading(c))
            }
            DimSource::Fallback { primary, alternate } => {
                let preferred = field(table, values, primary)?;
                let columns = format!("{}, {}", table.heading(primary), table.heading(alternate));
                if preferred == 0.0 {
                    let value = field(table, values, alternate)?;
                    warn!(dim = %rule.dim, row, "preferred value unavailable, falling back");
                    notices.push(Notice::warning(format!(
                        "preferred value unavailable, falling back: {} is not set for row {row}, using {} = {value}",
                        table.heading(primary),
                        table.heading(alternate),
                    )));
                    (value, columns)
                } else {
                    (preferred, columns)
                }
            }
        };

        if rule.required && (value == 0.0 || !value.is_finite()) {
            return Err(ConfigurationError::MissingDimension {
                dim: rule.dim,
                row,
                columns,
            });
        }
        debug!(dim = %rule.dim, value, "resolved");
        dims.insert(rule.dim, value);
    }

    if let Some(class) = &spec.size_class {
        let key = field(table, values, class.column)?;
        let constants = if key <= class.cutoff {
            &class.at_or_below
        } else {
            &class.above
        };
        debug!(key, cutoff = class.cutoff, "size class");
        for (dim, value) in constants {
            dims.insert(*dim, *value);
        }
    }

    if let Some(derive) = spec.derive {
        derive(&mut dims)?;
    }

    notices.push(Notice::status(format!(
        "resolved {} dimensions for row {row}",
        dims.len()
    )));
    Ok(Resolution {
        dimensions: dims,
        notices,
    })
}
