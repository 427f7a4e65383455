//! part-catalog: catalog tables, row/variant selection and the parameter
//! resolver that turns a selected row into working dimensions.

pub mod dims;
pub mod notice;
pub mod resolver;
pub mod selection;
pub mod table;

pub use dims::{Dim, ResolvedDimensions};
pub use notice::{Notice, NoticeLevel};
pub use resolver::{
    resolve, ConfigurationError, DeriveFn, DimRule, DimSource, Resolution, ResolverSpec,
    SizeClassRule,
};
pub use selection::{SelectionEdit, SelectionState, Variant};
pub use table::{CatalogError, CatalogTable};
