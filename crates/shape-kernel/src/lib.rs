//! shape-kernel: the solid-modeling interface used by the part pipeline.
//!
//! [`Kernel`] builds and edits solids through opaque, move-only handles;
//! [`KernelIntrospect`] answers read-only topology queries. [`TruckKernel`]
//! is the production backend, built on the truck B-rep crates.
//! [`ReferenceKernel`] is a deterministic in-tree double whose booleans do
//! not trim faces, and [`RecordingKernel`] wraps another kernel and logs
//! its calls.

pub(crate) mod curve;
pub(crate) mod region;
pub mod recording;
pub mod reference;
pub mod traits;
pub mod truck;
pub mod types;

pub use recording::{KernelCall, RecordingKernel};
pub use reference::ReferenceKernel;
pub use traits::*;
pub use truck::TruckKernel;
pub use types::*;
