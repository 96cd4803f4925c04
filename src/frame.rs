//! The tabular data model and everything that reads or rewrites it.
//!
//! - [`cell`]: tagged cell values and value-domain inference
//! - [`dataset`]: the polars-backed [`Dataset`]
//! - [`stats`]: row/column/missing/duplicate counts
//! - [`transforms`]: duplicate removal, missing-value fill, record replace
//! - [`io`]: CSV/XLSX parsing and serialization
//! - [`view`]: the string table sent to clients

pub mod cell;
pub mod dataset;
pub mod io;
pub mod stats;
pub mod transforms;
pub mod view;

pub use cell::{Cell, CellKind};
pub use dataset::Dataset;
pub use io::{ExportFormat, FileFormat};
pub use stats::Stats;
pub use transforms::{DedupeMode, DedupeOutcome};
pub use view::TableView;
