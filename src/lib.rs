//! # scour
//!
//! A small HTTP service for tabular data: upload a CSV or XLSX file, look at
//! it, clean it, and download the result.
//!
//! The service keeps exactly one dataset in memory. Every cleaning request
//! rewrites that dataset in place and returns the new table together with
//! fresh statistics.
//!
//! ## Modules
//!
//! - [`frame`]: the dataset model, statistics, transforms and file formats
//! - [`store`]: the shared, lock-protected slot holding the current dataset
//! - [`commands`]: one function per endpoint, independent of HTTP
//! - [`server`]: warp routes that decode requests and call into [`commands`]
//! - [`config`]: JSON-file configuration for the service
//! - [`logging`]: tracing subscriber setup (stdout plus rolling files)
//! - [`error`]: the crate error type
//!
//! ```no_run
//! use scour::commands::data;
//! use scour::commands::transfer::{self, UploadedFile};
//! use scour::store::DatasetStore;
//! use std::path::Path;
//!
//! # fn example() -> scour::error::Result<()> {
//! let store = DatasetStore::new();
//! let file = UploadedFile {
//!     filename: "people.csv".to_owned(),
//!     bytes: b"name,age\nAnn,30\nBob,\n".to_vec(),
//! };
//! transfer::upload(&store, Path::new("uploads"), Some(file))?;
//! let stats = data::get_stats(&store)?;
//! assert_eq!(stats.missing_values, 1);
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod server;
pub mod store;
