//! Centralized error handling for scour.
//!
//! Every request either succeeds completely or fails with one [`ScourError`].
//! The domain variants map one-to-one onto the error kinds a client can see,
//! and their `Display` output is the exact message placed in the
//! `{"error": ...}` response body:
//!
//! ```
//! use scour::error::ScourError;
//!
//! let err = ScourError::NoDataLoaded;
//! assert_eq!(err.to_string(), "No data loaded");
//! assert_eq!(err.status(), 400);
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.with_context()` to any `Result` whose error converts
//! into [`ScourError`], prefixing the message while keeping the original cause:
//!
//! ```no_run
//! use scour::error::ResultExt as _;
//!
//! fn read_fixture() -> scour::error::Result<String> {
//!     std::fs::read_to_string("data.csv").with_context(|| "Failed to load dataset".to_owned())
//! }
//! ```

use std::fmt;

/// Main error type for scour operations.
#[derive(Debug)]
pub enum ScourError {
    /// Upload request carried no `file` part
    NoFileUploaded,

    /// Uploaded filename has an extension we cannot parse
    UnsupportedFormat(String),

    /// File bytes could not be parsed (wraps the parser message)
    Parse(String),

    /// An operation needs a dataset but none has been uploaded yet
    NoDataLoaded,

    /// Request body is missing or has the wrong shape
    InvalidPayload(String),

    /// A requested column does not exist in the dataset
    InvalidColumn(String),

    /// A transform could not be applied to the dataset
    Transform(String),

    /// I/O errors (upload directory, log files)
    Io(std::io::Error),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl ScourError {
    /// HTTP status code used when this error is returned to a client.
    ///
    /// Domain errors are always 400; infrastructure failures are 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::Io(_) | Self::Config(_) | Self::Other(_) => 500,
            Self::NoFileUploaded
            | Self::UnsupportedFormat(_)
            | Self::Parse(_)
            | Self::NoDataLoaded
            | Self::InvalidPayload(_)
            | Self::InvalidColumn(_)
            | Self::Transform(_) => 400,
        }
    }
}

impl fmt::Display for ScourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFileUploaded => write!(f, "No file uploaded"),
            Self::UnsupportedFormat(name) => {
                write!(f, "Unsupported file type '{name}'. Use CSV or XLSX.")
            }
            Self::Parse(msg) => write!(f, "Failed to read file: {msg}"),
            Self::NoDataLoaded => write!(f, "No data loaded"),
            Self::InvalidPayload(msg) | Self::Other(msg) => write!(f, "{msg}"),
            Self::InvalidColumn(name) => write!(f, "Column not found: {name}"),
            Self::Transform(msg) => write!(f, "Transform failed: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ScourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScourError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for ScourError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for ScourError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(format!("Invalid JSON payload: {err}"))
    }
}

impl From<polars::error::PolarsError> for ScourError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Transform(err.to_string())
    }
}

impl From<calamine::Error> for ScourError {
    fn from(err: calamine::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ScourError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Other(format!("Failed to write XLSX: {err}"))
    }
}

/// Result type alias for scour operations.
pub type Result<T> = std::result::Result<T, ScourError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context built by a closure (only run on error).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ScourError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: ScourError = e.into();
            ScourError::Other(format!("{}: {}", f(), err))
        })
    }
}
