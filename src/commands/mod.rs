//! Request handlers, one function per endpoint.
//!
//! Handlers check preconditions, delegate to a single frame operation, and
//! hand back a typed response. They know nothing about HTTP; the `server`
//! module turns their results into replies.

pub mod cleaning;
pub mod data;
pub mod transfer;

use crate::error::{Result, ScourError};
use crate::frame::{Dataset, Stats, TableView, stats};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Table plus stats, returned by every endpoint that shows data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub view: TableView,
    pub stats: Stats,
}

impl TableResponse {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Ok(Self {
            message: None,
            view: TableView::from_dataset(dataset)?,
            stats: stats::compute(dataset)?,
        })
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Decodes a JSON request body.
///
/// An empty body, a body that is not JSON at all, or a literal `null` count
/// as `{}`. A JSON body of the wrong shape is `InvalidPayload`.
pub fn decode_payload<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Null) | Err(_) => Ok(T::default()),
        Ok(value) => serde_json::from_value(value)
            .map_err(|e| ScourError::InvalidPayload(format!("Invalid request payload: {e}"))),
    }
}
