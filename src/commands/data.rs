use super::TableResponse;
use crate::error::{Result, ScourError};
use crate::frame::{Stats, stats, transforms};
use crate::store::DatasetStore;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    pub data: Option<serde_json::Value>,
}

/// `GET /get-data`
pub fn get_data(store: &DatasetStore) -> Result<TableResponse> {
    TableResponse::from_dataset(&store.require()?)
}

/// `GET /get-stats`
pub fn get_stats(store: &DatasetStore) -> Result<Stats> {
    stats::compute(&store.require()?)
}

/// `POST /update-data`: replaces the dataset with the submitted records,
/// aligned to the current columns when a dataset is loaded.
pub fn update_data(store: &DatasetStore, request: UpdateRequest) -> Result<TableResponse> {
    let data = request
        .data
        .filter(|data| !data.is_null())
        .ok_or_else(|| ScourError::InvalidPayload("No data provided".to_owned()))?;
    let records = data.as_array().ok_or_else(|| {
        ScourError::InvalidPayload("Expected 'data' to be a list of records".to_owned())
    })?;

    let dataset = store.update(|current| {
        let dataset = transforms::replace(current, records)?;
        Ok((dataset.clone(), dataset))
    })?;

    tracing::info!(
        "Dataset replaced from {} submitted records ({} columns)",
        dataset.height(),
        dataset.width()
    );
    Ok(TableResponse::from_dataset(&dataset)?.with_message("Data saved"))
}
