use super::TableResponse;
use crate::error::{Result, ScourError};
use crate::frame::{DedupeMode, DedupeOutcome, transforms};
use crate::store::DatasetStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DedupeRequest {
    /// Columns forming the duplicate key; `None` or empty means every column.
    pub subset: Option<Vec<String>>,
    pub simulate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FillRequest {
    pub value: Option<serde_json::Value>,
    pub column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicatesFound {
    pub duplicates_found: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DedupeResponse {
    Simulated(DuplicatesFound),
    Applied(TableResponse),
}

/// `POST /remove-duplicates`
pub fn remove_duplicates(store: &DatasetStore, request: DedupeRequest) -> Result<DedupeResponse> {
    let subset = request.subset.as_deref();

    if request.simulate {
        let dataset = store.require()?;
        let duplicates_found = transforms::count_duplicates(&dataset, subset)?;
        tracing::debug!("Simulated duplicate removal: {duplicates_found} rows would go");
        return Ok(DedupeResponse::Simulated(DuplicatesFound { duplicates_found }));
    }

    let dataset = store.update(|current| {
        let current = current.ok_or(ScourError::NoDataLoaded)?;
        let before = current.height();
        let DedupeOutcome::Deduplicated(deduped) =
            transforms::dedupe(current, subset, DedupeMode::Apply)?
        else {
            return Err(ScourError::Transform(
                "Duplicate removal returned no dataset".to_owned(),
            ));
        };
        tracing::info!(
            "Removed {} duplicate rows ({} remain)",
            before - deduped.height(),
            deduped.height()
        );
        Ok((deduped.clone(), deduped))
    })?;

    TableResponse::from_dataset(&dataset).map(DedupeResponse::Applied)
}

/// `POST /fill-missing`
pub fn fill_missing(store: &DatasetStore, request: FillRequest) -> Result<TableResponse> {
    let value = fill_text(request.value.as_ref())?;
    let column = request.column.as_deref().filter(|name| !name.is_empty());

    let dataset = store.update(|current| {
        let current = current.ok_or(ScourError::NoDataLoaded)?;
        let filled = transforms::fill_missing(current, &value, column)?;
        Ok((filled.clone(), filled))
    })?;

    tracing::info!(
        "Filled missing values with {value:?} in {}",
        column.unwrap_or("all columns")
    );
    TableResponse::from_dataset(&dataset)
}

// Scalars are accepted as their JSON text; `null` or no value means "".
fn fill_text(value: Option<&serde_json::Value>) -> Result<String> {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Err(ScourError::InvalidPayload(
            "Fill value must be a scalar".to_owned(),
        )),
    }
}
