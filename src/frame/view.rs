use super::dataset::Dataset;
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Wire form of a dataset: column names plus one string record per row.
///
/// Every cell is rendered through [`Cell::display_text`], so a missing cell
/// and an empty string look the same to the client.
///
/// [`Cell::display_text`]: super::cell::Cell::display_text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub data: Vec<Map<String, Value>>,
}

impl TableView {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let columns = dataset.column_names();
        let cells = columns
            .iter()
            .map(|name| dataset.column_cells(name))
            .collect::<Result<Vec<_>>>()?;

        let data = (0..dataset.height())
            .map(|row| {
                columns
                    .iter()
                    .zip(&cells)
                    .map(|(name, column)| {
                        let text = column
                            .get(row)
                            .map(|cell| cell.display_text())
                            .unwrap_or_default();
                        (name.clone(), Value::String(text))
                    })
                    .collect()
            })
            .collect();

        Ok(Self { columns, data })
    }
}
