use super::dataset::Dataset;
use super::transforms::count_duplicates;
use crate::error::Result;
use polars::prelude::Column;
use serde::{Deserialize, Serialize};

/// Summary counts shown next to the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub rows: usize,
    pub cols: usize,
    pub missing_values: usize,
    /// Rows identical to an earlier row across every column.
    pub duplicates: usize,
}

/// Computes [`Stats`] for `dataset` without mutating it.
pub fn compute(dataset: &Dataset) -> Result<Stats> {
    let missing_values = dataset
        .frame()
        .get_columns()
        .iter()
        .map(Column::null_count)
        .sum();

    Ok(Stats {
        rows: dataset.height(),
        cols: dataset.width(),
        missing_values,
        duplicates: count_duplicates(dataset, None)?,
    })
}
