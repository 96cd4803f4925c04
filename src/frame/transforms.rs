//! Cleaning operations over a [`Dataset`].
//!
//! Every function here is pure: it reads the dataset it is given and returns
//! a new one (or a count), leaving the input untouched. Column order is
//! preserved unless an operation explicitly realigns it.

use super::cell::{Cell, CellKind};
use super::dataset::Dataset;
use crate::error::{Result, ScourError};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Whether duplicate handling only counts or also drops rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeMode {
    Simulate,
    Apply,
}

#[derive(Debug, Clone)]
pub enum DedupeOutcome {
    /// Rows whose key already appeared in an earlier row.
    Found(usize),
    Deduplicated(Dataset),
}

/// Counts or removes duplicate rows.
///
/// The duplicate key is the whole row when `subset` is `None` or empty,
/// otherwise the values of the `subset` columns. The first row of each key
/// group is never counted and always kept.
///
/// # Errors
///
/// Returns `InvalidColumn` if a `subset` name is not a column.
pub fn dedupe(dataset: &Dataset, subset: Option<&[String]>, mode: DedupeMode) -> Result<DedupeOutcome> {
    match mode {
        DedupeMode::Simulate => count_duplicates(dataset, subset).map(DedupeOutcome::Found),
        DedupeMode::Apply => drop_duplicates(dataset, subset).map(DedupeOutcome::Deduplicated),
    }
}

pub fn count_duplicates(dataset: &Dataset, subset: Option<&[String]>) -> Result<usize> {
    let mask = duplicate_mask(dataset, subset)?;
    Ok(mask.iter().filter(|dup| **dup).count())
}

/// Keeps the first occurrence of every key, in original row order.
pub fn drop_duplicates(dataset: &Dataset, subset: Option<&[String]>) -> Result<Dataset> {
    let keep: Vec<bool> = duplicate_mask(dataset, subset)?
        .into_iter()
        .map(|dup| !dup)
        .collect();
    dataset.filter_rows(&keep)
}

fn key_columns(dataset: &Dataset, subset: Option<&[String]>) -> Result<Vec<Vec<Cell>>> {
    let names = match subset {
        Some(names) if !names.is_empty() => {
            if let Some(unknown) = names.iter().find(|name| !dataset.has_column(name)) {
                return Err(ScourError::InvalidColumn(unknown.clone()));
            }
            names.to_vec()
        }
        _ => dataset.column_names(),
    };
    names
        .iter()
        .map(|name| dataset.column_cells(name))
        .collect()
}

fn duplicate_mask(dataset: &Dataset, subset: Option<&[String]>) -> Result<Vec<bool>> {
    let columns = key_columns(dataset, subset)?;
    let mut seen: HashSet<Vec<Cell>> = HashSet::with_capacity(dataset.height());

    Ok((0..dataset.height())
        .map(|row| {
            let key: Vec<Cell> = columns
                .iter()
                .map(|cells| cells.get(row).cloned().unwrap_or_default())
                .collect();
            !seen.insert(key)
        })
        .collect())
}

/// Replaces missing cells with `value`.
///
/// When `column` names an existing column only that column is filled;
/// otherwise (absent, empty, or unknown) every column is. The fill text is
/// coerced into each column's value domain, so `"0"` stays numeric in a
/// numeric column while `"n/a"` turns it into a text column. Non-missing
/// cells keep their value.
///
/// # Errors
///
/// Returns `Transform` if a filled column cannot be rebuilt.
pub fn fill_missing(dataset: &Dataset, value: &str, column: Option<&str>) -> Result<Dataset> {
    let targets = match column.filter(|name| dataset.has_column(name)) {
        Some(name) => vec![name.to_owned()],
        None => dataset.column_names(),
    };

    let mut filled = dataset.clone();
    for name in &targets {
        let cells = dataset.column_cells(name)?;
        if !cells.iter().any(Cell::is_missing) {
            continue;
        }

        let fill = Cell::coerce_text(value, CellKind::infer(&cells));
        let cells: Vec<Cell> = cells
            .into_iter()
            .map(|cell| if cell.is_missing() { fill.clone() } else { cell })
            .collect();
        filled
            .replace_column(name, &cells)
            .map_err(|e| ScourError::Transform(format!("Could not fill column '{name}': {e}")))?;
    }

    Ok(filled)
}

/// Builds a dataset from submitted row records.
///
/// Each record maps column names to JSON scalars; a key absent from a record
/// is a missing cell. With a `current` dataset the result has exactly its
/// columns in its order: extra submitted columns are dropped and columns
/// nobody submitted are filled with empty text. Without one, columns appear
/// in first-seen order across the records.
///
/// # Errors
///
/// Returns `InvalidPayload` if a record is not an object or holds a nested
/// array/object value.
pub fn replace(current: Option<&Dataset>, records: &[Value]) -> Result<Dataset> {
    let mut order: Vec<String> = Vec::new();
    let mut rows: Vec<HashMap<&str, Cell>> = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let fields: &Map<String, Value> = record.as_object().ok_or_else(|| {
            ScourError::InvalidPayload(format!("Record {idx} is not an object"))
        })?;

        let mut row = HashMap::with_capacity(fields.len());
        for (name, value) in fields {
            let cell = Cell::from_json(value).ok_or_else(|| {
                ScourError::InvalidPayload(format!(
                    "Record {idx} has a non-scalar value for column '{name}'"
                ))
            })?;
            if !order.contains(name) {
                order.push(name.clone());
            }
            row.insert(name.as_str(), cell);
        }
        rows.push(row);
    }

    let candidate_cells = |name: &str| -> Vec<Cell> {
        rows.iter()
            .map(|row| row.get(name).cloned().unwrap_or_default())
            .collect()
    };

    let columns = match current {
        Some(current) => current
            .column_names()
            .into_iter()
            .map(|name| {
                let cells = if order.contains(&name) {
                    candidate_cells(&name)
                } else {
                    vec![Cell::Text(String::new()); rows.len()]
                };
                (name, cells)
            })
            .collect(),
        None => order
            .iter()
            .map(|name| (name.clone(), candidate_cells(name)))
            .collect(),
    };

    Dataset::from_columns(columns)
}
