use super::cell::{Cell, CellKind};
use crate::error::{Result, ScourError};
use polars::prelude::*;
use std::collections::HashSet;

/// The in-memory table every operation works on.
///
/// A thin wrapper over a polars [`DataFrame`]: columns are uniquely named,
/// ordered, and of equal length. Rows carry no identity, so any filter
/// implicitly renumbers them from zero.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// Builds a dataset from named cell columns, inferring each column's
    /// dtype from its cells.
    ///
    /// # Errors
    ///
    /// Returns `Transform` if a name repeats or the columns differ in length.
    pub fn from_columns(columns: Vec<(String, Vec<Cell>)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (name, _) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ScourError::Transform(format!(
                    "Duplicate column name: {name}"
                )));
            }
        }

        let columns: Vec<Column> = columns
            .iter()
            .map(|(name, cells)| Column::from(series_from_cells(name, cells)))
            .collect();
        let df = DataFrame::new(columns)?;
        Ok(Self { df })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// All cells of one column, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns `InvalidColumn` if `name` is not a column of this dataset.
    pub fn column_cells(&self, name: &str) -> Result<Vec<Cell>> {
        let column = self
            .df
            .column(name)
            .map_err(|_e| ScourError::InvalidColumn(name.to_owned()))?;
        let series = column.as_materialized_series();
        (0..series.len())
            .map(|idx| {
                series
                    .get(idx)
                    .map(|value| Cell::from_any_value(&value))
                    .map_err(ScourError::from)
            })
            .collect()
    }

    /// Replaces the cells of an existing column in place, keeping its
    /// position. The column dtype is re-inferred from `cells`.
    pub fn replace_column(&mut self, name: &str, cells: &[Cell]) -> Result<()> {
        if !self.has_column(name) {
            return Err(ScourError::InvalidColumn(name.to_owned()));
        }
        self.df.replace(name, series_from_cells(name, cells))?;
        Ok(())
    }

    /// Keeps the rows whose mask entry is `true`, in their original order.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Self> {
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        let df = self.df.filter(&mask)?;
        Ok(Self { df })
    }
}

pub(crate) fn series_from_cells(name: &str, cells: &[Cell]) -> Series {
    let name: PlSmallStr = name.into();
    match CellKind::infer(cells) {
        Some(CellKind::Boolean) => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Boolean(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        Some(CellKind::Integer) => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Integer(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        Some(CellKind::Float) => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Integer(v) => Some(*v as f64),
                    Cell::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        Some(CellKind::Text) | None => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| (!cell.is_missing()).then(|| cell.display_text()))
                .collect();
            Series::new(name, values)
        }
    }
}
