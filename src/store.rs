//! Holder for the one dataset the service works on.
//!
//! The slot lives behind an `RwLock`: readers take a cheap clone of the
//! current dataset, and every mutating request runs its whole
//! read-transform-write inside [`DatasetStore::update`] so two concurrent
//! requests cannot interleave and lose an update.

use crate::error::{Result, ScourError};
use crate::frame::Dataset;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    current: Arc<RwLock<Option<Dataset>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current dataset, `None` until something is loaded.
    pub fn get(&self) -> Result<Option<Dataset>> {
        let current = self
            .current
            .read()
            .map_err(|e| ScourError::Other(format!("Lock poisoned: {e}")))?;
        Ok(current.clone())
    }

    /// Like [`get`](Self::get) but fails with `NoDataLoaded` when empty.
    pub fn require(&self) -> Result<Dataset> {
        self.get()?.ok_or(ScourError::NoDataLoaded)
    }

    /// Replaces the current dataset wholesale.
    pub fn set(&self, dataset: Dataset) -> Result<()> {
        let mut current = self
            .current
            .write()
            .map_err(|e| ScourError::Other(format!("Lock poisoned: {e}")))?;
        *current = Some(dataset);
        Ok(())
    }

    /// Runs `f` against the current dataset while holding the write lock and
    /// stores the dataset it returns. If `f` fails the store is unchanged.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Option<&Dataset>) -> Result<(Dataset, T)>,
    {
        let mut current = self
            .current
            .write()
            .map_err(|e| ScourError::Other(format!("Lock poisoned: {e}")))?;
        let (next, output) = f(current.as_ref())?;
        *current = Some(next);
        Ok(output)
    }
}
